use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::bucket::Bucket;
use super::error::StorageError;
use super::key::BlobKey;

/// A blob as reported by [`BlobStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub key: BlobKey,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Keyed blob storage partitioned into buckets.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under `key`, overwriting any previous blob.
    async fn put(
        &self,
        bucket: Bucket,
        key: &BlobKey,
        data: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Store bytes and return the public URL of the new blob.
    async fn upload(
        &self,
        bucket: Bucket,
        key: &BlobKey,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.put(bucket, key, data, content_type).await?;
        Ok(self.public_url(bucket, key))
    }

    /// Delete a blob.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, bucket: Bucket, key: &BlobKey) -> Result<bool, StorageError>;

    /// Delete several blobs. Missing keys are not an error.
    async fn remove(&self, bucket: Bucket, keys: &[BlobKey]) -> Result<(), StorageError> {
        for key in keys {
            self.delete(bucket, key).await?;
        }
        Ok(())
    }

    /// Public URL for `key`. Never fails and performs no I/O.
    fn public_url(&self, bucket: Bucket, key: &BlobKey) -> String;

    /// Enumerate every blob in a bucket.
    async fn list(&self, bucket: Bucket) -> Result<Vec<StoredBlob>, StorageError>;
}
