use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use s3::creds::Credentials;
use s3::{Bucket as S3Bucket, Region};

use super::bucket::Bucket;
use super::error::StorageError;
use super::key::BlobKey;
use super::resolve::public_url;
use super::traits::{BlobStore, StoredBlob};
use crate::config::S3Config;

/// S3-compatible blob store. Each logical bucket maps to the remote bucket
/// `{bucket_prefix}{bucket}`.
pub struct S3BlobStore {
    buckets: HashMap<Bucket, Box<S3Bucket>>,
    public_base_url: String,
}

impl S3BlobStore {
    pub fn new(config: &S3Config, public_base_url: String) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid S3 credentials: {e}")))?;

        let mut buckets = HashMap::new();
        for bucket in Bucket::ALL {
            let name = format!("{}{}", config.bucket_prefix, bucket);
            let mut remote = S3Bucket::new(&name, region.clone(), credentials.clone())
                .map_err(|e| StorageError::Backend(format!("bucket {name}: {e}")))?;
            if config.path_style {
                remote = remote.with_path_style();
            }
            buckets.insert(bucket, remote);
        }

        Ok(Self {
            buckets,
            public_base_url,
        })
    }

    fn remote(&self, bucket: Bucket) -> Result<&S3Bucket, StorageError> {
        self.buckets
            .get(&bucket)
            .map(|b| b.as_ref())
            .ok_or_else(|| StorageError::UnknownBucket(bucket.to_string()))
    }
}

fn check_status(code: u16, action: &str, key: &BlobKey) -> Result<(), StorageError> {
    if (200..300).contains(&code) {
        Ok(())
    } else {
        Err(StorageError::Backend(format!(
            "{action} {key} failed with HTTP {code}"
        )))
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(
        &self,
        bucket: Bucket,
        key: &BlobKey,
        data: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        let response = self
            .remote(bucket)?
            .put_object_with_content_type(key.as_str(), data, content_type)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        check_status(response.status_code(), "put", key)
    }

    async fn delete(&self, bucket: Bucket, key: &BlobKey) -> Result<bool, StorageError> {
        let response = self
            .remote(bucket)?
            .delete_object(key.as_str())
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        match response.status_code() {
            404 => Ok(false),
            code => check_status(code, "delete", key).map(|()| true),
        }
    }

    fn public_url(&self, bucket: Bucket, key: &BlobKey) -> String {
        public_url(&self.public_base_url, bucket, key)
    }

    async fn list(&self, bucket: Bucket) -> Result<Vec<StoredBlob>, StorageError> {
        let pages = self
            .remote(bucket)?
            .list(String::new(), None)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let mut blobs = Vec::new();
        for object in pages.into_iter().flat_map(|page| page.contents) {
            let Ok(key) = BlobKey::parse(&object.key) else {
                continue;
            };
            blobs.push(StoredBlob {
                key,
                size: object.size,
                last_modified: DateTime::parse_from_rfc3339(&object.last_modified)
                    .ok()
                    .map(|t| t.with_timezone(&Utc)),
            });
        }
        blobs.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(blobs)
    }
}
