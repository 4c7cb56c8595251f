use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;

use super::bucket::Bucket;
use super::error::StorageError;
use super::key::BlobKey;
use super::resolve::public_url;
use super::traits::{BlobStore, StoredBlob};

const TMP_DIR: &str = ".tmp";

/// Filesystem-backed blob store.
///
/// Blobs live at `{base_path}/{bucket}/{key}` and are served by the HTTP
/// layer under `public_base_url`.
pub struct FilesystemBlobStore {
    base_path: PathBuf,
    public_base_url: String,
    max_size: u64,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store.
    pub async fn new(
        base_path: PathBuf,
        public_base_url: String,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(TMP_DIR)).await?;
        for bucket in Bucket::ALL {
            fs::create_dir_all(base_path.join(bucket.as_str())).await?;
        }
        Ok(Self {
            base_path,
            public_base_url,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Compute the filesystem path for a key in a bucket.
    fn blob_path(&self, bucket: Bucket, key: &BlobKey) -> PathBuf {
        key.segments()
            .fold(self.base_path.join(bucket.as_str()), |path, segment| {
                path.join(segment)
            })
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(TMP_DIR)
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(
        &self,
        bucket: Bucket,
        key: &BlobKey,
        data: &[u8],
        _content_type: &str,
    ) -> Result<(), StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let blob_path = self.blob_path(bucket, key);
        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = blob_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &blob_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn delete(&self, bucket: Bucket, key: &BlobKey) -> Result<bool, StorageError> {
        let blob_path = self.blob_path(bucket, key);
        match fs::remove_file(&blob_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, bucket: Bucket, key: &BlobKey) -> String {
        public_url(&self.public_base_url, bucket, key)
    }

    async fn list(&self, bucket: Bucket) -> Result<Vec<StoredBlob>, StorageError> {
        let root = self.base_path.join(bucket.as_str());
        let mut blobs = Vec::new();
        let mut pending = vec![root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            while let Some(entry) = entries.next_entry().await? {
                let meta = entry.metadata().await?;
                let path = entry.path();
                if meta.is_dir() {
                    pending.push(path);
                    continue;
                }

                let Ok(relative) = path.strip_prefix(&root) else {
                    continue;
                };
                let joined = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                // Files dropped in by hand may not be valid keys.
                let Ok(key) = BlobKey::parse(&joined) else {
                    tracing::debug!(%bucket, path = %joined, "Skipping file that is not a blob key");
                    continue;
                };

                blobs.push(StoredBlob {
                    key,
                    size: meta.len(),
                    last_modified: meta.modified().ok().map(DateTime::<Utc>::from),
                });
            }
        }

        blobs.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(blobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_URL: &str = "http://localhost:3000/media";

    async fn temp_store() -> (FilesystemBlobStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(
            dir.path().join("media"),
            BASE_URL.into(),
            10 * 1024 * 1024,
        )
        .await
        .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn upload_writes_file_and_returns_public_url() {
        let (store, _dir) = temp_store().await;
        let key = BlobKey::parse("products/car_1_00000000.jpg").unwrap();

        let url = store
            .upload(Bucket::Products, &key, b"JPEG", "image/jpeg")
            .await
            .unwrap();

        assert_eq!(
            url,
            "http://localhost:3000/media/products/products/car_1_00000000.jpg"
        );
        let on_disk = std::fs::read(store.blob_path(Bucket::Products, &key)).unwrap();
        assert_eq!(on_disk, b"JPEG");
    }

    #[tokio::test]
    async fn put_overwrites_existing_key() {
        let (store, _dir) = temp_store().await;
        let key = BlobKey::parse("gallery/a.png").unwrap();

        store.put(Bucket::Gallery, &key, b"one", "image/png").await.unwrap();
        store.put(Bucket::Gallery, &key, b"two", "image/png").await.unwrap();

        let on_disk = std::fs::read(store.blob_path(Bucket::Gallery, &key)).unwrap();
        assert_eq!(on_disk, b"two");
    }

    #[tokio::test]
    async fn buckets_are_isolated() {
        let (store, _dir) = temp_store().await;
        let key = BlobKey::parse("shared/name.png").unwrap();

        store.put(Bucket::Gallery, &key, b"g", "image/png").await.unwrap();

        assert!(!store.delete(Bucket::Logos, &key).await.unwrap());
        assert_eq!(store.list(Bucket::Logos).await.unwrap().len(), 0);
        assert_eq!(store.list(Bucket::Gallery).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn size_limit_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path().join("media"), BASE_URL.into(), 10)
            .await
            .unwrap();
        let key = BlobKey::parse("logos/big.png").unwrap();

        let result = store
            .put(Bucket::Logos, &key, b"this is more than 10 bytes", "image/png")
            .await;
        assert!(matches!(
            result,
            Err(StorageError::SizeLimitExceeded { .. })
        ));

        let tmp_entries: Vec<_> = std::fs::read_dir(dir.path().join("media/.tmp"))
            .unwrap()
            .collect();
        assert_eq!(tmp_entries.len(), 0);
        assert!(!store.blob_path(Bucket::Logos, &key).exists());
    }

    #[tokio::test]
    async fn delete_removes_blob() {
        let (store, _dir) = temp_store().await;
        let key = BlobKey::parse("contacts/qr.png").unwrap();
        store.put(Bucket::Contacts, &key, b"QR", "image/png").await.unwrap();

        assert!(store.delete(Bucket::Contacts, &key).await.unwrap());
        assert!(!store.blob_path(Bucket::Contacts, &key).exists());
    }

    #[tokio::test]
    async fn delete_nonexistent_returns_false() {
        let (store, _dir) = temp_store().await;
        let key = BlobKey::parse("contacts/never.png").unwrap();
        assert!(!store.delete(Bucket::Contacts, &key).await.unwrap());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let (store, _dir) = temp_store().await;
        let a = BlobKey::parse("promotions/a.png").unwrap();
        let b = BlobKey::parse("promotions/b.png").unwrap();
        store.put(Bucket::Promotions, &a, b"a", "image/png").await.unwrap();

        store
            .remove(Bucket::Promotions, &[a.clone(), b.clone()])
            .await
            .unwrap();
        store.remove(Bucket::Promotions, &[a, b]).await.unwrap();

        assert!(store.list(Bucket::Promotions).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_reports_nested_keys_sorted() {
        let (store, _dir) = temp_store().await;
        for name in ["products/b.png", "products/a.png", "legacy/c.png"] {
            let key = BlobKey::parse(name).unwrap();
            store.put(Bucket::Products, &key, b"1234", "image/png").await.unwrap();
        }

        let listed = store.list(Bucket::Products).await.unwrap();
        let keys: Vec<_> = listed.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, ["legacy/c.png", "products/a.png", "products/b.png"]);
        assert!(listed.iter().all(|b| b.size == 4));
        assert!(listed.iter().all(|b| b.last_modified.is_some()));
    }

    #[tokio::test]
    async fn constructor_creates_bucket_directories() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("deep/nested/media");
        assert!(!base.exists());

        let _store = FilesystemBlobStore::new(base.clone(), BASE_URL.into(), 1024)
            .await
            .unwrap();

        assert!(base.join(".tmp").exists());
        for bucket in Bucket::ALL {
            assert!(base.join(bucket.as_str()).exists());
        }
    }
}
