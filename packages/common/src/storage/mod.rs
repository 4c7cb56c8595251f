mod bucket;
mod error;
mod key;
mod resolve;
mod traits;
mod upload;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

use std::sync::Arc;

pub use bucket::Bucket;
pub use error::StorageError;
pub use key::BlobKey;
pub use resolve::{public_url, resolve_key};
pub use traits::{BlobStore, StoredBlob};
pub use upload::{ImageUpload, UploadError};

use crate::config::{StorageAppConfig, StorageBackend};

/// Open the blob store selected by `config.backend`.
pub async fn open_blob_store(config: &StorageAppConfig) -> Result<Arc<dyn BlobStore>, StorageError> {
    match config.backend {
        StorageBackend::Filesystem => {
            let store = filesystem::FilesystemBlobStore::new(
                config.root.clone(),
                config.public_base_url.clone(),
                config.max_upload_size,
            )
            .await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => {
            let s3_config = config.s3.as_ref().ok_or_else(|| {
                StorageError::Backend("storage.backend = \"s3\" requires a [storage.s3] section".into())
            })?;
            let store = s3::S3BlobStore::new(s3_config, config.public_base_url.clone())?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "object-storage"))]
        StorageBackend::S3 => Err(StorageError::Backend(
            "S3 backend requires the `object-storage` feature".into(),
        )),
    }
}
