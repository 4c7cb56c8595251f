use std::sync::Arc;

use common::storage::{
    BlobKey, BlobStore, Bucket, ImageUpload, StorageError, UploadError, resolve_key,
};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::record::{AssetRecord, RecordError, RecordStore};

/// Failure of a lifecycle operation.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Outcome of deleting a no-longer-referenced blob. Failures here only
/// orphan the blob and never fail the enclosing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleanup {
    /// Nothing to delete: empty or unresolvable URL, or nothing changed.
    Skipped,
    Removed(BlobKey),
    Failed { key: BlobKey, error: String },
}

/// Pairs blob mutations with record mutations for one bucket and one table.
///
/// Ordering rules:
/// * create and replace upload first, so a failed upload never touches a record;
/// * replace deletes the old blob only after the record points at the new one;
/// * delete removes the record first, so a crash leaves an orphan blob rather
///   than a record pointing at nothing.
pub struct AssetLifecycle<'a, S> {
    blobs: &'a dyn BlobStore,
    records: &'a S,
    bucket: Bucket,
    prefix: &'static str,
    max_upload_size: u64,
}

impl<'a, S: RecordStore> AssetLifecycle<'a, S> {
    pub fn new(
        blobs: &'a dyn BlobStore,
        records: &'a S,
        bucket: Bucket,
        prefix: &'static str,
    ) -> Self {
        Self {
            blobs,
            records,
            bucket,
            prefix,
            max_upload_size: 10 * 1024 * 1024,
        }
    }

    pub fn with_max_upload_size(mut self, max_upload_size: u64) -> Self {
        self.max_upload_size = max_upload_size;
        self
    }

    pub fn bucket(&self) -> Bucket {
        self.bucket
    }

    pub fn records(&self) -> &'a S {
        self.records
    }

    pub async fn list(&self) -> Result<Vec<S::Record>, AssetError> {
        Ok(self.records.list().await?)
    }

    /// Validate and store an upload under a fresh key, returning its public URL.
    /// Nothing references the blob yet.
    pub async fn stage_upload(&self, upload: &ImageUpload) -> Result<String, AssetError> {
        stage_upload(
            self.blobs,
            self.bucket,
            self.prefix,
            self.max_upload_size,
            upload,
        )
        .await
    }

    /// Upload `upload` and insert a record pointing at it.
    pub async fn create_with_asset(
        &self,
        upload: &ImageUpload,
        draft: S::Draft,
    ) -> Result<S::Record, AssetError> {
        let url = self.stage_upload(upload).await?;

        match self.records.insert(draft, url.clone()).await {
            Ok(record) => {
                info!(bucket = %self.bucket, record_id = %record.record_id(), "Created record with asset");
                Ok(record)
            }
            Err(e) => {
                warn!(bucket = %self.bucket, %url, error = %e, "Insert failed; uploaded blob is orphaned");
                Err(e.into())
            }
        }
    }

    /// Upload a new image for `record`, repoint it, then delete the old blob.
    pub async fn replace_asset(
        &self,
        record: &S::Record,
        upload: &ImageUpload,
    ) -> Result<S::Record, AssetError> {
        let url = self.stage_upload(upload).await?;
        self.repoint(record, url).await
    }

    /// Point `record` at a previously staged upload and release the blob it
    /// referenced before.
    #[instrument(skip(self, record), fields(bucket = %self.bucket, record_id = %record.record_id()))]
    pub async fn commit_upload(
        &self,
        record: &S::Record,
        uploaded_url: String,
    ) -> Result<S::Record, AssetError> {
        let owned = resolve_key(&uploaded_url, self.bucket)
            .is_some_and(|key| self.blobs.public_url(self.bucket, &key) == uploaded_url);
        if !owned {
            return Err(AssetError::Validation(format!(
                "Image URL was not uploaded to the {} bucket",
                self.bucket
            )));
        }

        // A blob backs at most one live record.
        if record.image_url() != Some(uploaded_url.as_str())
            && self.records.is_referenced(&uploaded_url).await?
        {
            return Err(AssetError::Validation(
                "Image URL is already used by another record".into(),
            ));
        }

        self.repoint(record, uploaded_url).await
    }

    /// Point `record` at `uploaded_url`, then release its previous blob.
    async fn repoint(
        &self,
        record: &S::Record,
        uploaded_url: String,
    ) -> Result<S::Record, AssetError> {
        let previous = record.image_url().map(str::to_owned);

        let updated = match self.records.set_image(record, uploaded_url.clone()).await {
            Ok(updated) => updated,
            Err(e) => {
                warn!(url = %uploaded_url, error = %e, "Image update failed; new blob is unreferenced");
                return Err(e.into());
            }
        };

        if previous.as_deref() != Some(uploaded_url.as_str()) {
            self.release(previous.as_deref()).await;
        }

        Ok(updated)
    }

    /// Delete `record`, then its blob.
    #[instrument(skip(self, record), fields(bucket = %self.bucket, record_id = %record.record_id()))]
    pub async fn delete_with_asset(&self, record: &S::Record) -> Result<Cleanup, AssetError> {
        self.records.delete(record).await?;
        Ok(self.release(record.image_url()).await)
    }

    /// Drop a draft upload that was never committed.
    pub async fn abandon_draft_upload(
        &self,
        uploaded_url: &str,
        committed_url: Option<&str>,
    ) -> Cleanup {
        abandon_draft_upload(self.blobs, self.bucket, uploaded_url, committed_url).await
    }

    pub async fn release(&self, url: Option<&str>) -> Cleanup {
        release(self.blobs, self.bucket, url).await
    }
}

/// Validate `upload` and store it under a fresh key in `bucket`.
#[instrument(skip(blobs, upload), fields(file = %upload.file_name))]
pub async fn stage_upload(
    blobs: &dyn BlobStore,
    bucket: Bucket,
    prefix: &str,
    max_upload_size: u64,
    upload: &ImageUpload,
) -> Result<String, AssetError> {
    upload.validate(max_upload_size)?;
    let key = BlobKey::generate(bucket, prefix, &upload.file_name);
    let url = blobs
        .upload(bucket, &key, &upload.data, &upload.content_type)
        .await?;
    debug!(%key, size = upload.size(), "Stored upload");
    Ok(url)
}

/// Delete the blob behind `url` if it resolves inside `bucket`.
pub async fn release(blobs: &dyn BlobStore, bucket: Bucket, url: Option<&str>) -> Cleanup {
    let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
        return Cleanup::Skipped;
    };
    let Some(key) = resolve_key(url, bucket) else {
        debug!(%bucket, %url, "Unresolvable image URL; nothing to delete");
        return Cleanup::Skipped;
    };

    match blobs.remove(bucket, std::slice::from_ref(&key)).await {
        Ok(()) => {
            debug!(%bucket, %key, "Released blob");
            Cleanup::Removed(key)
        }
        Err(e) => {
            warn!(%bucket, %key, error = %e, "Failed to delete blob; leaving it orphaned");
            Cleanup::Failed {
                key,
                error: e.to_string(),
            }
        }
    }
}

/// Delete a draft upload unless it is the value that was already committed.
pub async fn abandon_draft_upload(
    blobs: &dyn BlobStore,
    bucket: Bucket,
    uploaded_url: &str,
    committed_url: Option<&str>,
) -> Cleanup {
    if committed_url == Some(uploaded_url) {
        return Cleanup::Skipped;
    }
    release(blobs, bucket, Some(uploaded_url)).await
}

/// Run [`release`] on its own task so it completes even if the caller goes away.
pub fn spawn_release(blobs: Arc<dyn BlobStore>, bucket: Bucket, url: String) -> JoinHandle<Cleanup> {
    tokio::spawn(async move { release(blobs.as_ref(), bucket, Some(&url)).await })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::testing::{Call, MemoryBlobStore, MemoryCatalog, journal, png};

    fn lifecycle<'a>(
        blobs: &'a MemoryBlobStore,
        table: &'a MemoryCatalog,
    ) -> AssetLifecycle<'a, MemoryCatalog> {
        AssetLifecycle::new(blobs, table, Bucket::Promotions, "promo")
    }

    #[tokio::test]
    async fn create_uploads_then_inserts() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());
        let table = MemoryCatalog::new(log.clone());

        let record = lifecycle(&blobs, &table)
            .create_with_asset(&png("ranger.png"), 3)
            .await
            .unwrap();

        assert_eq!(record.category_id, 3);
        let key = resolve_key(&record.image, Bucket::Promotions).unwrap();
        assert!(key.as_str().starts_with("promotions/promo_"));
        assert!(blobs.contains(Bucket::Promotions, &key));
        assert_eq!(
            log.lock().unwrap().clone(),
            vec![Call::Upload(key.to_string()), Call::Insert(record.id)]
        );
    }

    #[tokio::test]
    async fn create_never_inserts_when_upload_fails() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());
        let table = MemoryCatalog::new(log.clone());
        blobs.fail_uploads();

        let result = lifecycle(&blobs, &table)
            .create_with_asset(&png("ranger.png"), 3)
            .await;

        assert!(matches!(result, Err(AssetError::Storage(_))));
        assert!(table.promotions().is_empty());
        assert!(!log.lock().unwrap().iter().any(|c| matches!(c, Call::Insert(_))));
    }

    #[tokio::test]
    async fn create_rejects_invalid_upload_before_any_call() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());
        let table = MemoryCatalog::new(log.clone());
        let pdf = ImageUpload::new("brochure.pdf", Some("application/pdf".into()), vec![1]);

        let result = lifecycle(&blobs, &table).create_with_asset(&pdf, 3).await;

        assert!(matches!(
            result,
            Err(AssetError::Upload(UploadError::NotAnImage(_)))
        ));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_leaves_orphan_when_insert_fails() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());
        let table = MemoryCatalog::new(log.clone());
        table.fail_inserts();

        let result = lifecycle(&blobs, &table)
            .create_with_asset(&png("ranger.png"), 3)
            .await;

        assert!(matches!(result, Err(AssetError::Record(_))));
        assert_eq!(blobs.keys(Bucket::Promotions).len(), 1);
        assert!(!log.lock().unwrap().iter().any(|c| matches!(c, Call::BlobDelete(_))));
    }

    #[tokio::test]
    async fn replace_commits_new_url_then_removes_old_blob() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());
        let table = MemoryCatalog::new(log.clone());
        let manager = lifecycle(&blobs, &table);

        let original = manager.create_with_asset(&png("a.png"), 1).await.unwrap();
        let old_key = resolve_key(&original.image, Bucket::Promotions).unwrap();
        log.lock().unwrap().clear();

        let updated = manager
            .replace_asset(&original, &png("b.png"))
            .await
            .unwrap();

        let new_key = resolve_key(&updated.image, Bucket::Promotions).unwrap();
        assert_ne!(new_key, old_key);
        assert_eq!(table.promotions()[0].image, updated.image);
        assert!(!blobs.contains(Bucket::Promotions, &old_key));
        assert!(blobs.contains(Bucket::Promotions, &new_key));
        assert_eq!(
            log.lock().unwrap().clone(),
            vec![
                Call::Upload(new_key.to_string()),
                Call::SetImage(original.id),
                Call::BlobDelete(old_key.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn replace_keeps_old_state_when_upload_fails() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());
        let table = MemoryCatalog::new(log.clone());
        let manager = lifecycle(&blobs, &table);

        let original = manager.create_with_asset(&png("a.png"), 1).await.unwrap();
        let old_key = resolve_key(&original.image, Bucket::Promotions).unwrap();
        log.lock().unwrap().clear();
        blobs.fail_uploads();

        let result = manager.replace_asset(&original, &png("b.png")).await;

        assert!(matches!(result, Err(AssetError::Storage(_))));
        assert_eq!(table.promotions()[0], original);
        assert!(blobs.contains(Bucket::Promotions, &old_key));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_keeps_old_blob_when_update_fails() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());
        let table = MemoryCatalog::new(log.clone());
        let manager = lifecycle(&blobs, &table);

        let original = manager.create_with_asset(&png("a.png"), 1).await.unwrap();
        let old_key = resolve_key(&original.image, Bucket::Promotions).unwrap();
        table.fail_set_image();

        let result = manager.replace_asset(&original, &png("b.png")).await;

        assert!(matches!(result, Err(AssetError::Record(_))));
        assert_eq!(table.promotions()[0], original);
        assert!(blobs.contains(Bucket::Promotions, &old_key));
    }

    #[tokio::test]
    async fn replace_succeeds_even_if_old_blob_delete_fails() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());
        let table = MemoryCatalog::new(log.clone());
        let manager = lifecycle(&blobs, &table);

        let original = manager.create_with_asset(&png("a.png"), 1).await.unwrap();
        let old_key = resolve_key(&original.image, Bucket::Promotions).unwrap();
        blobs.fail_delete_of(&old_key);

        let updated = manager
            .replace_asset(&original, &png("b.png"))
            .await
            .unwrap();

        assert_ne!(updated.image, original.image);
        assert!(blobs.contains(Bucket::Promotions, &old_key));
    }

    #[tokio::test]
    async fn replace_of_legacy_url_skips_cleanup() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());
        let table = MemoryCatalog::new(log.clone());
        let legacy = table.seed_promotion(1, "https://legacy-cdn.example.com/banner.jpg");

        let updated = lifecycle(&blobs, &table)
            .replace_asset(&legacy, &png("b.png"))
            .await
            .unwrap();

        assert!(resolve_key(&updated.image, Bucket::Promotions).is_some());
        assert!(!log.lock().unwrap().iter().any(|c| matches!(c, Call::BlobDelete(_))));
    }

    #[tokio::test]
    async fn commit_rejects_foreign_urls() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());
        let table = MemoryCatalog::new(log.clone());
        let record = table.seed_promotion(1, "");
        let manager = lifecycle(&blobs, &table);

        for url in [
            "https://evil.example.com/promotions/promotions/x.png",
            "https://store/gallery/gallery/x.png",
            "not a url",
        ] {
            let result = manager.commit_upload(&record, url.into()).await;
            assert!(matches!(result, Err(AssetError::Validation(_))), "{url}");
        }
        assert_eq!(table.promotions()[0], record);
    }

    #[tokio::test]
    async fn commit_of_same_url_does_not_delete_it() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());
        let table = MemoryCatalog::new(log.clone());
        let manager = lifecycle(&blobs, &table);
        let record = manager.create_with_asset(&png("a.png"), 1).await.unwrap();
        log.lock().unwrap().clear();

        manager
            .commit_upload(&record, record.image.clone())
            .await
            .unwrap();

        assert_eq!(log.lock().unwrap().clone(), vec![Call::SetImage(record.id)]);
    }

    #[tokio::test]
    async fn commit_rejects_url_owned_by_another_record() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());
        let table = MemoryCatalog::new(log.clone());
        let manager = lifecycle(&blobs, &table);
        let first = manager.create_with_asset(&png("a.png"), 1).await.unwrap();
        let second = manager.create_with_asset(&png("b.png"), 1).await.unwrap();
        let first_key = resolve_key(&first.image, Bucket::Promotions).unwrap();
        log.lock().unwrap().clear();

        let result = manager.commit_upload(&second, first.image.clone()).await;
        assert!(matches!(result, Err(AssetError::Validation(_))));
        assert!(log.lock().unwrap().is_empty());

        // Deleting the first record leaves the second one with a live image.
        manager.delete_with_asset(&first).await.unwrap();
        assert!(!blobs.contains(Bucket::Promotions, &first_key));
        let survivor = &table.promotions()[0];
        assert_eq!(survivor.id, second.id);
        let survivor_key = resolve_key(&survivor.image, Bucket::Promotions).unwrap();
        assert!(blobs.contains(Bucket::Promotions, &survivor_key));
    }

    #[tokio::test]
    async fn delete_removes_record_before_blob() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());
        let table = MemoryCatalog::new(log.clone());
        let manager = lifecycle(&blobs, &table);
        let record = manager.create_with_asset(&png("a.png"), 1).await.unwrap();
        let key = resolve_key(&record.image, Bucket::Promotions).unwrap();
        log.lock().unwrap().clear();

        let cleanup = manager.delete_with_asset(&record).await.unwrap();

        assert_eq!(cleanup, Cleanup::Removed(key.clone()));
        assert!(table.promotions().is_empty());
        assert_eq!(
            log.lock().unwrap().clone(),
            vec![Call::DeleteRecord(record.id), Call::BlobDelete(key.to_string())]
        );
    }

    #[tokio::test]
    async fn delete_keeps_blob_when_record_delete_fails() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());
        let table = MemoryCatalog::new(log.clone());
        let manager = lifecycle(&blobs, &table);
        let record = manager.create_with_asset(&png("a.png"), 1).await.unwrap();
        let key = resolve_key(&record.image, Bucket::Promotions).unwrap();
        table.fail_delete_of(record.id);

        let result = manager.delete_with_asset(&record).await;

        assert!(matches!(result, Err(AssetError::Record(_))));
        assert!(blobs.contains(Bucket::Promotions, &key));
    }

    #[tokio::test]
    async fn delete_reports_blob_failure_without_failing() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());
        let table = MemoryCatalog::new(log.clone());
        let manager = lifecycle(&blobs, &table);
        let record = manager.create_with_asset(&png("a.png"), 1).await.unwrap();
        let key = resolve_key(&record.image, Bucket::Promotions).unwrap();
        blobs.fail_delete_of(&key);

        let cleanup = manager.delete_with_asset(&record).await.unwrap();

        assert!(matches!(cleanup, Cleanup::Failed { key: k, .. } if k == key));
        assert!(table.promotions().is_empty());
    }

    #[tokio::test]
    async fn abandon_with_same_url_makes_no_calls() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());
        let url = "https://store/promotions/promotions/a.png";

        let cleanup = abandon_draft_upload(&blobs, Bucket::Promotions, url, Some(url)).await;

        assert_eq!(cleanup, Cleanup::Skipped);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn abandon_deletes_uncommitted_draft() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());
        let table = MemoryCatalog::new(log.clone());
        let manager = lifecycle(&blobs, &table);
        let committed = manager.create_with_asset(&png("a.png"), 1).await.unwrap();
        let draft_url = manager.stage_upload(&png("b.png")).await.unwrap();
        let draft_key = resolve_key(&draft_url, Bucket::Promotions).unwrap();

        let cleanup = manager
            .abandon_draft_upload(&draft_url, Some(&committed.image))
            .await;

        assert_eq!(cleanup, Cleanup::Removed(draft_key.clone()));
        assert!(!blobs.contains(Bucket::Promotions, &draft_key));
        assert_eq!(blobs.keys(Bucket::Promotions).len(), 1);
    }

    #[tokio::test]
    async fn release_skips_unresolvable_urls() {
        let log = journal();
        let blobs = MemoryBlobStore::new(log.clone());

        for url in [None, Some(""), Some("https://store/products/products/a.png")] {
            assert_eq!(release(&blobs, Bucket::Promotions, url).await, Cleanup::Skipped);
        }
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn spawned_release_runs_to_completion() {
        let log = journal();
        let blobs = Arc::new(MemoryBlobStore::new(log.clone()));
        let key = BlobKey::parse("promotions/draft.png").unwrap();
        blobs
            .put(Bucket::Promotions, &key, b"x", "image/png")
            .await
            .unwrap();
        let url = blobs.public_url(Bucket::Promotions, &key);

        let handle = spawn_release(blobs.clone(), Bucket::Promotions, url);

        assert_eq!(handle.await.unwrap(), Cleanup::Removed(key.clone()));
        assert!(!blobs.contains(Bucket::Promotions, &key));
    }
}
