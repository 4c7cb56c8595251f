//! In-memory doubles that journal every call into one shared log, so tests
//! can assert the relative order of blob and record mutations.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use common::storage::{
    BlobKey, BlobStore, Bucket, ImageUpload, StorageError, StoredBlob, public_url,
};

use super::cascade::CategoryStore;
use super::record::{RecordError, RecordStore};
use crate::entity::{category, promotion};

pub const STORE_BASE: &str = "https://store";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Upload(String),
    BlobDelete(String),
    Insert(i32),
    SetImage(i32),
    DeleteRecord(i32),
    DeleteCategory(i32),
}

pub type Journal = Arc<Mutex<Vec<Call>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn png(name: &str) -> ImageUpload {
    ImageUpload::new(name, Some("image/png".into()), b"\x89PNG".to_vec())
}

pub struct MemoryBlobStore {
    journal: Journal,
    blobs: Mutex<BTreeMap<(Bucket, BlobKey), (u64, DateTime<Utc>)>>,
    fail_uploads: AtomicBool,
    fail_deletes: Mutex<HashSet<BlobKey>>,
}

impl MemoryBlobStore {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            blobs: Mutex::new(BTreeMap::new()),
            fail_uploads: AtomicBool::new(false),
            fail_deletes: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_uploads(&self) {
        self.fail_uploads.store(true, Ordering::SeqCst);
    }

    pub fn fail_delete_of(&self, key: &BlobKey) {
        self.fail_deletes.lock().unwrap().insert(key.clone());
    }

    /// Insert a blob directly, backdated by `age`, without journaling.
    pub fn seed(&self, bucket: Bucket, key: &str, age: Duration) -> String {
        let key = BlobKey::parse(key).unwrap();
        self.blobs
            .lock()
            .unwrap()
            .insert((bucket, key.clone()), (1, Utc::now() - age));
        public_url(STORE_BASE, bucket, &key)
    }

    pub fn contains(&self, bucket: Bucket, key: &BlobKey) -> bool {
        self.blobs
            .lock()
            .unwrap()
            .contains_key(&(bucket, key.clone()))
    }

    pub fn keys(&self, bucket: Bucket) -> Vec<BlobKey> {
        self.blobs
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| *b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        bucket: Bucket,
        key: &BlobKey,
        data: &[u8],
        _content_type: &str,
    ) -> Result<(), StorageError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("injected upload failure".into()));
        }
        self.journal
            .lock()
            .unwrap()
            .push(Call::Upload(key.to_string()));
        self.blobs
            .lock()
            .unwrap()
            .insert((bucket, key.clone()), (data.len() as u64, Utc::now()));
        Ok(())
    }

    async fn delete(&self, bucket: Bucket, key: &BlobKey) -> Result<bool, StorageError> {
        self.journal
            .lock()
            .unwrap()
            .push(Call::BlobDelete(key.to_string()));
        if self.fail_deletes.lock().unwrap().contains(key) {
            return Err(StorageError::Backend("injected delete failure".into()));
        }
        Ok(self
            .blobs
            .lock()
            .unwrap()
            .remove(&(bucket, key.clone()))
            .is_some())
    }

    fn public_url(&self, bucket: Bucket, key: &BlobKey) -> String {
        public_url(STORE_BASE, bucket, key)
    }

    async fn list(&self, bucket: Bucket) -> Result<Vec<StoredBlob>, StorageError> {
        Ok(self
            .blobs
            .lock()
            .unwrap()
            .iter()
            .filter(|((b, _), _)| *b == bucket)
            .map(|((_, key), (size, modified))| StoredBlob {
                key: key.clone(),
                size: *size,
                last_modified: Some(*modified),
            })
            .collect())
    }
}

/// Categories and promotions held in memory. Acts as the promotion
/// [`RecordStore`] and as the [`CategoryStore`].
pub struct MemoryCatalog {
    journal: Journal,
    categories: Mutex<Vec<category::Model>>,
    promotions: Mutex<Vec<promotion::Model>>,
    next_id: AtomicI32,
    fail_inserts: AtomicBool,
    fail_set_image: AtomicBool,
    fail_deletes: Mutex<HashSet<i32>>,
}

impl MemoryCatalog {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            categories: Mutex::new(Vec::new()),
            promotions: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(1),
            fail_inserts: AtomicBool::new(false),
            fail_set_image: AtomicBool::new(false),
            fail_deletes: Mutex::new(HashSet::new()),
        }
    }

    pub fn seed_category(&self, name: &str) -> category::Model {
        let model = category::Model {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: name.into(),
            name_key: category::name_key(name),
            created_at: Utc::now(),
        };
        self.categories.lock().unwrap().push(model.clone());
        model
    }

    pub fn seed_promotion(&self, category_id: i32, image: &str) -> promotion::Model {
        let model = promotion::Model {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            category_id,
            image: image.into(),
            created_at: Utc::now(),
        };
        self.promotions.lock().unwrap().push(model.clone());
        model
    }

    pub fn categories(&self) -> Vec<category::Model> {
        self.categories.lock().unwrap().clone()
    }

    pub fn promotions(&self) -> Vec<promotion::Model> {
        self.promotions.lock().unwrap().clone()
    }

    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }

    pub fn fail_set_image(&self) {
        self.fail_set_image.store(true, Ordering::SeqCst);
    }

    pub fn fail_delete_of(&self, id: i32) {
        self.fail_deletes.lock().unwrap().insert(id);
    }
}

#[async_trait]
impl RecordStore for MemoryCatalog {
    type Record = promotion::Model;
    type Draft = i32;

    async fn list(&self) -> Result<Vec<promotion::Model>, RecordError> {
        Ok(self.promotions())
    }

    async fn insert(
        &self,
        category_id: i32,
        image_url: String,
    ) -> Result<promotion::Model, RecordError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(RecordError::Database(sea_orm::DbErr::Custom(
                "injected insert failure".into(),
            )));
        }
        let model = self.seed_promotion(category_id, &image_url);
        self.journal.lock().unwrap().push(Call::Insert(model.id));
        Ok(model)
    }

    async fn set_image(
        &self,
        record: &promotion::Model,
        image_url: String,
    ) -> Result<promotion::Model, RecordError> {
        if self.fail_set_image.load(Ordering::SeqCst) {
            return Err(RecordError::Database(sea_orm::DbErr::Custom(
                "injected update failure".into(),
            )));
        }
        self.journal.lock().unwrap().push(Call::SetImage(record.id));
        let mut rows = self.promotions.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|p| p.id == record.id)
            .ok_or_else(|| RecordError::NotFound(format!("promotion {}", record.id)))?;
        row.image = image_url;
        Ok(row.clone())
    }

    async fn delete(&self, record: &promotion::Model) -> Result<(), RecordError> {
        self.journal
            .lock()
            .unwrap()
            .push(Call::DeleteRecord(record.id));
        if self.fail_deletes.lock().unwrap().contains(&record.id) {
            return Err(RecordError::Database(sea_orm::DbErr::Custom(
                "injected delete failure".into(),
            )));
        }
        let mut rows = self.promotions.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| p.id != record.id);
        if rows.len() == before {
            return Err(RecordError::NotFound(format!("promotion {}", record.id)));
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryStore for MemoryCatalog {
    async fn promotions_in(&self, category_id: i32) -> Result<Vec<promotion::Model>, RecordError> {
        Ok(self
            .promotions()
            .into_iter()
            .filter(|p| p.category_id == category_id)
            .collect())
    }

    async fn delete_category(&self, category_id: i32) -> Result<(), RecordError> {
        self.journal
            .lock()
            .unwrap()
            .push(Call::DeleteCategory(category_id));
        let mut rows = self.categories.lock().unwrap();
        let before = rows.len();
        rows.retain(|c| c.id != category_id);
        if rows.len() == before {
            return Err(RecordError::NotFound(format!("category {category_id}")));
        }
        Ok(())
    }
}
