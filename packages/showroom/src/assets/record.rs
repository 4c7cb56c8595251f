use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

/// Record store failure. Callers only distinguish "zero rows" from
/// everything else.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(DbErr),
}

impl RecordError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RecordError::NotFound(_))
    }
}

impl From<DbErr> for RecordError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(detail) => RecordError::NotFound(detail),
            DbErr::RecordNotUpdated => RecordError::NotFound("no row was updated".into()),
            other => RecordError::Database(other),
        }
    }
}

/// A record that references at most one stored blob through its image field.
pub trait AssetRecord: Clone + Send + Sync + 'static {
    /// Identifier used in logs and error messages.
    fn record_id(&self) -> String;

    /// Public URL currently referenced, if any.
    fn image_url(&self) -> Option<&str>;
}

/// Typed table holding asset-bearing records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    type Record: AssetRecord;
    /// Every field of a new record except its image URL.
    type Draft: Send + 'static;

    async fn list(&self) -> Result<Vec<Self::Record>, RecordError>;

    async fn insert(
        &self,
        draft: Self::Draft,
        image_url: String,
    ) -> Result<Self::Record, RecordError>;

    /// Point `record` at a new image URL and return the updated row.
    async fn set_image(
        &self,
        record: &Self::Record,
        image_url: String,
    ) -> Result<Self::Record, RecordError>;

    async fn delete(&self, record: &Self::Record) -> Result<(), RecordError>;

    /// Whether any live record whose blobs share this store's bucket points
    /// at `image_url`.
    async fn is_referenced(&self, image_url: &str) -> Result<bool, RecordError> {
        Ok(self
            .list()
            .await?
            .iter()
            .any(|record| record.image_url() == Some(image_url)))
    }
}

fn non_empty(url: &str) -> Option<&str> {
    if url.trim().is_empty() { None } else { Some(url) }
}

impl AssetRecord for crate::entity::promotion::Model {
    fn record_id(&self) -> String {
        self.id.to_string()
    }
    fn image_url(&self) -> Option<&str> {
        non_empty(&self.image)
    }
}

impl AssetRecord for crate::entity::product::Model {
    fn record_id(&self) -> String {
        self.id.to_string()
    }
    fn image_url(&self) -> Option<&str> {
        non_empty(&self.image)
    }
}

impl AssetRecord for crate::entity::contact::Model {
    fn record_id(&self) -> String {
        self.id.to_string()
    }
    fn image_url(&self) -> Option<&str> {
        non_empty(&self.qr_code)
    }
}

impl AssetRecord for crate::entity::gallery_image::Model {
    fn record_id(&self) -> String {
        self.id.to_string()
    }
    fn image_url(&self) -> Option<&str> {
        non_empty(&self.image_url)
    }
}

impl AssetRecord for crate::entity::intro_slide::Model {
    fn record_id(&self) -> String {
        self.id.to_string()
    }
    fn image_url(&self) -> Option<&str> {
        non_empty(&self.image_url)
    }
}

impl AssetRecord for crate::entity::website_image::Model {
    fn record_id(&self) -> String {
        self.image_type.clone()
    }
    fn image_url(&self) -> Option<&str> {
        non_empty(&self.image_url)
    }
}
