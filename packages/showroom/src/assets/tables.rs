//! sea-orm backed record stores, one per asset-bearing table.

use async_trait::async_trait;
use chrono::Utc;
use common::storage::Bucket;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, DeleteResult, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use super::cascade::CategoryStore;
use super::record::{RecordError, RecordStore};
use crate::entity::{
    category, contact, gallery_image, intro_slide, product, promotion, website_image,
};

fn ensure_deleted(res: DeleteResult, what: String) -> Result<(), RecordError> {
    if res.rows_affected == 0 {
        return Err(RecordError::NotFound(what));
    }
    Ok(())
}

/// Gallery images and intro slides share the gallery bucket.
async fn gallery_bucket_references(db: &DatabaseConnection, url: &str) -> Result<bool, RecordError> {
    let in_gallery = gallery_image::Entity::find()
        .filter(gallery_image::Column::ImageUrl.eq(url))
        .one(db)
        .await?
        .is_some();
    if in_gallery {
        return Ok(true);
    }
    Ok(intro_slide::Entity::find()
        .filter(intro_slide::Column::ImageUrl.eq(url))
        .one(db)
        .await?
        .is_some())
}

pub struct CategoryTable<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CategoryTable<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<category::Model>, RecordError> {
        Ok(category::Entity::find()
            .order_by_asc(category::Column::Name)
            .all(self.db)
            .await?)
    }

    pub async fn find(&self, id: i32) -> Result<category::Model, RecordError> {
        category::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RecordError::NotFound(format!("category {id}")))
    }

    /// Case-insensitive lookup by name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<category::Model>, RecordError> {
        Ok(category::Entity::find()
            .filter(category::Column::NameKey.eq(category::name_key(name)))
            .one(self.db)
            .await?)
    }

    /// Insert a category. A unique violation surfaces as the raw `DbErr` so
    /// callers can report a conflict.
    pub async fn create(&self, name: String) -> Result<category::Model, DbErr> {
        category::ActiveModel {
            name_key: Set(category::name_key(&name)),
            name: Set(name),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

#[async_trait]
impl CategoryStore for CategoryTable<'_> {
    async fn promotions_in(&self, category_id: i32) -> Result<Vec<promotion::Model>, RecordError> {
        Ok(promotion::Entity::find()
            .filter(promotion::Column::CategoryId.eq(category_id))
            .order_by_asc(promotion::Column::Id)
            .all(self.db)
            .await?)
    }

    async fn delete_category(&self, category_id: i32) -> Result<(), RecordError> {
        let res = category::Entity::delete_by_id(category_id)
            .exec(self.db)
            .await?;
        ensure_deleted(res, format!("category {category_id}"))
    }
}

pub struct PromotionTable<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PromotionTable<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find(&self, id: i32) -> Result<promotion::Model, RecordError> {
        promotion::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RecordError::NotFound(format!("promotion {id}")))
    }

    pub async fn in_category(
        &self,
        category_id: Option<i32>,
    ) -> Result<Vec<promotion::Model>, RecordError> {
        let mut query = promotion::Entity::find();
        if let Some(category_id) = category_id {
            query = query.filter(promotion::Column::CategoryId.eq(category_id));
        }
        Ok(query
            .order_by_asc(promotion::Column::Id)
            .all(self.db)
            .await?)
    }
}

#[async_trait]
impl RecordStore for PromotionTable<'_> {
    type Record = promotion::Model;
    /// Owning category id.
    type Draft = i32;

    async fn list(&self) -> Result<Vec<promotion::Model>, RecordError> {
        self.in_category(None).await
    }

    async fn insert(&self, category_id: i32, image_url: String) -> Result<promotion::Model, RecordError> {
        Ok(promotion::ActiveModel {
            category_id: Set(category_id),
            image: Set(image_url),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?)
    }

    async fn set_image(
        &self,
        record: &promotion::Model,
        image_url: String,
    ) -> Result<promotion::Model, RecordError> {
        let mut active: promotion::ActiveModel = record.clone().into();
        active.image = Set(image_url);
        Ok(active.update(self.db).await?)
    }

    async fn delete(&self, record: &promotion::Model) -> Result<(), RecordError> {
        let res = promotion::Entity::delete_by_id(record.id)
            .exec(self.db)
            .await?;
        ensure_deleted(res, format!("promotion {}", record.id))
    }

    async fn is_referenced(&self, image_url: &str) -> Result<bool, RecordError> {
        Ok(promotion::Entity::find()
            .filter(promotion::Column::Image.eq(image_url))
            .one(self.db)
            .await?
            .is_some())
    }
}

/// Product fields other than the image.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub discount: Option<i32>,
    pub warranty: String,
    pub colors: Vec<String>,
    pub description: String,
    pub features: Vec<String>,
}

pub struct ProductTable<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ProductTable<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find(&self, id: i32) -> Result<product::Model, RecordError> {
        product::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RecordError::NotFound(format!("product {id}")))
    }
}

#[async_trait]
impl RecordStore for ProductTable<'_> {
    type Record = product::Model;
    type Draft = ProductDraft;

    async fn list(&self) -> Result<Vec<product::Model>, RecordError> {
        Ok(product::Entity::find()
            .order_by_desc(product::Column::CreatedAt)
            .all(self.db)
            .await?)
    }

    async fn insert(&self, draft: ProductDraft, image_url: String) -> Result<product::Model, RecordError> {
        Ok(product::ActiveModel {
            name: Set(draft.name),
            price: Set(draft.price),
            original_price: Set(draft.original_price),
            discount: Set(draft.discount),
            warranty: Set(draft.warranty),
            colors: Set(serde_json::json!(draft.colors)),
            description: Set(draft.description),
            features: Set(serde_json::json!(draft.features)),
            image: Set(image_url),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?)
    }

    async fn set_image(
        &self,
        record: &product::Model,
        image_url: String,
    ) -> Result<product::Model, RecordError> {
        let mut active: product::ActiveModel = record.clone().into();
        active.image = Set(image_url);
        Ok(active.update(self.db).await?)
    }

    async fn delete(&self, record: &product::Model) -> Result<(), RecordError> {
        let res = product::Entity::delete_by_id(record.id).exec(self.db).await?;
        ensure_deleted(res, format!("product {}", record.id))
    }

    async fn is_referenced(&self, image_url: &str) -> Result<bool, RecordError> {
        Ok(product::Entity::find()
            .filter(product::Column::Image.eq(image_url))
            .one(self.db)
            .await?
            .is_some())
    }
}

#[derive(Debug, Clone)]
pub struct ContactDraft {
    pub name: String,
    pub kind: String,
    pub description: String,
    pub url: String,
}

pub struct ContactTable<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ContactTable<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find(&self, id: i32) -> Result<contact::Model, RecordError> {
        contact::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RecordError::NotFound(format!("contact {id}")))
    }
}

#[async_trait]
impl RecordStore for ContactTable<'_> {
    type Record = contact::Model;
    type Draft = ContactDraft;

    async fn list(&self) -> Result<Vec<contact::Model>, RecordError> {
        Ok(contact::Entity::find()
            .order_by_asc(contact::Column::Id)
            .all(self.db)
            .await?)
    }

    async fn insert(&self, draft: ContactDraft, image_url: String) -> Result<contact::Model, RecordError> {
        Ok(contact::ActiveModel {
            name: Set(draft.name),
            kind: Set(draft.kind),
            qr_code: Set(image_url),
            description: Set(draft.description),
            url: Set(draft.url),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?)
    }

    async fn set_image(
        &self,
        record: &contact::Model,
        image_url: String,
    ) -> Result<contact::Model, RecordError> {
        let mut active: contact::ActiveModel = record.clone().into();
        active.qr_code = Set(image_url);
        Ok(active.update(self.db).await?)
    }

    async fn delete(&self, record: &contact::Model) -> Result<(), RecordError> {
        let res = contact::Entity::delete_by_id(record.id).exec(self.db).await?;
        ensure_deleted(res, format!("contact {}", record.id))
    }

    async fn is_referenced(&self, image_url: &str) -> Result<bool, RecordError> {
        Ok(contact::Entity::find()
            .filter(contact::Column::QrCode.eq(image_url))
            .one(self.db)
            .await?
            .is_some())
    }
}

#[derive(Debug, Clone, Default)]
pub struct GalleryDraft {
    pub title: Option<String>,
    pub description: Option<String>,
}

pub struct GalleryTable<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GalleryTable<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find(&self, id: i32) -> Result<gallery_image::Model, RecordError> {
        gallery_image::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RecordError::NotFound(format!("gallery image {id}")))
    }
}

#[async_trait]
impl RecordStore for GalleryTable<'_> {
    type Record = gallery_image::Model;
    type Draft = GalleryDraft;

    async fn list(&self) -> Result<Vec<gallery_image::Model>, RecordError> {
        Ok(gallery_image::Entity::find()
            .order_by_desc(gallery_image::Column::CreatedAt)
            .all(self.db)
            .await?)
    }

    async fn insert(
        &self,
        draft: GalleryDraft,
        image_url: String,
    ) -> Result<gallery_image::Model, RecordError> {
        Ok(gallery_image::ActiveModel {
            image_url: Set(image_url),
            title: Set(draft.title),
            description: Set(draft.description),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?)
    }

    async fn set_image(
        &self,
        record: &gallery_image::Model,
        image_url: String,
    ) -> Result<gallery_image::Model, RecordError> {
        let mut active: gallery_image::ActiveModel = record.clone().into();
        active.image_url = Set(image_url);
        Ok(active.update(self.db).await?)
    }

    async fn delete(&self, record: &gallery_image::Model) -> Result<(), RecordError> {
        let res = gallery_image::Entity::delete_by_id(record.id)
            .exec(self.db)
            .await?;
        ensure_deleted(res, format!("gallery image {}", record.id))
    }

    async fn is_referenced(&self, image_url: &str) -> Result<bool, RecordError> {
        gallery_bucket_references(self.db, image_url).await
    }
}

pub struct SlideTable<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SlideTable<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find(&self, id: i32) -> Result<intro_slide::Model, RecordError> {
        intro_slide::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RecordError::NotFound(format!("slide {id}")))
    }
}

#[async_trait]
impl RecordStore for SlideTable<'_> {
    type Record = intro_slide::Model;
    type Draft = ();

    async fn list(&self) -> Result<Vec<intro_slide::Model>, RecordError> {
        Ok(intro_slide::Entity::find()
            .order_by_asc(intro_slide::Column::CreatedAt)
            .order_by_asc(intro_slide::Column::Id)
            .all(self.db)
            .await?)
    }

    async fn insert(&self, _draft: (), image_url: String) -> Result<intro_slide::Model, RecordError> {
        Ok(intro_slide::ActiveModel {
            image_url: Set(image_url),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?)
    }

    async fn set_image(
        &self,
        record: &intro_slide::Model,
        image_url: String,
    ) -> Result<intro_slide::Model, RecordError> {
        let mut active: intro_slide::ActiveModel = record.clone().into();
        active.image_url = Set(image_url);
        Ok(active.update(self.db).await?)
    }

    async fn delete(&self, record: &intro_slide::Model) -> Result<(), RecordError> {
        let res = intro_slide::Entity::delete_by_id(record.id)
            .exec(self.db)
            .await?;
        ensure_deleted(res, format!("slide {}", record.id))
    }

    async fn is_referenced(&self, image_url: &str) -> Result<bool, RecordError> {
        gallery_bucket_references(self.db, image_url).await
    }
}

pub struct WebsiteImageTable<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> WebsiteImageTable<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find(&self, image_type: &str) -> Result<Option<website_image::Model>, RecordError> {
        Ok(website_image::Entity::find_by_id(image_type.to_owned())
            .one(self.db)
            .await?)
    }
}

#[async_trait]
impl RecordStore for WebsiteImageTable<'_> {
    type Record = website_image::Model;
    /// Slot name, which is also the primary key.
    type Draft = String;

    async fn list(&self) -> Result<Vec<website_image::Model>, RecordError> {
        Ok(website_image::Entity::find()
            .order_by_asc(website_image::Column::ImageType)
            .all(self.db)
            .await?)
    }

    async fn insert(
        &self,
        image_type: String,
        image_url: String,
    ) -> Result<website_image::Model, RecordError> {
        Ok(website_image::ActiveModel {
            image_type: Set(image_type),
            image_url: Set(image_url),
            updated_at: Set(Utc::now()),
        }
        .insert(self.db)
        .await?)
    }

    async fn set_image(
        &self,
        record: &website_image::Model,
        image_url: String,
    ) -> Result<website_image::Model, RecordError> {
        let mut active: website_image::ActiveModel = record.clone().into();
        active.image_url = Set(image_url);
        active.updated_at = Set(Utc::now());
        Ok(active.update(self.db).await?)
    }

    async fn delete(&self, record: &website_image::Model) -> Result<(), RecordError> {
        let res = website_image::Entity::delete_by_id(record.image_type.clone())
            .exec(self.db)
            .await?;
        ensure_deleted(res, format!("website image {}", record.image_type))
    }

    async fn is_referenced(&self, image_url: &str) -> Result<bool, RecordError> {
        Ok(website_image::Entity::find()
            .filter(website_image::Column::ImageUrl.eq(image_url))
            .one(self.db)
            .await?
            .is_some())
    }
}

/// Every image URL currently referenced from a record in `bucket`.
pub async fn live_urls(db: &DatabaseConnection, bucket: Bucket) -> Result<Vec<String>, RecordError> {
    let urls = match bucket {
        Bucket::Products => ProductTable::new(db)
            .list()
            .await?
            .into_iter()
            .map(|p| p.image)
            .collect(),
        Bucket::Contacts => ContactTable::new(db)
            .list()
            .await?
            .into_iter()
            .map(|c| c.qr_code)
            .collect(),
        Bucket::Promotions => PromotionTable::new(db)
            .list()
            .await?
            .into_iter()
            .map(|p| p.image)
            .collect(),
        Bucket::Logos => WebsiteImageTable::new(db)
            .list()
            .await?
            .into_iter()
            .map(|w| w.image_url)
            .collect(),
        Bucket::Gallery => {
            let mut urls: Vec<String> = GalleryTable::new(db)
                .list()
                .await?
                .into_iter()
                .map(|g| g.image_url)
                .collect();
            urls.extend(SlideTable::new(db).list().await?.into_iter().map(|s| s.image_url));
            urls
        }
    };
    Ok(urls)
}
