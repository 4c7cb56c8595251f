use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Singleton image per slot, updated in place.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "website_image")]
pub struct Model {
    /// Slot name: `logo` or `footer_logo`.
    #[sea_orm(primary_key, auto_increment = false)]
    pub image_type: String,

    pub image_url: String,

    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
