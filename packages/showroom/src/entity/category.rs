use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Parent of promotions.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Display name as entered.
    pub name: String,

    /// Trimmed, lowercased `name`. Unique, so names differing only in case collide.
    #[sea_orm(unique)]
    pub name_key: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

/// Normalized form of a category name used for uniqueness.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
