use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Hosted externally; no blob is attached.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "video")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub youtube_url: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub author: Option<String>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
