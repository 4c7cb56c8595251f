use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub price: f64,
    pub original_price: Option<f64>,
    /// Discount in percent.
    pub discount: Option<i32>,
    pub warranty: String,

    /// Ordered JSON array of color names.
    #[sea_orm(column_type = "JsonBinary")]
    pub colors: serde_json::Value,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Ordered JSON array of feature bullet points.
    #[sea_orm(column_type = "JsonBinary")]
    pub features: serde_json::Value,

    pub image: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
