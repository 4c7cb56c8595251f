use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{double_option, validate_amount, validate_required};
use crate::assets::tables::ProductDraft;
use crate::entity::product;
use crate::error::AppError;

/// Product fields sent as the JSON `data` part of a multipart create.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ProductFields {
    #[schema(example = "Ranger Wildtrak")]
    pub name: String,
    #[schema(example = 42990.0)]
    pub price: f64,
    pub original_price: Option<f64>,
    /// Discount in percent (0-100).
    pub discount: Option<i32>,
    #[serde(default)]
    pub warranty: String,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
}

fn validate_discount(discount: Option<i32>) -> Result<(), AppError> {
    if let Some(d) = discount
        && !(0..=100).contains(&d)
    {
        return Err(AppError::Validation("Discount must be 0-100".into()));
    }
    Ok(())
}

fn validate_list(label: &str, items: &[String]) -> Result<(), AppError> {
    if items.len() > 50 {
        return Err(AppError::Validation(format!("Too many {label}: max 50")));
    }
    for item in items {
        validate_required(label, item, 200)?;
    }
    Ok(())
}

pub fn validate_product_fields(fields: &ProductFields) -> Result<(), AppError> {
    validate_required("Name", &fields.name, 200)?;
    validate_amount("Price", fields.price)?;
    if let Some(original) = fields.original_price {
        validate_amount("Original price", original)?;
    }
    validate_discount(fields.discount)?;
    validate_list("Colors", &fields.colors)?;
    validate_list("Features", &fields.features)
}

impl From<ProductFields> for ProductDraft {
    fn from(f: ProductFields) -> Self {
        Self {
            name: f.name.trim().to_string(),
            price: f.price,
            original_price: f.original_price,
            discount: f.discount,
            warranty: f.warranty.trim().to_string(),
            colors: f.colors,
            description: f.description,
            features: f.features,
        }
    }
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    pub original_price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub discount: Option<Option<i32>>,
    pub warranty: Option<String>,
    pub colors: Option<Vec<String>>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
}

pub fn validate_update_product(payload: &UpdateProductRequest) -> Result<(), AppError> {
    if let Some(name) = &payload.name {
        validate_required("Name", name, 200)?;
    }
    if let Some(price) = payload.price {
        validate_amount("Price", price)?;
    }
    if let Some(Some(original)) = payload.original_price {
        validate_amount("Original price", original)?;
    }
    if let Some(discount) = payload.discount {
        validate_discount(discount)?;
    }
    if let Some(colors) = &payload.colors {
        validate_list("Colors", colors)?;
    }
    if let Some(features) = &payload.features {
        validate_list("Features", features)?;
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub discount: Option<i32>,
    pub warranty: String,
    pub colors: Vec<String>,
    pub description: String,
    pub features: Vec<String>,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

fn string_list(value: serde_json::Value) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_default()
}

impl From<product::Model> for ProductResponse {
    fn from(m: product::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            price: m.price,
            original_price: m.original_price,
            discount: m.discount,
            warranty: m.warranty,
            colors: string_list(m.colors),
            description: m.description,
            features: string_list(m.features),
            image: m.image,
            created_at: m.created_at,
        }
    }
}
