use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::validate_required;
use crate::entity::{category, promotion};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCategoryRequest {
    /// Unique name, compared case-insensitively.
    #[schema(example = "Ranger")]
    pub name: String,
}

pub fn validate_create_category(payload: &CreateCategoryRequest) -> Result<(), AppError> {
    validate_required("Name", &payload.name, 100)
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Ranger")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<category::Model> for CategoryResponse {
    fn from(m: category::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            created_at: m.created_at,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct PromotionListQuery {
    /// Only promotions of this category.
    pub category_id: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PromotionResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = 1)]
    pub category_id: i32,
    /// Public URL of the promotion banner.
    pub image: String,
    pub created_at: DateTime<Utc>,
}

impl From<promotion::Model> for PromotionResponse {
    fn from(m: promotion::Model) -> Self {
        Self {
            id: m.id,
            category_id: m.category_id,
            image: m.image,
            created_at: m.created_at,
        }
    }
}
