use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::lifecycle::{AssetError, AssetLifecycle, Cleanup};
use super::record::{RecordError, RecordStore};
use crate::entity::promotion;

/// Category rows and the lookup of their promotions.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn promotions_in(&self, category_id: i32) -> Result<Vec<promotion::Model>, RecordError>;

    async fn delete_category(&self, category_id: i32) -> Result<(), RecordError>;
}

/// Which step of a promotion's deletion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Record,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct CascadeFailure {
    pub promotion_id: i32,
    pub stage: FailureStage,
    pub error: String,
}

/// Result of a category cascade delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct CascadeReport {
    pub category_id: i32,
    /// Promotion rows that were deleted.
    pub promotions_deleted: usize,
    /// Promotion images that were deleted from storage.
    pub images_removed: usize,
    /// Per-promotion failures. None of them stop the cascade.
    pub failures: Vec<CascadeFailure>,
}

/// Delete every promotion of a category with its image, then the category.
///
/// Each promotion is attempted independently and failures are collected.
/// The category row is deleted last, after all promotions were attempted.
#[instrument(skip(promotions, categories))]
pub async fn delete_category<S>(
    promotions: &AssetLifecycle<'_, S>,
    categories: &dyn CategoryStore,
    category_id: i32,
) -> Result<CascadeReport, AssetError>
where
    S: RecordStore<Record = promotion::Model>,
{
    let items = categories.promotions_in(category_id).await?;

    let mut report = CascadeReport {
        category_id,
        promotions_deleted: 0,
        images_removed: 0,
        failures: Vec::new(),
    };

    for promo in &items {
        match promotions.delete_with_asset(promo).await {
            Ok(cleanup) => {
                report.promotions_deleted += 1;
                match cleanup {
                    Cleanup::Removed(_) => report.images_removed += 1,
                    Cleanup::Skipped => {}
                    Cleanup::Failed { error, .. } => report.failures.push(CascadeFailure {
                        promotion_id: promo.id,
                        stage: FailureStage::Image,
                        error,
                    }),
                }
            }
            Err(e) => {
                warn!(promotion_id = promo.id, error = %e, "Failed to delete promotion");
                report.failures.push(CascadeFailure {
                    promotion_id: promo.id,
                    stage: FailureStage::Record,
                    error: e.to_string(),
                });
            }
        }
    }

    categories.delete_category(category_id).await?;

    info!(
        promotions = items.len(),
        deleted = report.promotions_deleted,
        failures = report.failures.len(),
        "Category deleted"
    );

    Ok(report)
}
