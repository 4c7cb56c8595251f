use std::time::Duration;

use axum::Json;
use axum::extract::{Path, Query, State};
use common::storage::Bucket;
use tracing::instrument;

use crate::assets::tables::live_urls;
use crate::assets::{SweepReport, sweep_bucket};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::models::draft::SweepQuery;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/sweep/{bucket}",
    tag = "Maintenance",
    operation_id = "sweepBucket",
    summary = "Delete orphaned blobs in a bucket",
    description = "Deletes blobs that no record references and that are older than \
        `storage.sweep_grace_secs`. With `dry_run=true` only reports the candidates.",
    params(("bucket" = Bucket, Path, description = "Bucket to sweep"), SweepQuery),
    responses(
        (status = 200, description = "Sweep finished", body = SweepReport),
        (status = 400, description = "Unknown bucket (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Listing failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, query), fields(dry_run = query.dry_run))]
pub async fn sweep(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    Query(query): Query<SweepQuery>,
) -> Result<Json<SweepReport>, AppError> {
    let bucket: Bucket = bucket.parse()?;
    let live = live_urls(&state.db, bucket).await?;
    let grace = Duration::from_secs(state.config.storage.sweep_grace_secs);

    let report = sweep_bucket(
        state.blob_store.as_ref(),
        bucket,
        &live,
        grace,
        query.dry_run,
    )
    .await?;

    Ok(Json(report))
}
