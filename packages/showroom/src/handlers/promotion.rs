use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::Bucket;
use tracing::instrument;

use super::{lifecycle, prefix};
use crate::assets::tables::{CategoryTable, PromotionTable};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::extractors::upload::UploadForm;
use crate::models::catalog::{PromotionListQuery, PromotionResponse};
use crate::models::draft::CommitImageRequest;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Promotions",
    operation_id = "listPromotions",
    summary = "List promotions",
    params(PromotionListQuery),
    responses(
        (status = 200, description = "Promotions", body = Vec<PromotionResponse>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_promotions(
    State(state): State<AppState>,
    Query(query): Query<PromotionListQuery>,
) -> Result<Json<Vec<PromotionResponse>>, AppError> {
    let promotions = PromotionTable::new(&state.db)
        .in_category(query.category_id)
        .await?;
    Ok(Json(promotions.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Promotions",
    operation_id = "createPromotion",
    summary = "Create a promotion",
    description = "Multipart form with a `category_id` text field and an image `file`. \
        The image is stored first; the promotion row is inserted only if the upload succeeded.",
    request_body(content_type = "multipart/form-data", description = "category_id + file"),
    responses(
        (status = 201, description = "Promotion created", body = PromotionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, form))]
pub async fn create_promotion(
    _admin: AdminUser,
    State(state): State<AppState>,
    mut form: UploadForm,
) -> Result<impl IntoResponse, AppError> {
    let category_id: i32 = form
        .require_text("category_id")?
        .trim()
        .parse()
        .map_err(|_| AppError::Validation("category_id must be an integer".into()))?;
    let file = form.require_file()?;

    CategoryTable::new(&state.db).find(category_id).await?;

    let table = PromotionTable::new(&state.db);
    let promotion = lifecycle(&state, &table, Bucket::Promotions, prefix::PROMOTION)
        .create_with_asset(&file, category_id)
        .await?;

    Ok((StatusCode::CREATED, Json(PromotionResponse::from(promotion))))
}

#[utoipa::path(
    put,
    path = "/{id}/image",
    tag = "Promotions",
    operation_id = "replacePromotionImage",
    summary = "Replace a promotion's image",
    description = "Uploads the new `file`, points the promotion at it, then deletes the old image.",
    params(("id" = i32, Path, description = "Promotion ID")),
    request_body(content_type = "multipart/form-data", description = "file"),
    responses(
        (status = 200, description = "Image replaced", body = PromotionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Promotion not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, form))]
pub async fn replace_promotion_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut form: UploadForm,
) -> Result<Json<PromotionResponse>, AppError> {
    let file = form.require_file()?;
    let table = PromotionTable::new(&state.db);
    let promotion = table.find(id).await?;

    let updated = lifecycle(&state, &table, Bucket::Promotions, prefix::PROMOTION)
        .replace_asset(&promotion, &file)
        .await?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    put,
    path = "/{id}/image-url",
    tag = "Promotions",
    operation_id = "commitPromotionImage",
    summary = "Commit a staged draft as the promotion's image",
    params(("id" = i32, Path, description = "Promotion ID")),
    request_body = CommitImageRequest,
    responses(
        (status = 200, description = "Image committed", body = PromotionResponse),
        (status = 400, description = "URL is not a promotions upload or is used by another record (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Promotion not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload))]
pub async fn commit_promotion_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CommitImageRequest>,
) -> Result<Json<PromotionResponse>, AppError> {
    let table = PromotionTable::new(&state.db);
    let promotion = table.find(id).await?;

    let updated = lifecycle(&state, &table, Bucket::Promotions, prefix::PROMOTION)
        .commit_upload(&promotion, payload.url)
        .await?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Promotions",
    operation_id = "deletePromotion",
    summary = "Delete a promotion and its image",
    params(("id" = i32, Path, description = "Promotion ID")),
    responses(
        (status = 204, description = "Promotion deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Promotion not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn delete_promotion(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let table = PromotionTable::new(&state.db);
    let promotion = table.find(id).await?;

    lifecycle(&state, &table, Bucket::Promotions, prefix::PROMOTION)
        .delete_with_asset(&promotion)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
