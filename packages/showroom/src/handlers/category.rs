use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::Bucket;
use sea_orm::SqlErr;
use tracing::instrument;

use super::{lifecycle, prefix};
use crate::assets::tables::{CategoryTable, PromotionTable};
use crate::assets::{self, CascadeReport};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::models::catalog::{CategoryResponse, CreateCategoryRequest, validate_create_category};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Categories",
    operation_id = "listCategories",
    summary = "List categories",
    responses(
        (status = 200, description = "Categories ordered by name", body = Vec<CategoryResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let categories = CategoryTable::new(&state.db).list().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Categories",
    operation_id = "createCategory",
    summary = "Create a category",
    description = "Names are unique, compared case-insensitively.",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Name already used (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(name = %payload.name))]
pub async fn create_category(
    _admin: AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_category(&payload)?;
    let name = payload.name.trim().to_string();
    let table = CategoryTable::new(&state.db);

    if table.find_by_name(&name).await?.is_some() {
        return Err(AppError::Conflict(format!("Category '{name}' already exists")));
    }

    let category = table.create(name.clone()).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Category race: unique constraint caught on insert");
            AppError::Conflict(format!("Category '{name}' already exists"))
        }
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Categories",
    operation_id = "deleteCategory",
    summary = "Delete a category with its promotions",
    description = "Deletes every promotion of the category together with its image, then the \
        category itself. Per-promotion failures are reported and do not stop the cascade.",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = CascadeReport),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn delete_category(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CascadeReport>, AppError> {
    let categories = CategoryTable::new(&state.db);
    categories.find(id).await?;

    let promotions = PromotionTable::new(&state.db);
    let manager = lifecycle(&state, &promotions, Bucket::Promotions, prefix::PROMOTION);
    let report = assets::delete_category(&manager, &categories, id).await?;

    if !report.failures.is_empty() {
        tracing::warn!(
            category_id = id,
            failures = report.failures.len(),
            "Category deleted with partial failures"
        );
    }

    Ok(Json(report))
}
