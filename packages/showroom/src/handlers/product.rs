use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::Bucket;
use sea_orm::{ActiveModelTrait, Set};
use tracing::instrument;

use super::{lifecycle, prefix};
use crate::assets::RecordStore;
use crate::assets::tables::ProductTable;
use crate::entity::product;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::extractors::upload::UploadForm;
use crate::models::draft::CommitImageRequest;
use crate::models::product::{
    ProductFields, ProductResponse, UpdateProductRequest, validate_product_fields,
    validate_update_product,
};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Products",
    operation_id = "listProducts",
    summary = "List products, newest first",
    responses(
        (status = 200, description = "Products", body = Vec<ProductResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = ProductTable::new(&state.db).list().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Products",
    operation_id = "createProduct",
    summary = "Create a product",
    description = "Multipart form with a JSON `data` field (see `ProductFields`) and an image `file`.",
    request_body(content_type = "multipart/form-data", description = "data (JSON) + file"),
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, form))]
pub async fn create_product(
    _admin: AdminUser,
    State(state): State<AppState>,
    mut form: UploadForm,
) -> Result<impl IntoResponse, AppError> {
    let fields: ProductFields = form.json("data")?;
    validate_product_fields(&fields)?;
    let file = form.require_file()?;

    let table = ProductTable::new(&state.db);
    let product = lifecycle(&state, &table, Bucket::Products, prefix::PRODUCT)
        .create_with_asset(&file, fields.into())
        .await?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Products",
    operation_id = "updateProduct",
    summary = "Update product fields",
    description = "Partial update of everything except the image.",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload))]
pub async fn update_product(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    validate_update_product(&payload)?;
    let existing = ProductTable::new(&state.db).find(id).await?;

    let mut active: product::ActiveModel = existing.clone().into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(original_price) = payload.original_price {
        active.original_price = Set(original_price);
    }
    if let Some(discount) = payload.discount {
        active.discount = Set(discount);
    }
    if let Some(warranty) = payload.warranty {
        active.warranty = Set(warranty.trim().to_string());
    }
    if let Some(colors) = payload.colors {
        active.colors = Set(serde_json::json!(colors));
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(features) = payload.features {
        active.features = Set(serde_json::json!(features));
    }

    if !active.is_changed() {
        return Ok(Json(existing.into()));
    }
    let updated = active.update(&state.db).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    put,
    path = "/{id}/image",
    tag = "Products",
    operation_id = "replaceProductImage",
    summary = "Replace a product's image",
    params(("id" = i32, Path, description = "Product ID")),
    request_body(content_type = "multipart/form-data", description = "file"),
    responses(
        (status = 200, description = "Image replaced", body = ProductResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, form))]
pub async fn replace_product_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut form: UploadForm,
) -> Result<Json<ProductResponse>, AppError> {
    let file = form.require_file()?;
    let table = ProductTable::new(&state.db);
    let product = table.find(id).await?;

    let updated = lifecycle(&state, &table, Bucket::Products, prefix::PRODUCT)
        .replace_asset(&product, &file)
        .await?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    put,
    path = "/{id}/image-url",
    tag = "Products",
    operation_id = "commitProductImage",
    summary = "Commit a staged draft as the product's image",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = CommitImageRequest,
    responses(
        (status = 200, description = "Image committed", body = ProductResponse),
        (status = 400, description = "URL is not a products upload or is used by another record (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload))]
pub async fn commit_product_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CommitImageRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let table = ProductTable::new(&state.db);
    let product = table.find(id).await?;

    let updated = lifecycle(&state, &table, Bucket::Products, prefix::PRODUCT)
        .commit_upload(&product, payload.url)
        .await?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    operation_id = "deleteProduct",
    summary = "Delete a product and its image",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn delete_product(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let table = ProductTable::new(&state.db);
    let product = table.find(id).await?;

    lifecycle(&state, &table, Bucket::Products, prefix::PRODUCT)
        .delete_with_asset(&product)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
