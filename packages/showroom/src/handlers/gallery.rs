use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::Bucket;
use sea_orm::{ActiveModelTrait, Set};
use tracing::instrument;

use super::{lifecycle, prefix};
use crate::assets::RecordStore;
use crate::assets::tables::GalleryTable;
use crate::entity::gallery_image;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::extractors::upload::UploadForm;
use crate::models::draft::CommitImageRequest;
use crate::models::media::{
    GalleryFields, GalleryImageResponse, UpdateGalleryRequest, validate_gallery_fields,
    validate_update_gallery,
};
use crate::models::shared::normalize_optional;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Gallery",
    operation_id = "listGalleryImages",
    summary = "List gallery images, newest first",
    responses(
        (status = 200, description = "Gallery images", body = Vec<GalleryImageResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_gallery(
    State(state): State<AppState>,
) -> Result<Json<Vec<GalleryImageResponse>>, AppError> {
    let images = GalleryTable::new(&state.db).list().await?;
    Ok(Json(images.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Gallery",
    operation_id = "createGalleryImage",
    summary = "Add a gallery image",
    description = "Multipart form with an image `file` and an optional JSON `data` field (see `GalleryFields`).",
    request_body(content_type = "multipart/form-data", description = "file + optional data (JSON)"),
    responses(
        (status = 201, description = "Image added", body = GalleryImageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, form))]
pub async fn create_gallery_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    mut form: UploadForm,
) -> Result<impl IntoResponse, AppError> {
    let fields: GalleryFields = match form.text("data") {
        Some(raw) if !raw.trim().is_empty() => form.json("data")?,
        _ => GalleryFields::default(),
    };
    validate_gallery_fields(&fields)?;
    let file = form.require_file()?;

    let table = GalleryTable::new(&state.db);
    let image = lifecycle(&state, &table, Bucket::Gallery, prefix::GALLERY)
        .create_with_asset(&file, fields.into())
        .await?;

    Ok((StatusCode::CREATED, Json(GalleryImageResponse::from(image))))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Gallery",
    operation_id = "updateGalleryImage",
    summary = "Update a gallery image's caption",
    params(("id" = i32, Path, description = "Gallery image ID")),
    request_body = UpdateGalleryRequest,
    responses(
        (status = 200, description = "Gallery image updated", body = GalleryImageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Gallery image not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload))]
pub async fn update_gallery_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateGalleryRequest>,
) -> Result<Json<GalleryImageResponse>, AppError> {
    validate_update_gallery(&payload)?;
    let existing = GalleryTable::new(&state.db).find(id).await?;

    let mut active: gallery_image::ActiveModel = existing.clone().into();
    if let Some(title) = payload.title {
        active.title = Set(normalize_optional(title));
    }
    if let Some(description) = payload.description {
        active.description = Set(normalize_optional(description));
    }

    if !active.is_changed() {
        return Ok(Json(existing.into()));
    }
    Ok(Json(active.update(&state.db).await?.into()))
}

#[utoipa::path(
    put,
    path = "/{id}/image",
    tag = "Gallery",
    operation_id = "replaceGalleryImage",
    summary = "Replace the file behind a gallery image",
    params(("id" = i32, Path, description = "Gallery image ID")),
    request_body(content_type = "multipart/form-data", description = "file"),
    responses(
        (status = 200, description = "Image replaced", body = GalleryImageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Gallery image not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, form))]
pub async fn replace_gallery_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut form: UploadForm,
) -> Result<Json<GalleryImageResponse>, AppError> {
    let file = form.require_file()?;
    let table = GalleryTable::new(&state.db);
    let image = table.find(id).await?;

    let updated = lifecycle(&state, &table, Bucket::Gallery, prefix::GALLERY)
        .replace_asset(&image, &file)
        .await?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    put,
    path = "/{id}/image-url",
    tag = "Gallery",
    operation_id = "commitGalleryImage",
    summary = "Commit a staged draft as the gallery image's file",
    params(("id" = i32, Path, description = "Gallery image ID")),
    request_body = CommitImageRequest,
    responses(
        (status = 200, description = "Image committed", body = GalleryImageResponse),
        (status = 400, description = "URL is not a gallery upload or is used by another record (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Gallery image not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload))]
pub async fn commit_gallery_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CommitImageRequest>,
) -> Result<Json<GalleryImageResponse>, AppError> {
    let table = GalleryTable::new(&state.db);
    let image = table.find(id).await?;

    let updated = lifecycle(&state, &table, Bucket::Gallery, prefix::GALLERY)
        .commit_upload(&image, payload.url)
        .await?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Gallery",
    operation_id = "deleteGalleryImage",
    summary = "Delete a gallery image and its file",
    params(("id" = i32, Path, description = "Gallery image ID")),
    responses(
        (status = 204, description = "Gallery image deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Gallery image not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn delete_gallery_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let table = GalleryTable::new(&state.db);
    let image = table.find(id).await?;

    lifecycle(&state, &table, Bucket::Gallery, prefix::GALLERY)
        .delete_with_asset(&image)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
