//! Draft uploads: the editing state between picking a new image and saving
//! the record. A draft blob is referenced by nothing until it is committed
//! through one of the `image-url` endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::Bucket;
use tracing::instrument;

use super::prefix;
use crate::assets::{spawn_release, stage_upload};
use crate::assets::tables::live_urls;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::extractors::upload::UploadForm;
use crate::models::draft::{AbandonDraftRequest, DraftResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{bucket}",
    tag = "Drafts",
    operation_id = "stageDraft",
    summary = "Stage an image upload",
    description = "Validates and stores the `file` and returns its public URL. Nothing references \
        the blob until it is committed; abandon it with DELETE when the edit is cancelled.",
    params(("bucket" = Bucket, Path, description = "Target bucket")),
    request_body(content_type = "multipart/form-data", description = "file"),
    responses(
        (status = 201, description = "Draft stored", body = DraftResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, form))]
pub async fn stage_draft(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    mut form: UploadForm,
) -> Result<impl IntoResponse, AppError> {
    let bucket: Bucket = bucket.parse()?;
    let file = form.require_file()?;
    let url = stage_upload(
        state.blob_store.as_ref(),
        bucket,
        prefix::DRAFT,
        state.config.storage.max_upload_size,
        &file,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DraftResponse { url })))
}

#[utoipa::path(
    delete,
    path = "/{bucket}",
    tag = "Drafts",
    operation_id = "abandonDraft",
    summary = "Abandon a staged upload",
    description = "Deletes `uploaded_url` unless it equals `committed_url` or some record already \
        references it. Cleanup runs on its own task and finishes even if the client disconnects.",
    params(("bucket" = Bucket, Path, description = "Bucket the draft was staged in")),
    request_body = AbandonDraftRequest,
    responses(
        (status = 202, description = "Cleanup scheduled or nothing to do"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload))]
pub async fn abandon_draft(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    AppJson(payload): AppJson<AbandonDraftRequest>,
) -> Result<StatusCode, AppError> {
    let bucket: Bucket = bucket.parse()?;
    let uploaded = payload.uploaded_url;

    if payload.committed_url.as_deref() == Some(uploaded.as_str()) {
        return Ok(StatusCode::ACCEPTED);
    }
    // The client may be stale; never release a URL a record still points at.
    if live_urls(&state.db, bucket).await?.contains(&uploaded) {
        tracing::debug!(%bucket, url = %uploaded, "Draft is referenced; keeping it");
        return Ok(StatusCode::ACCEPTED);
    }

    spawn_release(state.blob_store.clone(), bucket, uploaded);
    Ok(StatusCode::ACCEPTED)
}
