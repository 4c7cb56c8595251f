use std::collections::HashSet;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::Bucket;
use tracing::instrument;

use super::{lifecycle, prefix};
use crate::assets::tables::SlideTable;
use crate::assets::{AssetError, Cleanup, RecordStore};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::upload::UploadForm;
use crate::models::media::{SaveSlidesResponse, SlideResponse};
use crate::models::shared::parse_id_list;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Slides",
    operation_id = "listSlides",
    summary = "List intro slides in display order",
    responses(
        (status = 200, description = "Slides", body = Vec<SlideResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_slides(
    State(state): State<AppState>,
) -> Result<Json<Vec<SlideResponse>>, AppError> {
    let slides = SlideTable::new(&state.db).list().await?;
    Ok(Json(slides.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Slides",
    operation_id = "createSlide",
    summary = "Append an intro slide",
    request_body(content_type = "multipart/form-data", description = "file"),
    responses(
        (status = 201, description = "Slide created", body = SlideResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, form))]
pub async fn create_slide(
    _admin: AdminUser,
    State(state): State<AppState>,
    mut form: UploadForm,
) -> Result<impl IntoResponse, AppError> {
    let file = form.require_file()?;
    let table = SlideTable::new(&state.db);
    let slide = lifecycle(&state, &table, Bucket::Gallery, prefix::SLIDE)
        .create_with_asset(&file, ())
        .await?;

    Ok((StatusCode::CREATED, Json(SlideResponse::from(slide))))
}

#[utoipa::path(
    put,
    path = "/",
    tag = "Slides",
    operation_id = "saveSlides",
    summary = "Save the full slide set",
    description = "Multipart form with repeated `keep` fields (ids of existing slides to keep) and \
        any number of new image files. New files are stored and appended first; existing slides \
        not listed in `keep` are then deleted together with their images. A failed save is not \
        rolled back: slides created before the failure stay, and no existing slide is deleted.",
    request_body(content_type = "multipart/form-data", description = "keep (repeated) + files"),
    responses(
        (status = 200, description = "Slides saved", body = SaveSlidesResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, form), fields(files = form.files.len()))]
pub async fn save_slides(
    _admin: AdminUser,
    State(state): State<AppState>,
    form: UploadForm,
) -> Result<Json<SaveSlidesResponse>, AppError> {
    let keep: HashSet<i32> = parse_id_list(form.all("keep"), "slide")?
        .into_iter()
        .collect();

    let table = SlideTable::new(&state.db);
    let manager = lifecycle(&state, &table, Bucket::Gallery, prefix::SLIDE);

    // Reject the whole save before touching anything.
    for file in &form.files {
        file.validate(state.config.storage.max_upload_size)?;
    }
    let current = table.list().await?;
    if let Some(unknown) = keep.iter().find(|id| !current.iter().any(|s| s.id == **id)) {
        return Err(AppError::Validation(format!("Unknown slide id: {unknown}")));
    }

    let mut created = 0;
    for file in &form.files {
        if let Err(e) = manager.create_with_asset(file, ()).await {
            tracing::warn!(created, error = %e, "Slide save stopped; earlier new slides were kept");
            return Err(e.into());
        }
        created += 1;
    }

    let mut deleted = 0;
    let mut cleanup_failures = 0;
    for slide in current.iter().filter(|s| !keep.contains(&s.id)) {
        match manager.delete_with_asset(slide).await {
            Ok(cleanup) => {
                deleted += 1;
                if matches!(cleanup, Cleanup::Failed { .. }) {
                    cleanup_failures += 1;
                }
            }
            Err(AssetError::Record(e)) if e.is_not_found() => {
                tracing::debug!(slide_id = slide.id, "Slide already gone");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let slides = manager.list().await?;
    Ok(Json(SaveSlidesResponse {
        slides: slides.into_iter().map(Into::into).collect(),
        created,
        deleted,
        cleanup_failures,
    }))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Slides",
    operation_id = "deleteSlide",
    summary = "Delete an intro slide and its image",
    params(("id" = i32, Path, description = "Slide ID")),
    responses(
        (status = 204, description = "Slide deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Slide not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn delete_slide(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let table = SlideTable::new(&state.db);
    let slide = table.find(id).await?;

    lifecycle(&state, &table, Bucket::Gallery, prefix::SLIDE)
        .delete_with_asset(&slide)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
