use axum::Json;
use axum::extract::{Path, State};
use common::storage::Bucket;
use tracing::instrument;

use super::lifecycle;
use crate::assets::RecordStore;
use crate::assets::tables::WebsiteImageTable;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::upload::UploadForm;
use crate::models::media::{ImageType, WebsiteImageResponse};
use crate::state::AppState;

const KEY_PREFIX: &str = "site";

#[utoipa::path(
    get,
    path = "/",
    tag = "Website Images",
    operation_id = "listWebsiteImages",
    summary = "List website images (logo, footer logo)",
    responses(
        (status = 200, description = "Website images", body = Vec<WebsiteImageResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_website_images(
    State(state): State<AppState>,
) -> Result<Json<Vec<WebsiteImageResponse>>, AppError> {
    let images = WebsiteImageTable::new(&state.db).list().await?;
    Ok(Json(images.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    put,
    path = "/{image_type}",
    tag = "Website Images",
    operation_id = "putWebsiteImage",
    summary = "Set a website image",
    description = "Replaces the image of an existing slot in place, or creates the slot. \
        The old image is deleted only after the slot points at the new one.",
    params(("image_type" = String, Path, description = "`logo` or `footerLogo`")),
    request_body(content_type = "multipart/form-data", description = "file"),
    responses(
        (status = 200, description = "Image stored", body = WebsiteImageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, form))]
pub async fn put_website_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(image_type): Path<String>,
    mut form: UploadForm,
) -> Result<Json<WebsiteImageResponse>, AppError> {
    let image_type: ImageType = image_type.parse()?;
    let file = form.require_file()?;

    let table = WebsiteImageTable::new(&state.db);
    let manager = lifecycle(&state, &table, Bucket::Logos, KEY_PREFIX);

    let saved = match table.find(image_type.column_value()).await? {
        Some(existing) => manager.replace_asset(&existing, &file).await?,
        None => {
            manager
                .create_with_asset(&file, image_type.column_value().to_string())
                .await?
        }
    };

    Ok(Json(saved.into()))
}
