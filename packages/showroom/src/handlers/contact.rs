use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::Bucket;
use sea_orm::{ActiveModelTrait, Set};
use tracing::instrument;

use super::{lifecycle, prefix};
use crate::assets::RecordStore;
use crate::assets::tables::ContactTable;
use crate::entity::contact;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::extractors::upload::UploadForm;
use crate::models::contact::{
    ContactFields, ContactResponse, UpdateContactRequest, validate_contact_fields,
    validate_update_contact,
};
use crate::models::draft::CommitImageRequest;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Contacts",
    operation_id = "listContacts",
    summary = "List contacts",
    responses(
        (status = 200, description = "Contacts", body = Vec<ContactResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_contacts(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactResponse>>, AppError> {
    let contacts = ContactTable::new(&state.db).list().await?;
    Ok(Json(contacts.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Contacts",
    operation_id = "createContact",
    summary = "Create a contact with its QR code",
    description = "Multipart form with a JSON `data` field (see `ContactFields`) and the QR code image `file`.",
    request_body(content_type = "multipart/form-data", description = "data (JSON) + file"),
    responses(
        (status = 201, description = "Contact created", body = ContactResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, form))]
pub async fn create_contact(
    _admin: AdminUser,
    State(state): State<AppState>,
    mut form: UploadForm,
) -> Result<impl IntoResponse, AppError> {
    let fields: ContactFields = form.json("data")?;
    validate_contact_fields(&fields)?;
    let file = form.require_file()?;

    let table = ContactTable::new(&state.db);
    let contact = lifecycle(&state, &table, Bucket::Contacts, prefix::CONTACT)
        .create_with_asset(&file, fields.into())
        .await?;

    Ok((StatusCode::CREATED, Json(ContactResponse::from(contact))))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Contacts",
    operation_id = "updateContact",
    summary = "Update contact fields",
    params(("id" = i32, Path, description = "Contact ID")),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "Contact updated", body = ContactResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Contact not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload))]
pub async fn update_contact(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateContactRequest>,
) -> Result<Json<ContactResponse>, AppError> {
    validate_update_contact(&payload)?;
    let existing = ContactTable::new(&state.db).find(id).await?;

    let mut active: contact::ActiveModel = existing.clone().into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(kind) = payload.kind {
        active.kind = Set(kind.as_str().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(url) = payload.url {
        active.url = Set(url.trim().to_string());
    }

    if !active.is_changed() {
        return Ok(Json(existing.into()));
    }
    Ok(Json(active.update(&state.db).await?.into()))
}

#[utoipa::path(
    put,
    path = "/{id}/image",
    tag = "Contacts",
    operation_id = "replaceContactQrCode",
    summary = "Replace a contact's QR code",
    params(("id" = i32, Path, description = "Contact ID")),
    request_body(content_type = "multipart/form-data", description = "file"),
    responses(
        (status = 200, description = "QR code replaced", body = ContactResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Contact not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, form))]
pub async fn replace_contact_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut form: UploadForm,
) -> Result<Json<ContactResponse>, AppError> {
    let file = form.require_file()?;
    let table = ContactTable::new(&state.db);
    let contact = table.find(id).await?;

    let updated = lifecycle(&state, &table, Bucket::Contacts, prefix::CONTACT)
        .replace_asset(&contact, &file)
        .await?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    put,
    path = "/{id}/image-url",
    tag = "Contacts",
    operation_id = "commitContactQrCode",
    summary = "Commit a staged draft as the contact's QR code",
    params(("id" = i32, Path, description = "Contact ID")),
    request_body = CommitImageRequest,
    responses(
        (status = 200, description = "QR code committed", body = ContactResponse),
        (status = 400, description = "URL is not a contacts upload or is used by another record (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Contact not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload))]
pub async fn commit_contact_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CommitImageRequest>,
) -> Result<Json<ContactResponse>, AppError> {
    let table = ContactTable::new(&state.db);
    let contact = table.find(id).await?;

    let updated = lifecycle(&state, &table, Bucket::Contacts, prefix::CONTACT)
        .commit_upload(&contact, payload.url)
        .await?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Contacts",
    operation_id = "deleteContact",
    summary = "Delete a contact and its QR code",
    params(("id" = i32, Path, description = "Contact ID")),
    responses(
        (status = 204, description = "Contact deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Contact not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn delete_contact(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let table = ContactTable::new(&state.db);
    let contact = table.find(id).await?;

    lifecycle(&state, &table, Bucket::Contacts, prefix::CONTACT)
        .delete_with_asset(&contact)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
