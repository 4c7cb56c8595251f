use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{validate_optional, validate_required};
use crate::assets::tables::ContactDraft;
use crate::entity::contact;
use crate::error::AppError;

/// Channel a contact entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Social,
    Chat,
    Video,
    Phone,
    Email,
}

impl ContactKind {
    pub const ALL: [ContactKind; 5] = [
        ContactKind::Social,
        ContactKind::Chat,
        ContactKind::Video,
        ContactKind::Phone,
        ContactKind::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactKind::Social => "social",
            ContactKind::Chat => "chat",
            ContactKind::Video => "video",
            ContactKind::Phone => "phone",
            ContactKind::Email => "email",
        }
    }
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContactKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown contact type: {s}")))
    }
}

/// Contact fields sent as the JSON `data` part of a multipart create.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ContactFields {
    #[schema(example = "Zalo")]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ContactKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
}

pub fn validate_contact_fields(fields: &ContactFields) -> Result<(), AppError> {
    validate_required("Name", &fields.name, 100)?;
    validate_optional("Description", Some(&fields.description), 2000)?;
    validate_optional("URL", Some(&fields.url), 2048)
}

impl From<ContactFields> for ContactDraft {
    fn from(f: ContactFields) -> Self {
        Self {
            name: f.name.trim().to_string(),
            kind: f.kind.as_str().to_string(),
            description: f.description,
            url: f.url.trim().to_string(),
        }
    }
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ContactKind>,
    pub description: Option<String>,
    pub url: Option<String>,
}

pub fn validate_update_contact(payload: &UpdateContactRequest) -> Result<(), AppError> {
    if let Some(name) = &payload.name {
        validate_required("Name", name, 100)?;
    }
    validate_optional("Description", payload.description.as_deref(), 2000)?;
    validate_optional("URL", payload.url.as_deref(), 2048)
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContactResponse {
    pub id: i32,
    pub name: String,
    /// Stored value; unknown legacy values are passed through.
    #[serde(rename = "type")]
    #[schema(example = "chat")]
    pub kind: String,
    /// Public URL of the QR code image.
    pub qr_code: String,
    pub description: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl From<contact::Model> for ContactResponse {
    fn from(m: contact::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            kind: m.kind,
            qr_code: m.qr_code,
            description: m.description,
            url: m.url,
            created_at: m.created_at,
        }
    }
}
