use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::shared::{double_option, normalize_optional, validate_optional};
use crate::assets::tables::GalleryDraft;
use crate::entity::{gallery_image, intro_slide, video, website_image};
use crate::error::AppError;

// ---- Gallery ----

/// Optional JSON `data` part of a gallery upload.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct GalleryFields {
    pub title: Option<String>,
    pub description: Option<String>,
}

pub fn validate_gallery_fields(fields: &GalleryFields) -> Result<(), AppError> {
    validate_optional("Title", fields.title.as_deref(), 200)?;
    validate_optional("Description", fields.description.as_deref(), 2000)
}

impl From<GalleryFields> for GalleryDraft {
    fn from(f: GalleryFields) -> Self {
        Self {
            title: normalize_optional(f.title),
            description: normalize_optional(f.description),
        }
    }
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateGalleryRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

pub fn validate_update_gallery(payload: &UpdateGalleryRequest) -> Result<(), AppError> {
    validate_optional("Title", payload.title.clone().flatten().as_deref(), 200)?;
    validate_optional(
        "Description",
        payload.description.clone().flatten().as_deref(),
        2000,
    )
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GalleryImageResponse {
    pub id: i32,
    pub image_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<gallery_image::Model> for GalleryImageResponse {
    fn from(m: gallery_image::Model) -> Self {
        Self {
            id: m.id,
            image_url: m.image_url,
            title: m.title,
            description: m.description,
            created_at: m.created_at,
        }
    }
}

// ---- Videos ----

const YOUTUBE_HOSTS: [&str; 4] = ["youtube.com", "www.youtube.com", "m.youtube.com", "youtu.be"];

/// Accept only http(s) links to YouTube.
pub fn validate_youtube_url(raw: &str) -> Result<(), AppError> {
    let invalid = || AppError::Validation("YouTube URL is invalid".into());
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    match url.host_str() {
        Some(host) if YOUTUBE_HOSTS.contains(&host.to_ascii_lowercase().as_str()) => Ok(()),
        _ => Err(invalid()),
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateVideoRequest {
    #[schema(example = "https://www.youtube.com/watch?v=dQw4w9WgXcQ")]
    pub youtube_url: String,
    pub description: Option<String>,
    pub author: Option<String>,
}

pub fn validate_create_video(payload: &CreateVideoRequest) -> Result<(), AppError> {
    validate_youtube_url(&payload.youtube_url)?;
    validate_optional("Description", payload.description.as_deref(), 2000)?;
    validate_optional("Author", payload.author.as_deref(), 100)
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateVideoRequest {
    pub youtube_url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub author: Option<Option<String>>,
}

pub fn validate_update_video(payload: &UpdateVideoRequest) -> Result<(), AppError> {
    if let Some(url) = &payload.youtube_url {
        validate_youtube_url(url)?;
    }
    validate_optional(
        "Description",
        payload.description.clone().flatten().as_deref(),
        2000,
    )?;
    validate_optional("Author", payload.author.clone().flatten().as_deref(), 100)
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VideoResponse {
    pub id: i32,
    pub youtube_url: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<video::Model> for VideoResponse {
    fn from(m: video::Model) -> Self {
        Self {
            id: m.id,
            youtube_url: m.youtube_url,
            description: m.description,
            author: m.author,
            created_at: m.created_at,
        }
    }
}

// ---- Intro slides ----

#[derive(Serialize, utoipa::ToSchema)]
pub struct SlideResponse {
    pub id: i32,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<intro_slide::Model> for SlideResponse {
    fn from(m: intro_slide::Model) -> Self {
        Self {
            id: m.id,
            image_url: m.image_url,
            created_at: m.created_at,
        }
    }
}

/// Result of a full slide-set save.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SaveSlidesResponse {
    pub slides: Vec<SlideResponse>,
    pub created: usize,
    pub deleted: usize,
    /// Blobs of deleted slides that could not be removed.
    pub cleanup_failures: usize,
}

// ---- Website images ----

/// Singleton image slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ImageType {
    Logo,
    FooterLogo,
}

impl ImageType {
    /// Value stored in the `image_type` column.
    pub fn column_value(&self) -> &'static str {
        match self {
            ImageType::Logo => "logo",
            ImageType::FooterLogo => "footer_logo",
        }
    }

    fn wire_name(&self) -> &'static str {
        match self {
            ImageType::Logo => "logo",
            ImageType::FooterLogo => "footerLogo",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for ImageType {
    type Err = AppError;

    /// Accepts both the JSON name and the column value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "logo" => Ok(ImageType::Logo),
            "footerLogo" | "footer_logo" => Ok(ImageType::FooterLogo),
            other => Err(AppError::Validation(format!("Unknown image type: {other}"))),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct WebsiteImageResponse {
    /// `logo` or `footerLogo`. Unknown stored slots are passed through.
    pub image_type: String,
    pub image_url: String,
    pub updated_at: DateTime<Utc>,
}

impl From<website_image::Model> for WebsiteImageResponse {
    fn from(m: website_image::Model) -> Self {
        let image_type = m
            .image_type
            .parse::<ImageType>()
            .map(|t| t.to_string())
            .unwrap_or(m.image_type);
        Self {
            image_type,
            image_url: m.image_url,
            updated_at: m.updated_at,
        }
    }
}
