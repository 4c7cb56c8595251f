use std::collections::HashMap;

use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Request};
use common::storage::ImageUpload;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Body limit for multipart routes. A slide save may carry several files,
/// so this is a multiple of the per-file limit which is checked separately.
pub fn upload_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    let per_file = usize::try_from(max_upload_size).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(per_file.saturating_mul(8).saturating_add(1024 * 1024))
}

/// A parsed `multipart/form-data` body.
///
/// Parts with a file name become [`ImageUpload`]s in arrival order. All
/// other parts are kept as text, grouped by name.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<ImageUpload>,
    fields: HashMap<String, Vec<String>>,
}

impl UploadForm {
    /// The single file of a one-image form.
    pub fn require_file(&mut self) -> Result<ImageUpload, AppError> {
        match self.files.len() {
            0 => Err(AppError::Validation("Missing 'file' field".into())),
            1 => Ok(self.files.remove(0)),
            n => Err(AppError::Validation(format!(
                "Expected one file, got {n}"
            ))),
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn require_text(&self, name: &str) -> Result<&str, AppError> {
        self.text(name)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::Validation(format!("Missing '{name}' field")))
    }

    /// Every value of a repeated text field.
    pub fn all(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Deserialize a JSON-encoded text field.
    pub fn json<T: DeserializeOwned>(&self, name: &str) -> Result<T, AppError> {
        let raw = self.require_text(name)?;
        serde_json::from_str(raw)
            .map_err(|e| AppError::Validation(format!("Invalid '{name}' field: {e}")))
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_default().push(value.into());
    }
}

impl<S> FromRequest<S> for UploadForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        let mut form = UploadForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_owned) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_owned);
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))?;
                    form.files
                        .push(ImageUpload::new(file_name, content_type, data.to_vec()));
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))?;
                    form.push_text(name, text);
                }
            }
        }
        Ok(form)
    }
}
