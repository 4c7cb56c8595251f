use thiserror::Error;

/// Validation failures for an incoming image file. Raised before any
/// storage call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("File name is missing or invalid")]
    InvalidFileName,
    #[error("File is empty")]
    Empty,
    #[error("Only image files are accepted (got {0})")]
    NotAnImage(String),
    #[error("File exceeds maximum size of {limit} bytes ({actual} bytes)")]
    TooLarge { actual: u64, limit: u64 },
}

/// An image file received from a form, not yet stored.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ImageUpload {
    /// Build an upload, guessing the content type from the file name when the
    /// client did not send one.
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, data: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type
            .filter(|ct| !ct.trim().is_empty() && ct != "application/octet-stream")
            .unwrap_or_else(|| {
                mime_guess::from_path(&file_name)
                    .first_or_octet_stream()
                    .to_string()
            });
        Self {
            file_name,
            content_type,
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Check name, type and size. Applies to every bucket alike.
    pub fn validate(&self, max_size: u64) -> Result<(), UploadError> {
        validate_file_name(&self.file_name)?;

        if !self
            .content_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
        {
            return Err(UploadError::NotAnImage(self.content_type.clone()));
        }

        if self.data.is_empty() {
            return Err(UploadError::Empty);
        }

        if self.size() > max_size {
            return Err(UploadError::TooLarge {
                actual: self.size(),
                limit: max_size,
            });
        }

        Ok(())
    }
}

fn validate_file_name(name: &str) -> Result<(), UploadError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed.starts_with('.')
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.chars().any(|c| c.is_control())
    {
        return Err(UploadError::InvalidFileName);
    }
    Ok(())
}
