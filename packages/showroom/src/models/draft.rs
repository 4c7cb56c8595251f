use serde::{Deserialize, Serialize};

/// A staged upload that no record references yet.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DraftResponse {
    /// Public URL of the staged blob.
    pub url: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AbandonDraftRequest {
    /// URL returned when the draft was staged.
    pub uploaded_url: String,
    /// URL currently stored on the record, if any.
    pub committed_url: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CommitImageRequest {
    /// A URL previously returned by the draft endpoint for the same bucket.
    pub url: String,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct SweepQuery {
    /// Report candidates without deleting them.
    #[serde(default)]
    pub dry_run: bool,
}
