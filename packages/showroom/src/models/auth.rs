use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for the admin login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Shared admin password.
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.password.is_empty() || payload.password.len() > 256 {
        return Err(AppError::Validation(
            "Password must be 1-256 characters".into(),
        ));
    }
    Ok(())
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// Bearer token for admin endpoints. Valid for 7 days.
    pub token: String,
}
