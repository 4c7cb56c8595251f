use std::collections::HashSet;

use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Validate a required trimmed text field of 1..=`max` characters.
pub fn validate_required(label: &str, value: &str, max: usize) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{label} must be 1-{max} characters"
        )));
    }
    Ok(())
}

/// Validate an optional text field of at most `max` characters.
pub fn validate_optional(label: &str, value: Option<&str>, max: usize) -> Result<(), AppError> {
    if let Some(value) = value
        && value.chars().count() > max
    {
        return Err(AppError::Validation(format!(
            "{label} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Trim and turn blank strings into `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate a price-like amount: finite and non-negative.
pub fn validate_amount(label: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Validation(format!(
            "{label} must be a non-negative number"
        )));
    }
    Ok(())
}

/// Parse a list of ids sent as repeated form fields, rejecting duplicates.
pub fn parse_id_list(values: &[String], name: &str) -> Result<Vec<i32>, AppError> {
    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(values.len());
    for raw in values {
        let id: i32 = raw
            .trim()
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid {name} id: {raw}")))?;
        if !seen.insert(id) {
            return Err(AppError::Validation(format!("Duplicate {name} id: {id}")));
        }
        ids.push(id);
    }
    Ok(ids)
}
