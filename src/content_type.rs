use axum::http::{HeaderMap, header::CONTENT_TYPE};

use crate::error::ApiError;

pub const APPLICATION_JSON: &str = "application/json";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Check the request's Content-Type against `accepted` and return the entry
/// that matched. Media type parameters such as `charset` are ignored.
pub fn require<'a>(headers: &HeaderMap, accepted: &[&'a str]) -> Result<&'a str, ApiError> {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return Err(ApiError::UnsupportedMediaType(
            "Content-Type must be set".to_string(),
        ));
    };

    let raw = value.to_str().unwrap_or_default();
    let essence = raw.split(';').next().unwrap_or_default().trim();

    accepted
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(essence))
        .ok_or_else(|| {
            tracing::debug!("Invalid Content-Type: {}", raw);
            ApiError::UnsupportedMediaType(format!(
                "Content-Type must be {}",
                accepted.join(" or ")
            ))
        })
}
