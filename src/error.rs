use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::any::Any;

use crate::models::ValidationError;

/// Error envelope returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
    pub message: String,
}

/// Response type for health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Response type for unhealthy status
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct UnhealthyResponse {
    pub status: String,
    pub error: String,
}

/// Custom error type for API endpoints
///
/// Each variant maps to one HTTP status and renders as an [`ErrorResponse`].
/// Client errors are logged at warn level, server errors at error level.
#[derive(Debug)]
pub enum ApiError {
    /// Pet body failed validation
    Validation(ValidationError),
    /// Request was understood but cannot be honored
    BadRequest(String),
    NotFound(String),
    MethodNotAllowed(String),
    /// Content-Type header missing or not accepted
    UnsupportedMediaType(String),
    /// Store failure or anything else unexpected
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn pet_not_found(id: impl std::fmt::Display) -> Self {
        ApiError::NotFound(format!("Pet with id '{}' was not found.", id))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => "Bad Request",
            ApiError::NotFound(_) => "Not Found",
            ApiError::MethodNotAllowed(_) => "Method not Allowed",
            ApiError::UnsupportedMediaType(_) => "Unsupported media type",
            ApiError::Internal(_) => "Internal Server Error",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Validation(err) => err.to_string(),
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::MethodNotAllowed(msg)
            | ApiError::UnsupportedMediaType(msg) => msg.clone(),
            ApiError::Internal(_) => "Internal Server Error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        // Store internals stay in the log, never in the body
        match &self {
            ApiError::Internal(err) => tracing::error!("{:#}", err),
            _ => tracing::warn!("{}", message),
        }

        let body = Json(ErrorResponse {
            status: status.as_u16(),
            error: self.label().to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ValidationError>() {
            Ok(validation) => ApiError::Validation(validation),
            Err(err) => ApiError::Internal(err),
        }
    }
}

/// Turn a panicking handler into the 500 envelope
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "unknown panic".to_string()
    };

    ApiError::Internal(anyhow::anyhow!("Handler panicked: {}", detail)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn envelope_response(response: Response) -> (StatusCode, ErrorResponse) {
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn envelope(error: ApiError) -> (StatusCode, ErrorResponse) {
        envelope_response(error.into_response()).await
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let (status, body) = envelope(ApiError::pet_not_found(7)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.status, 404);
        assert_eq!(body.error, "Not Found");
        assert_eq!(body.message, "Pet with id '7' was not found.");
    }

    #[tokio::test]
    async fn test_validation_envelope() {
        let error = ApiError::from(ValidationError::MissingFields(vec!["name"]));
        let (status, body) = envelope(error).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Bad Request");
        assert_eq!(body.message, "Invalid pet: missing name");
    }

    #[tokio::test]
    async fn test_anyhow_keeps_validation_errors() {
        let wrapped = anyhow::Error::from(ValidationError::EmptyField("name"));
        assert!(matches!(
            ApiError::from(wrapped),
            ApiError::Validation(ValidationError::EmptyField("name"))
        ));

        let store_failure = anyhow::anyhow!("connection reset");
        let (status, body) = envelope(ApiError::from(store_failure)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal Server Error");
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let cause = anyhow::anyhow!("status: Unavailable, grpc transport error")
            .context("Failed to query record from Spanner");
        let (_, body) = envelope(ApiError::Internal(cause)).await;

        assert_eq!(body.status, 500);
        assert_eq!(body.message, "Internal Server Error");
        assert!(!body.message.contains("Spanner"));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            (ApiError::BadRequest("x".into()), 400, "Bad Request"),
            (ApiError::MethodNotAllowed("x".into()), 405, "Method not Allowed"),
            (ApiError::UnsupportedMediaType("x".into()), 415, "Unsupported media type"),
        ];

        for (error, code, label) in cases {
            let (status, body) = envelope(error).await;
            assert_eq!(status.as_u16(), code);
            assert_eq!(body.status, code);
            assert_eq!(body.error, label);
        }
    }

    #[tokio::test]
    async fn test_panic_maps_to_internal_error() {
        let (status, body) = envelope_response(handle_panic(Box::new("boom"))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Internal Server Error");
    }
}
