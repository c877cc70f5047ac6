use crate::error::ApiError;
use axum::http::{Method, Uri};

/// Any path no route matches
pub async fn not_found_handler(uri: Uri) -> ApiError {
    ApiError::NotFound(format!(
        "The requested URL {} was not found on the server.",
        uri.path()
    ))
}

/// A routed path hit with a verb it does not serve
pub async fn method_not_allowed_handler(method: Method, uri: Uri) -> ApiError {
    ApiError::MethodNotAllowed(format!(
        "The method {} is not allowed for the requested URL {}.",
        method,
        uri.path()
    ))
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorResponse;
    use crate::handlers::test_support::{expect_status, send, send_json, setup_test_app};
    use axum::{body::Body, http::StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_call_create_with_an_id() {
        let (app, _) = setup_test_app();

        let response = send_json(
            &app,
            "POST",
            "/pets/1",
            &json!({"name": "fido", "category": "dog"}),
        )
        .await;
        let error: ErrorResponse =
            expect_status(response, StatusCode::METHOD_NOT_ALLOWED).await;

        assert_eq!(error.status, 405);
        assert_eq!(error.error, "Method not Allowed");
        assert!(error.message.contains("POST"));
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let (app, _) = setup_test_app();

        let response = send(&app, "GET", "/owners", None, Body::empty()).await;
        let error: ErrorResponse = expect_status(response, StatusCode::NOT_FOUND).await;

        assert_eq!(error.error, "Not Found");
        assert!(error.message.contains("/owners"));
    }
}
