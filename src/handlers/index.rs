use crate::handlers::base_url;
use crate::models::IndexResponse;
use crate::routes;
use crate::state::AppState;
use axum::{Json, extract::State, http::HeaderMap, http::StatusCode};

/// GET / handler - Service metadata
#[utoipa::path(
    get,
    path = routes::INDEX,
    responses(
        (status = 200, description = "Service name, version and pets URL", body = IndexResponse)
    ),
    tag = "service"
)]
pub async fn index_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<IndexResponse>) {
    tracing::info!("Request for home page");

    (
        StatusCode::OK,
        Json(IndexResponse {
            name: "Pet Demo REST API Service".to_string(),
            version: "1.0".to_string(),
            url: format!("{}{}", base_url(&headers, &state.config), routes::PETS),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{expect_status, send, setup_test_app};
    use axum::body::Body;

    #[tokio::test]
    async fn test_index() {
        let (app, _) = setup_test_app();

        let response = send(&app, "GET", "/", None, Body::empty()).await;
        let index: IndexResponse = expect_status(response, StatusCode::OK).await;

        assert_eq!(index.name, "Pet Demo REST API Service");
        assert_eq!(index.version, "1.0");
        assert_eq!(index.url, "http://localhost:5000/pets");
    }
}
