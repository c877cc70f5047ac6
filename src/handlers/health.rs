use crate::error::{HealthResponse, UnhealthyResponse};
use crate::routes;
use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Liveness probe for load balancers: 503 as soon as the store stops answering
#[utoipa::path(
    get,
    path = routes::HEALTH,
    responses(
        (status = 200, description = "Store reachable", body = HealthResponse),
        (status = 503, description = "Store unreachable", body = UnhealthyResponse)
    ),
    tag = "health"
)]
pub async fn health_handler(State(state): State<AppState>) -> Response {
    if let Err(e) = state.pets.ping().await {
        tracing::error!("Store did not answer ping: {:#}", e);
        let body = UnhealthyResponse {
            status: "unhealthy".to_string(),
            error: format!("Cannot connect to store: {}", e),
        };
        return (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
    }

    let body = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(body)).into_response()
}
