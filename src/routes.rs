use axum::{
    Router,
    routing::{get, put},
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::error::handle_panic;
use crate::handlers;
use crate::state::AppState;

// Route path constants - single source of truth for all API paths
pub const INDEX: &str = "/";
pub const HEALTH: &str = "/health";
pub const PETS: &str = "/pets";
pub const PET_ITEM: &str = "/pets/{id}";
pub const PET_PURCHASE: &str = "/pets/{id}/purchase";

pub const SWAGGER_UI: &str = "/swagger-ui";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

/// Assemble the full service: API routes, docs, error fallbacks and layers
pub fn app(state: AppState) -> Router {
    Router::new()
        .route(INDEX, get(handlers::index_handler))
        .route(HEALTH, get(handlers::health_handler))
        .route(
            PETS,
            get(handlers::list_handler).post(handlers::create_handler),
        )
        .route(
            PET_ITEM,
            get(handlers::get_handler)
                .put(handlers::update_handler)
                .delete(handlers::delete_handler),
        )
        .route(PET_PURCHASE, put(handlers::purchase_handler))
        .merge(SwaggerUi::new(SWAGGER_UI).url(OPENAPI_JSON, ApiDoc::openapi()))
        .fallback(handlers::not_found_handler)
        .method_not_allowed_fallback(handlers::method_not_allowed_handler)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
}
