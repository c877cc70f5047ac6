use utoipa::OpenApi;

use crate::error::{ErrorResponse, HealthResponse, UnhealthyResponse};
use crate::handlers;
use crate::models::{IndexResponse, Pet, PetPayload};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pet Demo REST API",
        version = "1.0.0",
        description = "CRUD and purchase operations over pets, backed by a key-value store"
    ),
    paths(
        handlers::index::index_handler,
        handlers::health::health_handler,
        handlers::list::list_handler,
        handlers::get::get_handler,
        handlers::create::create_handler,
        handlers::update::update_handler,
        handlers::delete::delete_handler,
        handlers::purchase::purchase_handler
    ),
    components(
        schemas(
            Pet,
            PetPayload,
            IndexResponse,
            ErrorResponse,
            HealthResponse,
            UnhealthyResponse
        )
    ),
    tags(
        (name = "service", description = "Service metadata"),
        (name = "health", description = "Health check operations"),
        (name = "pets", description = "Pet operations")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for path in ["/", "/health", "/pets", "/pets/{id}", "/pets/{id}/purchase"] {
            assert!(
                paths.iter().any(|p| p.as_str() == path),
                "missing {} in {:?}",
                path,
                paths
            );
        }
    }
}
