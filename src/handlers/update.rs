use crate::content_type::{self, APPLICATION_JSON};
use crate::error::{ApiError, ErrorResponse};
use crate::handlers::parse_pet_id;
use crate::models::{Pet, PetPayload, ValidationError};
use crate::routes;
use crate::state::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode},
};

/// PUT /pets/{id} handler - Replace a pet's name, category and availability
///
/// The id always comes from the path.
#[utoipa::path(
    put,
    path = routes::PET_ITEM,
    params(
        ("id" = u64, Path, description = "Pet id")
    ),
    request_body = PetPayload,
    responses(
        (status = 200, description = "Pet updated", body = Pet),
        (status = 400, description = "Invalid pet", body = ErrorResponse),
        (status = 404, description = "Pet not found", body = ErrorResponse),
        (status = 415, description = "Content-Type is not application/json", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "pets"
)]
pub async fn update_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Pet>), ApiError> {
    tracing::info!("Request to update Pet with id {}", id_str);
    let id = parse_pet_id(&id_str)?;
    content_type::require(&headers, &[APPLICATION_JSON])?;

    if state.pets.find(id).await?.is_none() {
        return Err(ApiError::pet_not_found(id));
    }

    let body = body.map_err(|e| {
        tracing::debug!("Could not read request body: {}", e);
        ValidationError::BadBody
    })?;
    let payload = PetPayload::from_json_slice(&body)?;
    let mut pet = Pet::from_payload(id, payload)?;
    state.pets.save(&mut pet).await?;

    Ok((StatusCode::OK, Json(pet)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{expect_status, send, send_json, setup_seeded_app};
    use axum::body::Body;
    use serde_json::json;

    #[tokio::test]
    async fn test_update_pet() {
        let (app, _) = setup_seeded_app().await;

        let response = send_json(
            &app,
            "PUT",
            "/pets/2",
            &json!({"id": 99, "name": "kitty", "category": "tabby", "available": true}),
        )
        .await;
        let updated: Pet = expect_status(response, StatusCode::OK).await;

        assert_eq!(updated.id, 2);
        assert_eq!(updated.category, "tabby");

        let response = send(&app, "GET", "/pets/2", None, Body::empty()).await;
        let fetched: Pet = expect_status(response, StatusCode::OK).await;
        assert_eq!(fetched, updated);

        let response = send(&app, "GET", "/pets/99", None, Body::empty()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_pet_with_no_name() {
        let (app, pets) = setup_seeded_app().await;

        let response =
            send_json(&app, "PUT", "/pets/2", &json!({"category": "tabby"})).await;
        let error: ErrorResponse = expect_status(response, StatusCode::BAD_REQUEST).await;

        assert!(error.message.contains("missing name"));
        assert_eq!(pets.find(2).await.unwrap().unwrap().category, "cat");
    }

    #[tokio::test]
    async fn test_update_pet_not_found() {
        let (app, _) = setup_seeded_app().await;

        let response = send_json(
            &app,
            "PUT",
            "/pets/0",
            &json!({"name": "timothy", "category": "mouse"}),
        )
        .await;
        let error: ErrorResponse = expect_status(response, StatusCode::NOT_FOUND).await;

        assert!(error.message.contains("was not found"));
    }

    #[tokio::test]
    async fn test_update_oversized_body_is_bad_request() {
        let (app, pets) = setup_seeded_app().await;
        let padding = "x".repeat(3 * 1024 * 1024);
        let body = json!({"name": "fido", "category": padding});

        let response = send_json(&app, "PUT", "/pets/1", &body).await;
        let error: ErrorResponse = expect_status(response, StatusCode::BAD_REQUEST).await;

        assert_eq!(error.error, "Bad Request");
        assert!(error.message.contains("bad or no data"));
        assert_eq!(pets.find(1).await.unwrap().unwrap().category, "dog");
    }

    #[tokio::test]
    async fn test_update_requires_json() {
        let (app, _) = setup_seeded_app().await;

        let response = send(
            &app,
            "PUT",
            "/pets/1",
            Some("application/x-www-form-urlencoded"),
            "name=fido&category=dog",
        )
        .await;
        let error: ErrorResponse =
            expect_status(response, StatusCode::UNSUPPORTED_MEDIA_TYPE).await;

        assert_eq!(error.message, "Content-Type must be application/json");
    }
}
