use crate::error::{ApiError, ErrorResponse};
use crate::handlers::parse_pet_id;
use crate::models::Pet;
use crate::routes;
use crate::state::AppState;
use axum::{Json, extract::Path, extract::State, http::StatusCode};

/// GET /pets/{id} handler - Retrieve a single pet
#[utoipa::path(
    get,
    path = routes::PET_ITEM,
    params(
        ("id" = u64, Path, description = "Pet id")
    ),
    responses(
        (status = 200, description = "Pet found", body = Pet),
        (status = 404, description = "Pet not found", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "pets"
)]
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<(StatusCode, Json<Pet>), ApiError> {
    tracing::info!("Request to get Pet with id {}", id_str);
    let id = parse_pet_id(&id_str)?;

    match state.pets.find(id).await? {
        Some(pet) => Ok((StatusCode::OK, Json(pet))),
        None => Err(ApiError::pet_not_found(id)),
    }
}
