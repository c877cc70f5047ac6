use crate::error::{ApiError, ErrorResponse};
use crate::handlers::parse_pet_id;
use crate::models::Pet;
use crate::routes;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// PUT /pets/{id}/purchase handler - Buy an available pet
#[utoipa::path(
    put,
    path = routes::PET_PURCHASE,
    params(
        ("id" = u64, Path, description = "Pet id")
    ),
    responses(
        (status = 200, description = "Pet purchased", body = Pet),
        (status = 400, description = "Pet is not available", body = ErrorResponse),
        (status = 404, description = "Pet not found", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "pets"
)]
pub async fn purchase_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<(StatusCode, Json<Pet>), ApiError> {
    tracing::info!("Request to purchase Pet with id {}", id_str);
    let id = parse_pet_id(&id_str)?;

    let Some(mut pet) = state.pets.find(id).await? else {
        return Err(ApiError::pet_not_found(id));
    };
    if !pet.available {
        return Err(ApiError::BadRequest(format!(
            "Pet with id '{}' is not available.",
            id
        )));
    }

    pet.available = false;
    state.pets.save(&mut pet).await?;

    Ok((StatusCode::OK, Json(pet)))
}
