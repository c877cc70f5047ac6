use crate::error::{ApiError, ErrorResponse};
use crate::handlers::parse_pet_id;
use crate::routes;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};

/// DELETE /pets/{id} handler - Remove a pet
///
/// Always 204, whether or not the pet existed.
#[utoipa::path(
    delete,
    path = routes::PET_ITEM,
    params(
        ("id" = u64, Path, description = "Pet id")
    ),
    responses(
        (status = 204, description = "Pet deleted or already absent"),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "pets"
)]
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, ApiError> {
    tracing::info!("Request to delete Pet with id {}", id_str);
    let id = parse_pet_id(&id_str)?;

    if state.pets.find(id).await?.is_some() {
        state.pets.delete(id).await?;
    }

    Ok(StatusCode::NO_CONTENT)
}
