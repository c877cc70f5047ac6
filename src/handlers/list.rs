use crate::error::{ApiError, ErrorResponse};
use crate::models::{Pet, PetQuery};
use crate::routes;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
};

/// GET /pets handler - List pets
///
/// At most one filter applies. They are checked in the order category, name,
/// available; the first one present wins. Without any filter every pet is
/// returned. String matches ignore case. A repeated parameter uses its first value.
#[utoipa::path(
    get,
    path = routes::PETS,
    params(PetQuery),
    responses(
        (status = 200, description = "Matching pets", body = [Pet]),
        (status = 400, description = "Invalid query parameter", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "pets"
)]
pub async fn list_handler(
    State(state): State<AppState>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<(StatusCode, Json<Vec<Pet>>), ApiError> {
    tracing::info!("Request for List Pets");

    let Query(pairs) = pairs.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let query = PetQuery::from_pairs(pairs);

    let present = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

    let pets = if let Some(category) = present(&query.category) {
        state.pets.find_by_category(&category).await?
    } else if let Some(name) = present(&query.name) {
        state.pets.find_by_name(&name).await?
    } else if let Some(available) = present(&query.available) {
        state.pets.find_by_availability(parse_flag(&available)?).await?
    } else {
        state.pets.all().await?
    };

    tracing::info!("Returning {} pets", pets.len());
    Ok((StatusCode::OK, Json(pets)))
}

fn parse_flag(value: &str) -> Result<bool, ApiError> {
    match value.to_lowercase().as_str() {
        "true" | "t" | "1" | "yes" => Ok(true),
        "false" | "f" | "0" | "no" => Ok(false),
        _ => Err(ApiError::BadRequest(format!(
            "Invalid query parameter: available must be true or false, got '{}'",
            value
        ))),
    }
}
