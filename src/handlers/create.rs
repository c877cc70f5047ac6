use crate::content_type::{self, APPLICATION_JSON, FORM_URLENCODED};
use crate::error::{ApiError, ErrorResponse};
use crate::handlers::base_url;
use crate::models::{Pet, PetForm, PetPayload, ValidationError};
use crate::routes;
use crate::state::AppState;
use axum::{
    Form, Json,
    extract::{FromRequest, Request, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CONTENT_TYPE, LOCATION},
    },
};
use serde_json::Value as JsonValue;

/// POST /pets handler - Create a pet
///
/// Accepts a JSON body or an HTML form post. The id is assigned by the store
/// and any id in the body is ignored.
#[utoipa::path(
    post,
    path = routes::PETS,
    request_body = PetPayload,
    responses(
        (status = 201, description = "Pet created", body = Pet,
            headers(("Location" = String, description = "URL of the new pet"))),
        (status = 400, description = "Invalid pet", body = ErrorResponse),
        (status = 415, description = "Missing or unsupported Content-Type", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "pets"
)]
pub async fn create_handler(
    State(state): State<AppState>,
    mut request: Request,
) -> Result<(StatusCode, HeaderMap, Json<Pet>), ApiError> {
    tracing::info!("Request to create a Pet");

    let accepted = content_type::require(request.headers(), &[APPLICATION_JSON, FORM_URLENCODED])?;
    let base = base_url(request.headers(), &state.config);
    // The extractors below match Content-Type case-sensitively
    request
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(accepted));

    let payload = if accepted == FORM_URLENCODED {
        tracing::info!("Processing FORM data");
        let Form(form) = Form::<PetForm>::from_request(request, &())
            .await
            .map_err(|_| ValidationError::BadBody)?;
        PetPayload::from(form)
    } else {
        tracing::info!("Processing JSON data");
        let Json(value) = Json::<JsonValue>::from_request(request, &())
            .await
            .map_err(|_| ValidationError::BadBody)?;
        PetPayload::from_json(value)?
    };

    let mut pet = Pet::from_payload(0, payload)?;
    state.pets.save(&mut pet).await?;

    let location = format!("{}{}/{}", base, routes::PETS, pet.id);
    let mut headers = HeaderMap::new();
    headers.insert(
        LOCATION,
        HeaderValue::from_str(&location).map_err(|e| ApiError::Internal(e.into()))?,
    );

    tracing::info!("Pet with id {} created", pet.id);
    Ok((StatusCode::CREATED, headers, Json(pet)))
}
