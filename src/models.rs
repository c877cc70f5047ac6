use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// A pet as stored and as returned by the API.
///
/// `id` is zero until the pet is first saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Pet {
    pub id: u64,
    pub name: String,
    pub category: String,
    pub available: bool,
}

impl Pet {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            category: category.into(),
            available: true,
        }
    }

    /// Build a pet from a request payload, keeping `id` as given
    pub fn from_payload(id: u64, payload: PetPayload) -> Result<Self, ValidationError> {
        let missing: Vec<&'static str> = [
            ("name", payload.name.is_none()),
            ("category", payload.category.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();

        match (payload.name, payload.category) {
            (Some(name), Some(category)) => {
                let pet = Pet {
                    id,
                    name,
                    category,
                    available: payload.available.unwrap_or(true),
                };
                pet.validate()?;
                Ok(pet)
            }
            _ => Err(ValidationError::MissingFields(missing)),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        Ok(())
    }
}

/// Body accepted by create and update. Any `id` sent along is ignored.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct PetPayload {
    pub name: Option<String>,
    pub category: Option<String>,
    pub available: Option<bool>,
}

impl PetPayload {
    /// Decode a JSON body. Anything other than an object is a bad body.
    pub fn from_json(value: JsonValue) -> Result<Self, ValidationError> {
        if !value.is_object() {
            return Err(ValidationError::BadBody);
        }
        serde_json::from_value(value).map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    pub fn from_json_slice(body: &[u8]) -> Result<Self, ValidationError> {
        let value: JsonValue = serde_json::from_slice(body).map_err(|_| ValidationError::BadBody)?;
        Self::from_json(value)
    }
}

/// HTML form submission for create
#[derive(Debug, Deserialize)]
pub struct PetForm {
    pub name: Option<String>,
    pub category: Option<String>,
    pub available: Option<String>,
}

impl From<PetForm> for PetPayload {
    fn from(form: PetForm) -> Self {
        PetPayload {
            name: form.name,
            category: form.category,
            available: form
                .available
                .map(|value| matches!(value.to_lowercase().as_str(), "true" | "1" | "t")),
        }
    }
}

/// Query parameters for the list endpoint; the first one present wins
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PetQuery {
    pub category: Option<String>,
    pub name: Option<String>,
    pub available: Option<String>,
}

impl PetQuery {
    /// Collect the filters from raw query pairs. A repeated parameter keeps
    /// its first value and unknown parameters are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = PetQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "category" => &mut query.category,
                "name" => &mut query.name,
                "available" => &mut query.available,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

/// Response type for GET /
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct IndexResponse {
    pub name: String,
    pub version: String,
    pub url: String,
}

/// Why a pet body was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required fields absent from the body, in declaration order
    MissingFields(Vec<&'static str>),
    EmptyField(&'static str),
    /// A field was present with the wrong type
    Malformed(String),
    /// The body was not a JSON object or form at all
    BadBody,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingFields(fields) => {
                write!(f, "Invalid pet: missing {}", fields.join(", "))
            }
            ValidationError::EmptyField(field) => {
                write!(f, "Invalid pet: {} must not be empty", field)
            }
            ValidationError::Malformed(reason) => write!(f, "Invalid pet: {}", reason),
            ValidationError::BadBody => {
                write!(f, "Invalid pet: body of request contained bad or no data")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
