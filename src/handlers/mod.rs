pub mod create;
pub mod delete;
pub mod fallback;
pub mod get;
pub mod health;
pub mod index;
pub mod list;
pub mod purchase;
pub mod update;

pub use create::create_handler;
pub use delete::delete_handler;
pub use fallback::{method_not_allowed_handler, not_found_handler};
pub use get::get_handler;
pub use health::health_handler;
pub use index::index_handler;
pub use list::list_handler;
pub use purchase::purchase_handler;
pub use update::update_handler;

use axum::http::{HeaderMap, header::HOST};

use crate::config::Config;
use crate::error::ApiError;

/// Parse the `{id}` path segment. A non-numeric id names no resource.
pub(crate) fn parse_pet_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse::<u64>().map_err(|_| ApiError::pet_not_found(raw))
}

/// Absolute base URL of this service as seen by the caller
pub(crate) fn base_url(headers: &HeaderMap, config: &Config) -> String {
    match headers.get(HOST).and_then(|host| host.to_str().ok()) {
        Some(host) => format!("http://{}", host),
        None => format!("http://{}:{}", config.service_host, config.service_port),
    }
}
