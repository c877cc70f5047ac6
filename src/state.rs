use crate::config::Config;
use crate::pets::PetRepository;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pets: PetRepository,
    pub config: Arc<Config>,
}
