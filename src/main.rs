mod api_doc;
mod config;
mod content_type;
mod error;
mod handlers;
mod models;
mod pets;
mod routes;
mod state;
mod store;

use anyhow::Context;
use config::Config;
use pets::PetRepository;
use state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!("pet-store-kv starting");
    config.log_startup();

    let store = store::connect(&config.store).await?;

    let addr = format!("{}:{}", config.service_host, config.service_port);
    let state = AppState {
        pets: PetRepository::new(store),
        config: Arc::new(config),
    };

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, routes::app(state))
        .await
        .context("Server error")?;

    Ok(())
}
