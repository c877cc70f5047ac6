//! Store Adapter: the key-value persistence seam.
//!
//! Records are JSON text keyed by the decimal form of a pet id. A single
//! reserved key, [`COUNTER_KEY`], holds the id sequence and shows up in
//! [`KvStore::keys`]; every caller that scans keys must skip it.

pub mod memory;
pub mod spanner;

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::StoreConfig;

pub use memory::MemoryStore;
pub use spanner::SpannerStore;

/// Key holding the last id handed out by [`KvStore::next_id`]
pub const COUNTER_KEY: &str = "index";

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Verify the backend is reachable
    async fn ping(&self) -> Result<()>;

    /// Atomically increment the counter and return the new value.
    /// Values are strictly increasing and never handed out twice.
    async fn next_id(&self) -> Result<u64>;

    async fn get(&self, id: u64) -> Result<Option<String>>;

    async fn set(&self, id: u64, record: String) -> Result<()>;

    /// Remove a record; removing an absent id is not an error
    async fn delete(&self, id: u64) -> Result<()>;

    async fn exists(&self, id: u64) -> Result<bool>;

    /// Every key in the store, the counter key included
    async fn keys(&self) -> Result<Vec<String>>;

    /// Drop every record and reset the counter
    async fn flush_all(&self) -> Result<()>;
}

/// Build the configured backend and check it answers.
///
/// Failure here is fatal: the service must not start serving without a store.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn KvStore>> {
    let store: Arc<dyn KvStore> = match config {
        StoreConfig::Memory => {
            tracing::info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
        StoreConfig::Spanner(settings) => Arc::new(SpannerStore::connect(settings).await?),
    };

    store
        .ping()
        .await
        .context("Could not connect to the store service")?;
    tracing::info!("Store connection established");

    Ok(store)
}
