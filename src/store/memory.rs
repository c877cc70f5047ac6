use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{COUNTER_KEY, KvStore};

/// Process-local store, used for tests and single-instance local runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn next_id(&self) -> Result<u64> {
        // The write lock is held across read and write so concurrent callers serialize
        let mut records = self.records.write().await;
        let current = match records.get(COUNTER_KEY) {
            Some(value) => value
                .parse::<u64>()
                .with_context(|| format!("Counter key holds a non-numeric value: {}", value))?,
            None => 0,
        };
        let next = current + 1;
        records.insert(COUNTER_KEY.to_string(), next.to_string());

        tracing::debug!("Counter advanced to {}", next);
        Ok(next)
    }

    async fn get(&self, id: u64) -> Result<Option<String>> {
        Ok(self.records.read().await.get(&id.to_string()).cloned())
    }

    async fn set(&self, id: u64, record: String) -> Result<()> {
        self.records.write().await.insert(id.to_string(), record);
        Ok(())
    }

    async fn delete(&self, id: u64) -> Result<()> {
        self.records.write().await.remove(&id.to_string());
        Ok(())
    }

    async fn exists(&self, id: u64) -> Result<bool> {
        Ok(self.records.read().await.contains_key(&id.to_string()))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.records.read().await.keys().cloned().collect())
    }

    async fn flush_all(&self) -> Result<()> {
        self.records.write().await.clear();
        Ok(())
    }
}
