use anyhow::{Context, Result};
use std::sync::Arc;

use crate::models::Pet;
use crate::store::{COUNTER_KEY, KvStore};

/// Pet persistence and queries over an injected [`KvStore`].
///
/// Pets handed out are detached copies; changing one has no effect until it
/// is passed back to [`PetRepository::save`].
#[derive(Clone)]
pub struct PetRepository {
    store: Arc<dyn KvStore>,
}

impl PetRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }

    /// Persist `pet`, assigning a fresh id on its first save
    pub async fn save(&self, pet: &mut Pet) -> Result<()> {
        pet.validate()?;
        if pet.id == 0 {
            pet.id = self.store.next_id().await?;
        }

        let record = serde_json::to_string(pet).context("Failed to serialize pet")?;
        self.store.set(pet.id, record).await?;

        tracing::debug!("Saved pet {}", pet.id);
        Ok(())
    }

    /// Remove the pet with `id`; absent ids are ignored
    pub async fn delete(&self, id: u64) -> Result<()> {
        self.store.delete(id).await
    }

    pub async fn find(&self, id: u64) -> Result<Option<Pet>> {
        if !self.store.exists(id).await? {
            return Ok(None);
        }
        match self.store.get(id).await? {
            Some(record) => Ok(Some(decode(id, &record)?)),
            None => Ok(None),
        }
    }

    pub async fn all(&self) -> Result<Vec<Pet>> {
        self.find_by(|_| true).await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Vec<Pet>> {
        tracing::info!("Processing name query for {}", name);
        let name = name.to_lowercase();
        self.find_by(|pet| pet.name.to_lowercase() == name).await
    }

    pub async fn find_by_category(&self, category: &str) -> Result<Vec<Pet>> {
        tracing::info!("Processing category query for {}", category);
        let category = category.to_lowercase();
        self.find_by(|pet| pet.category.to_lowercase() == category)
            .await
    }

    pub async fn find_by_availability(&self, available: bool) -> Result<Vec<Pet>> {
        tracing::info!("Processing available query for {}", available);
        self.find_by(|pet| pet.available == available).await
    }

    /// Drop every pet and restart the id sequence
    #[cfg_attr(not(test), allow(dead_code))]
    pub async fn remove_all(&self) -> Result<()> {
        self.store.flush_all().await
    }

    /// Create a pet from a name and category, as used for seeding
    #[cfg_attr(not(test), allow(dead_code))]
    pub async fn load(&self, name: &str, category: &str) -> Result<Pet> {
        let mut pet = Pet::new(name, category);
        self.save(&mut pet).await?;
        Ok(pet)
    }

    /// Full scan in store key order, skipping the counter key
    async fn find_by<F>(&self, predicate: F) -> Result<Vec<Pet>>
    where
        F: Fn(&Pet) -> bool,
    {
        let mut results = Vec::new();
        for key in self.store.keys().await? {
            if key == COUNTER_KEY {
                continue;
            }
            let Ok(id) = key.parse::<u64>() else {
                tracing::warn!("Skipping unexpected key in store: {}", key);
                continue;
            };
            // Gone between the key scan and the read
            let Some(record) = self.store.get(id).await? else {
                continue;
            };
            let pet = decode(id, &record)?;
            if predicate(&pet) {
                results.push(pet);
            }
        }
        Ok(results)
    }
}

fn decode(id: u64, record: &str) -> Result<Pet> {
    serde_json::from_str(record).with_context(|| format!("Corrupt pet record under key {}", id))
}
