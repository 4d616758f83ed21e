//! The dog catalog: an in-memory list mirrored to the `pupmatch.dogs` entry.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::age::approximate_birthdate;
use crate::error::Result;
use crate::model::Dog;
use crate::storage::{DOGS_KEY, SharedStore, load_json, save_json};

pub struct Catalog {
    store: SharedStore,
    dogs: Vec<Dog>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Catalog({} dogs)", self.dogs.len())
    }
}

impl Catalog {
    /// An empty catalog over `store`. Call [`Catalog::load`] to read it.
    pub fn new(store: SharedStore) -> Self {
        Self { store, dogs: Vec::new() }
    }

    /// Replace the in-memory list with the persisted one.
    ///
    /// Missing or unreadable data yields an empty list.
    pub fn load(&mut self) -> Vec<Dog> {
        self.dogs = load_json(self.store.as_ref(), DOGS_KEY).unwrap_or_default();
        debug!(count = self.dogs.len(), "catalog loaded");
        self.dogs.clone()
    }

    fn save(&self) -> Result<()> {
        save_json(self.store.as_ref(), DOGS_KEY, &self.dogs)
    }

    /// Newest first.
    pub fn add(&mut self, dog: Dog) -> Result<()> {
        info!(dog_id = %dog.id, name = %dog.name, "adding dog");
        self.dogs.insert(0, dog);
        self.save()
    }

    pub fn remove_by_id(&mut self, id: &str) -> Result<()> {
        self.dogs.retain(|d| d.id != id);
        info!(dog_id = %id, remaining = self.dogs.len(), "removed dog");
        self.save()
    }

    pub fn list(&self) -> Vec<Dog> {
        self.dogs.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Dog> {
        self.dogs.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.dogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dogs.is_empty()
    }

    /// Drop every dog, persisted entry included.
    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(DOGS_KEY)?;
        self.load();
        info!("catalog cleared");
        Ok(())
    }

    /// Backfill a birthdate for dogs that only carry legacy age text.
    ///
    /// Returns how many dogs changed; persists only when that is non-zero.
    pub fn migrate_legacy_ages(&mut self, today: NaiveDate) -> Result<usize> {
        let mut migrated = 0;
        for dog in &mut self.dogs {
            let has_birthdate = dog.birthdate.as_deref().is_some_and(|b| !b.is_empty());
            let Some(age) = dog.age.as_deref().filter(|a| !a.is_empty()) else {
                continue;
            };
            if has_birthdate {
                continue;
            }
            let approx = approximate_birthdate(age, today);
            dog.birthdate = Some(approx.format("%Y-%m-%d").to_string());
            migrated += 1;
        }
        if migrated > 0 {
            info!(migrated, "backfilled birthdates from legacy age text");
            self.save()?;
        }
        Ok(migrated)
    }
}
