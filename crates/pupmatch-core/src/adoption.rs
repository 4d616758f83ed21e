//! Adoption submissions. Records are only ever appended.

use chrono::Utc;
use tracing::info;

use crate::error::Result;
use crate::model::{AdoptionFields, AdoptionRecord, new_id, timestamp};
use crate::storage::{ADOPTIONS_KEY, SharedStore, load_json, save_json};

pub struct AdoptionBook {
    store: SharedStore,
    records: Vec<AdoptionRecord>,
}

impl std::fmt::Debug for AdoptionBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AdoptionBook({} records)", self.records.len())
    }
}

impl AdoptionBook {
    /// Open the book and read whatever is persisted.
    pub fn open(store: SharedStore) -> Self {
        let mut book = Self { store, records: Vec::new() };
        book.load();
        book
    }

    pub fn load(&mut self) {
        self.records = load_json(self.store.as_ref(), ADOPTIONS_KEY).unwrap_or_default();
    }

    /// Record a request with a fresh id and the current time.
    ///
    /// Required-field checks belong to the caller.
    pub fn submit(&mut self, fields: AdoptionFields) -> Result<AdoptionRecord> {
        let record = AdoptionRecord {
            id: new_id(),
            dog_id: fields.dog_id,
            dog_name: fields.dog_name,
            full_name: fields.full_name,
            pickup_time: fields.pickup_time,
            remarks: fields.remarks.filter(|r| !r.is_empty()),
            created_at: timestamp(Utc::now()),
        };
        self.records.push(record.clone());
        save_json(self.store.as_ref(), ADOPTIONS_KEY, &self.records)?;
        info!(adoption_id = %record.id, dog_id = %record.dog_id, "adoption submitted");
        Ok(record)
    }

    pub fn list(&self) -> Vec<AdoptionRecord> {
        self.records.clone()
    }
}
