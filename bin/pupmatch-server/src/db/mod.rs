//! Database abstraction layer.
//!
//! [`DogStore`] and [`AdoptionStore`] define what the backend handlers need.
//! The default implementation is [`sqlite::SqliteStore`]; another database
//! only has to implement both traits.
//!
//! Trait methods return `impl Future` so no `async-trait` crate is needed.

pub mod sqlite;

use std::future::Future;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A row in the `dogs` table.
#[derive(Debug, Clone, PartialEq)]
pub struct DogRow {
    pub id: String,
    pub name: String,
    pub breed: String,
    pub birthdate: Option<String>,
    /// Legacy free-text age.
    pub age: Option<String>,
    pub description: String,
    pub image_url: Option<String>,
    pub gif_url: Option<String>,
    /// The five attribute scores as a JSON object.
    pub attributes: Value,
    pub parents: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// A row in the `adoptions` table. `dog_id` is not a foreign key.
#[derive(Debug, Clone, PartialEq)]
pub struct AdoptionRow {
    pub id: String,
    pub dog_id: String,
    pub dog_name: String,
    pub full_name: String,
    pub pickup_time: String,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub trait DogStore: Send + Sync + 'static {
    fn insert_dog(&self, record: DogRow) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    /// Newest first.
    fn list_dogs(&self) -> impl Future<Output = Result<Vec<DogRow>, sqlx::Error>> + Send;

    /// Returns the number of rows removed; deleting an unknown id is not an error.
    fn delete_dog(&self, id: &str) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;
}

pub trait AdoptionStore: Send + Sync + 'static {
    fn insert_adoption(
        &self,
        record: AdoptionRow,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}
