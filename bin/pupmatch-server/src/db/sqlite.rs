//! SQLite implementation of [`DogStore`] and [`AdoptionStore`].
//!
//! Migrations are embedded at compile time by `sqlx::migrate!("./migrations")`
//! (relative to `CARGO_MANIFEST_DIR`) and run by [`SqliteStore::connect`].
//! Queries use the runtime-checked `sqlx::query` form so no `DATABASE_URL`
//! is needed at build time.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use tracing::warn;

use super::{AdoptionRow, AdoptionStore, DogRow, DogStore};

#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

type DogTuple = (
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    Option<String>,
    Option<String>,
    String,
    Option<String>,
    String,
);

impl SqliteStore {
    /// Open (or create) the database at `url` and run pending migrations.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        Self::migrate(pool).await
    }

    /// A private in-memory database for tests.
    ///
    /// Pinned to one connection that never recycles, otherwise each pooled
    /// connection would see its own empty database.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

fn to_text(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_time(raw: &str) -> DateTime<Utc> {
    raw.parse().unwrap_or_else(|e: chrono::ParseError| {
        warn!(raw = %raw, error = %e, "failed to parse created_at; using now");
        Utc::now()
    })
}

fn parse_json(raw: &str, column: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(column, error = %e, "stored JSON column is malformed");
        Value::Null
    })
}

// ── DogStore ──────────────────────────────────────────────────────────────────

impl DogStore for SqliteStore {
    async fn insert_dog(&self, record: DogRow) -> Result<(), sqlx::Error> {
        let attributes = record.attributes.to_string();
        let parents = record.parents.as_ref().map(Value::to_string);
        sqlx::query(
            "INSERT INTO dogs (id, name, breed, birthdate, age, description, image_url, gif_url, \
             attributes, parents, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.breed)
        .bind(&record.birthdate)
        .bind(&record.age)
        .bind(&record.description)
        .bind(&record.image_url)
        .bind(&record.gif_url)
        .bind(&attributes)
        .bind(&parents)
        .bind(to_text(record.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_dogs(&self) -> Result<Vec<DogRow>, sqlx::Error> {
        let rows: Vec<DogTuple> = sqlx::query_as(
            "SELECT id, name, breed, birthdate, age, description, image_url, gif_url, \
             attributes, parents, created_at \
             FROM dogs ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(
                |(id, name, breed, birthdate, age, description, image_url, gif_url, attributes, parents, created_at)| {
                    DogRow {
                        id,
                        name,
                        breed,
                        birthdate,
                        age,
                        description,
                        image_url,
                        gif_url,
                        attributes: parse_json(&attributes, "attributes"),
                        parents: parents.as_deref().map(|p| parse_json(p, "parents")),
                        created_at: parse_time(&created_at),
                    }
                },
            )
            .collect())
    }

    async fn delete_dog(&self, id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM dogs WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// ── AdoptionStore ─────────────────────────────────────────────────────────────

impl AdoptionStore for SqliteStore {
    async fn insert_adoption(&self, record: AdoptionRow) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO adoptions (id, dog_id, dog_name, full_name, pickup_time, remarks, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&record.id)
        .bind(&record.dog_id)
        .bind(&record.dog_name)
        .bind(&record.full_name)
        .bind(&record.pickup_time)
        .bind(&record.remarks)
        .bind(to_text(record.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
