//! Write-through client for the backend dog and adoption handlers.
//!
//! The local store stays authoritative; callers log mirror failures and
//! carry on.

use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::model::{AdoptionRecord, Dog};

#[derive(Debug, Clone)]
pub struct RemoteMirror {
    base_url: String,
    client: Client,
}

/// Body accepted by `POST /api/dogs`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DogBody<'a> {
    id: &'a str,
    name: &'a str,
    breed: &'a str,
    birthdate: Option<&'a str>,
    age: Option<&'a str>,
    description: &'a str,
    image_url: Option<&'a str>,
    gif_url: Option<&'a str>,
    attributes: Value,
    parents: Option<Value>,
}

/// Body accepted by `POST /api/adoptions`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdoptionBody<'a> {
    dog_id: &'a str,
    dog_name: &'a str,
    full_name: &'a str,
    pickup_time: &'a str,
    remarks: Option<&'a str>,
}

/// A dog row as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteDog {
    pub id: String,
    pub name: String,
    pub breed: String,
    pub created_at: String,
}

fn non_empty(s: &str) -> Option<&str> {
    Some(s).filter(|s| !s.is_empty())
}

impl RemoteMirror {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent(concat!("pupmatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn list_dogs(&self) -> Result<Vec<RemoteDog>> {
        let resp = self.client.get(self.url("/api/dogs")).send().await?;
        Ok(resp.error_for_status()?.json().await?)
    }

    pub async fn create_dog(&self, dog: &Dog) -> Result<()> {
        let parents = (!dog.parents.is_empty())
            .then(|| serde_json::to_value(&dog.parents))
            .transpose()?;
        let body = DogBody {
            id: &dog.id,
            name: &dog.name,
            breed: &dog.breed,
            birthdate: dog.birthdate.as_deref(),
            age: dog.age.as_deref(),
            description: &dog.description,
            // Embedded uploads stay local; only real URLs travel.
            image_url: non_empty(&dog.image_url).filter(|u| !u.starts_with("data:")),
            gif_url: non_empty(&dog.gif_url).filter(|u| !u.starts_with("data:")),
            attributes: serde_json::to_value(dog.attributes)?,
            parents,
        };
        let resp = self.client.post(self.url("/api/dogs")).json(&body).send().await?;
        resp.error_for_status()?;
        debug!(dog_id = %dog.id, "dog mirrored");
        Ok(())
    }

    pub async fn delete_dog(&self, id: &str) -> Result<()> {
        let mut url = Url::parse(&self.url("/api/dogs"))
            .map_err(|e| CoreError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut().append_pair("id", id);
        let resp = self.client.delete(url).send().await?;
        if resp.status() != StatusCode::NO_CONTENT {
            resp.error_for_status()?;
        }
        debug!(dog_id = %id, "dog deletion mirrored");
        Ok(())
    }

    pub async fn create_adoption(&self, record: &AdoptionRecord) -> Result<()> {
        let body = AdoptionBody {
            dog_id: &record.dog_id,
            dog_name: &record.dog_name,
            full_name: &record.full_name,
            pickup_time: &record.pickup_time,
            remarks: record.remarks.as_deref(),
        };
        let resp = self
            .client
            .post(self.url("/api/adoptions"))
            .json(&body)
            .send()
            .await?;
        resp.error_for_status()?;
        debug!(adoption_id = %record.id, "adoption mirrored");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let mirror = RemoteMirror::new("http://localhost:3000/");
        assert_eq!(mirror.url("/api/dogs"), "http://localhost:3000/api/dogs");
    }
}
