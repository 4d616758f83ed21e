//! Records persisted by the client-side models.
//!
//! Field names serialize in camelCase so previously stored collections keep
//! loading. Every field tolerates absence: a legacy entry missing a field
//! gets its default instead of failing the whole collection.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Lowest and highest attribute score.
pub const SCORE_MIN: u8 = 1;
pub const SCORE_MAX: u8 = 5;

/// The five fixed attribute scores of a dog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attributes {
    #[serde(deserialize_with = "lenient_score")]
    pub friendliness: u8,
    #[serde(deserialize_with = "lenient_score")]
    pub energy: u8,
    #[serde(deserialize_with = "lenient_score")]
    pub trainability: u8,
    #[serde(deserialize_with = "lenient_score")]
    pub kid_friendly: u8,
    #[serde(deserialize_with = "lenient_score")]
    pub size: u8,
}

/// Accepts any JSON number (or `null`, which a NaN form value serializes to)
/// so one odd score never discards the collection.
fn lenient_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_f64()
        .map(|v| v.round().clamp(0.0, u8::MAX as f64) as u8)
        .unwrap_or(0))
}

/// Treats an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            friendliness: 5,
            energy: 4,
            trainability: 4,
            kid_friendly: 5,
            size: 3,
        }
    }
}

impl Attributes {
    /// Display labels paired with their scores, in card order.
    pub fn rows(&self) -> [(&'static str, u8); 5] {
        [
            ("Friendliness", self.friendliness),
            ("Energy", self.energy),
            ("Trainability", self.trainability),
            ("Kid Friendly", self.kid_friendly),
            ("Size", self.size),
        ]
    }

    /// Copy with every score forced into `SCORE_MIN..=SCORE_MAX`.
    pub fn clamped(self) -> Self {
        let c = |v: u8| v.clamp(SCORE_MIN, SCORE_MAX);
        Self {
            friendliness: c(self.friendliness),
            energy: c(self.energy),
            trainability: c(self.trainability),
            kid_friendly: c(self.kid_friendly),
            size: c(self.size),
        }
    }
}

/// One parent of a dog. All fields are optional on the add form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParentRecord {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub image_url: Option<String>,
    pub image_id: Option<String>,
}

impl ParentRecord {
    /// A parent with no field filled in is not worth keeping.
    pub fn is_blank(&self) -> bool {
        self.name.is_none() && self.breed.is_none() && self.image_url.is_none() && self.image_id.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parents {
    pub mother: Option<ParentRecord>,
    pub father: Option<ParentRecord>,
}

impl Parents {
    pub fn is_empty(&self) -> bool {
        self.mother.is_none() && self.father.is_none()
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dog {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub breed: String,
    /// `YYYY-MM-DD`; kept as text so one malformed legacy value cannot
    /// poison the whole collection.
    #[serde(default)]
    pub birthdate: Option<String>,
    /// Legacy free-text age, e.g. `"2 years"`.
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gif_url: String,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub gif_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: Attributes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parents: Parents,
}

impl Dog {
    /// Parsed birthdate, if present and well formed.
    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birthdate.as_deref().and_then(crate::age::parse_date)
    }
}

/// Input to [`crate::catalog::Catalog::add`], built by the add-dog form.
#[derive(Debug, Clone, Default)]
pub struct NewDog {
    pub name: String,
    pub breed: String,
    pub birthdate: Option<String>,
    pub description: String,
    pub image_url: String,
    pub gif_url: String,
    pub image_id: Option<String>,
    pub gif_id: Option<String>,
    pub attributes: Attributes,
    pub parents: Parents,
}

impl NewDog {
    pub fn into_dog(self) -> Dog {
        Dog {
            id: new_id(),
            name: self.name,
            breed: self.breed,
            birthdate: self.birthdate.filter(|b| !b.is_empty()),
            age: None,
            description: self.description,
            image_url: self.image_url,
            gif_url: self.gif_url,
            image_id: self.image_id,
            gif_id: self.gif_id,
            attributes: self.attributes.clamped(),
            parents: self.parents,
        }
    }
}

/// An adoption request. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionRecord {
    pub id: String,
    pub dog_id: String,
    pub dog_name: String,
    pub full_name: String,
    pub pickup_time: String,
    #[serde(default)]
    pub remarks: Option<String>,
    pub created_at: String,
}

/// Fields collected by the adoption form.
#[derive(Debug, Clone, Default)]
pub struct AdoptionFields {
    pub dog_id: String,
    pub dog_name: String,
    pub full_name: String,
    pub pickup_time: String,
    pub remarks: Option<String>,
}

/// An uploaded image held as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub id: String,
    pub data: String,
    pub filename: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub uploaded_at: String,
}

pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn legacy_dog_without_optional_fields_loads_with_defaults() {
        let dog: Dog = serde_json::from_str(
            r#"{"id":"d1","name":"Rex","breed":"Lab","age":"2 years","description":"good"}"#,
        )
        .unwrap();
        assert_eq!(dog.attributes, Attributes::default());
        assert!(dog.parents.is_empty());
        assert_eq!(dog.image_url, "");
        assert_eq!(dog.birthdate, None);
    }

    #[test]
    fn explicit_nulls_fall_back_to_defaults() {
        let dog: Dog = serde_json::from_str(
            r#"{"id":"d2","name":null,"imageUrl":null,"parents":null,"attributes":null}"#,
        )
        .unwrap();
        assert_eq!(dog.name, "");
        assert_eq!(dog.image_url, "");
        assert!(dog.parents.is_empty());
        assert_eq!(dog.attributes, Attributes::default());
    }

    #[test]
    fn dog_serializes_camel_case() {
        let dog = NewDog {
            name: "Rex".into(),
            breed: "Lab".into(),
            image_url: "https://example.com/rex.jpg".into(),
            ..Default::default()
        }
        .into_dog();
        let value = serde_json::to_value(&dog).unwrap();
        assert_eq!(value["imageUrl"], "https://example.com/rex.jpg");
        assert_eq!(value["attributes"]["kidFriendly"], 5);
    }

    #[test]
    fn attribute_scores_are_clamped_on_creation() {
        let dog = NewDog {
            attributes: Attributes { friendliness: 0, energy: 9, ..Default::default() },
            ..Default::default()
        }
        .into_dog();
        assert_eq!(dog.attributes.friendliness, 1);
        assert_eq!(dog.attributes.energy, 5);
    }

    #[test]
    fn odd_scores_do_not_fail_deserialization() {
        let attrs: Attributes =
            serde_json::from_str(r#"{"friendliness":null,"energy":3.6,"size":"x"}"#).unwrap();
        assert_eq!(attrs.friendliness, 0);
        assert_eq!(attrs.energy, 4);
        assert_eq!(attrs.size, 0);
        assert_eq!(attrs.trainability, 4);
    }

    #[test]
    fn stored_image_uses_type_key() {
        let img = StoredImage {
            id: "i".into(),
            data: "data:image/png;base64,AA==".into(),
            filename: "a.png".into(),
            size: 1,
            mime_type: "image/png".into(),
            uploaded_at: timestamp(Utc::now()),
        };
        let value = serde_json::to_value(&img).unwrap();
        assert_eq!(value["type"], "image/png");
        assert!(value.get("uploadedAt").is_some());
    }
}
