use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::db::DogRow;

/// `POST /api/dogs` body. Fields are kept loose so truthiness can be checked
/// the same way for every client.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDogRequest {
    /// Client-chosen id; a fresh UUID is generated when absent.
    #[schema(value_type = Option<String>)]
    pub id: Option<Value>,
    #[schema(value_type = String)]
    pub name: Option<Value>,
    #[schema(value_type = String)]
    pub breed: Option<Value>,
    /// `YYYY-MM-DD`
    #[schema(value_type = Option<String>)]
    pub birthdate: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub age: Option<Value>,
    #[schema(value_type = String)]
    pub description: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub gif_url: Option<Value>,
    #[schema(value_type = Object)]
    pub attributes: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub parents: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DogResponse {
    pub id: String,
    pub name: String,
    pub breed: String,
    pub birthdate: Option<String>,
    pub age: Option<String>,
    pub description: String,
    pub image_url: Option<String>,
    pub gif_url: Option<String>,
    #[schema(value_type = Object)]
    pub attributes: Value,
    #[schema(value_type = Option<Object>)]
    pub parents: Option<Value>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteDogParams {
    pub id: Option<String>,
}

impl DogRow {
    pub fn to_response(&self) -> DogResponse {
        DogResponse {
            id: self.id.clone(),
            name: self.name.clone(),
            breed: self.breed.clone(),
            birthdate: self.birthdate.clone(),
            age: self.age.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            gif_url: self.gif_url.clone(),
            attributes: self.attributes.clone(),
            parents: self.parents.clone(),
            created_at: self.created_at.to_rfc3339(),
        }
    }
}
