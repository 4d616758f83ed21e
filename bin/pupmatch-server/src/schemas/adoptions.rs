use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::db::AdoptionRow;

/// `POST /api/adoptions` body.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdoptionRequest {
    #[schema(value_type = String)]
    pub dog_id: Option<Value>,
    #[schema(value_type = String)]
    pub dog_name: Option<Value>,
    #[schema(value_type = String)]
    pub full_name: Option<Value>,
    /// RFC 3339 or a `datetime-local` value such as `2026-11-01T10:00`.
    #[schema(value_type = String)]
    pub pickup_time: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub remarks: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdoptionResponse {
    pub id: String,
    pub dog_id: String,
    pub dog_name: String,
    pub full_name: String,
    pub pickup_time: String,
    pub remarks: Option<String>,
    pub created_at: String,
}

impl AdoptionRow {
    pub fn to_response(&self) -> AdoptionResponse {
        AdoptionResponse {
            id: self.id.clone(),
            dog_id: self.dog_id.clone(),
            dog_name: self.dog_name.clone(),
            full_name: self.full_name.clone(),
            pickup_time: self.pickup_time.clone(),
            remarks: self.remarks.clone(),
            created_at: self.created_at.to_rfc3339(),
        }
    }
}
