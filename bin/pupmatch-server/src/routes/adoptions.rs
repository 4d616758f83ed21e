//! `/api/adoptions`: append-only adoption requests.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use pupmatch_core::model::new_id;
use tracing::{error, info};
use utoipa::OpenApi;

use crate::db::{AdoptionRow, AdoptionStore};
use crate::error::ServerError;
use crate::middleware::cors::with_cors;
use crate::routes::{method_not_allowed, preflight};
use crate::schemas::adoptions::{AdoptionResponse, CreateAdoptionRequest};
use crate::schemas::{parse_body, text, truthy};
use crate::state::AppState;

pub const ALLOW_METHODS: &str = "POST,OPTIONS";

#[derive(OpenApi)]
#[openapi(
    paths(create_adoption),
    components(schemas(CreateAdoptionRequest, AdoptionResponse))
)]
pub struct AdoptionsApi;

pub fn router() -> Router<Arc<AppState>> {
    let routes = Router::new().route(
        "/api/adoptions",
        post(create_adoption)
            .options(preflight)
            .fallback(method_not_allowed),
    );
    with_cors(routes, ALLOW_METHODS)
}

/// Accepts RFC 3339 or a zone-less `datetime-local` value (read as UTC).
fn parse_pickup_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[utoipa::path(
    post,
    path = "/api/adoptions",
    tag = "adoptions",
    request_body = CreateAdoptionRequest,
    responses(
        (status = 201, description = "Adoption recorded", body = AdoptionResponse),
        (status = 400, description = "Missing required fields or invalid pickupTime"),
        (status = 500, description = "Server error"),
    )
)]
pub async fn create_adoption(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<AdoptionResponse>), ServerError> {
    let req: CreateAdoptionRequest = parse_body(&body).map_err(|e| {
        error!(error = %e, "unparseable adoption body");
        ServerError::Internal(e.to_string())
    })?;

    if !(truthy(&req.dog_id) && truthy(&req.dog_name) && truthy(&req.full_name) && truthy(&req.pickup_time)) {
        return Err(ServerError::BadRequest("Missing required fields".into()));
    }

    let raw_pickup = text(req.pickup_time).unwrap_or_default();
    let pickup_time = parse_pickup_time(&raw_pickup)
        .ok_or_else(|| ServerError::BadRequest("Invalid pickupTime".into()))?;

    let row = AdoptionRow {
        id: new_id(),
        dog_id: text(req.dog_id).unwrap_or_default(),
        dog_name: text(req.dog_name).unwrap_or_default(),
        full_name: text(req.full_name).unwrap_or_default(),
        pickup_time: pickup_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        remarks: text(req.remarks),
        created_at: Utc::now(),
    };
    state.store.insert_adoption(row.clone()).await?;
    info!(adoption_id = %row.id, dog_id = %row.dog_id, "adoption row inserted");
    Ok((StatusCode::CREATED, Json(row.to_response())))
}
