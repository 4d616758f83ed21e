//! `/api/dogs`: list, create and delete catalog rows.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use bytes::Bytes;
use chrono::Utc;
use pupmatch_core::age::parse_date;
use pupmatch_core::model::new_id;
use tracing::{error, info};
use utoipa::OpenApi;

use crate::db::{DogRow, DogStore};
use crate::error::ServerError;
use crate::middleware::cors::with_cors;
use crate::routes::{method_not_allowed, preflight};
use crate::schemas::dogs::{CreateDogRequest, DeleteDogParams, DogResponse};
use crate::schemas::{parse_body, text, truthy};
use crate::state::AppState;

pub const ALLOW_METHODS: &str = "GET,POST,DELETE,OPTIONS";

#[derive(OpenApi)]
#[openapi(
    paths(list_dogs, create_dog, delete_dog),
    components(schemas(CreateDogRequest, DogResponse))
)]
pub struct DogsApi;

pub fn router() -> Router<Arc<AppState>> {
    let routes = Router::new().route(
        "/api/dogs",
        get(list_dogs)
            .post(create_dog)
            .delete(delete_dog)
            .options(preflight)
            .fallback(method_not_allowed),
    );
    with_cors(routes, ALLOW_METHODS)
}

#[utoipa::path(
    get,
    path = "/api/dogs",
    tag = "dogs",
    responses(
        (status = 200, description = "All dogs, newest first", body = Vec<DogResponse>),
        (status = 500, description = "Server error"),
    )
)]
pub async fn list_dogs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DogResponse>>, ServerError> {
    let rows = state.store.list_dogs().await?;
    Ok(Json(rows.iter().map(DogRow::to_response).collect()))
}

#[utoipa::path(
    post,
    path = "/api/dogs",
    tag = "dogs",
    request_body = CreateDogRequest,
    responses(
        (status = 201, description = "Dog created", body = DogResponse),
        (status = 400, description = "Missing required fields"),
        (status = 500, description = "Server error"),
    )
)]
pub async fn create_dog(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<DogResponse>), ServerError> {
    let req: CreateDogRequest = parse_body(&body).map_err(|e| {
        error!(error = %e, "unparseable dog body");
        ServerError::Internal(e.to_string())
    })?;

    if !(truthy(&req.name) && truthy(&req.breed) && truthy(&req.description) && truthy(&req.attributes)) {
        return Err(ServerError::BadRequest("Missing required fields".into()));
    }

    let birthdate = if truthy(&req.birthdate) {
        let raw = text(req.birthdate).unwrap_or_default();
        let date = parse_date(&raw).ok_or_else(|| ServerError::BadRequest("Invalid birthdate".into()))?;
        Some(date.format("%Y-%m-%d").to_string())
    } else {
        None
    };

    let row = DogRow {
        id: text(req.id).filter(|id| !id.is_empty()).unwrap_or_else(new_id),
        name: text(req.name).unwrap_or_default(),
        breed: text(req.breed).unwrap_or_default(),
        birthdate,
        age: text(req.age),
        description: text(req.description).unwrap_or_default(),
        image_url: text(req.image_url),
        gif_url: text(req.gif_url),
        attributes: req.attributes.unwrap_or_default(),
        parents: if truthy(&req.parents) { req.parents } else { None },
        created_at: Utc::now(),
    };
    state.store.insert_dog(row.clone()).await?;
    info!(dog_id = %row.id, name = %row.name, "dog row inserted");
    Ok((StatusCode::CREATED, Json(row.to_response())))
}

#[utoipa::path(
    delete,
    path = "/api/dogs",
    tag = "dogs",
    params(DeleteDogParams),
    responses(
        (status = 204, description = "Dog deleted (or never existed)"),
        (status = 400, description = "Missing id"),
        (status = 500, description = "Server error"),
    )
)]
pub async fn delete_dog(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DeleteDogParams>,
) -> Result<StatusCode, ServerError> {
    let id = params
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ServerError::BadRequest("Missing id".into()))?;
    let removed = state.store.delete_dog(&id).await?;
    info!(dog_id = %id, removed, "dog row deleted");
    Ok(StatusCode::NO_CONTENT)
}
