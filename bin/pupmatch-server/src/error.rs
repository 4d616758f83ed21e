//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors become a JSON body of the form
//! `{"error": "..."}` with a matching status code.
//!
//! Internal errors (database, storage, templates) are logged with full detail
//! but the caller only sees `"Server error"`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pupmatch_core::CoreError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Body returned for every internal failure.
pub const SERVER_ERROR: &str = "Server error";

#[derive(Debug, Error)]
pub enum ServerError {
    /// Propagated from the SQLite store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Propagated from the local models, registry or renderer.
    #[error("core error: {0}")]
    Core(CoreError),

    /// The caller referenced a resource that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller sent an invalid or incomplete request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Owner-only route hit without owner mode.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for ServerError {
    fn from(e: CoreError) -> Self {
        match e {
            // Bad input from the add-dog form, not a server fault.
            CoreError::RejectedImageUrl { .. } | CoreError::InvalidDataUrl(_) => {
                ServerError::BadRequest(e.to_string())
            }
            CoreError::Image(err) => {
                ServerError::BadRequest(format!("image could not be decoded: {err}"))
            }
            CoreError::UnknownImage(_) => ServerError::NotFound("Image not found".into()),
            other => ServerError::Core(other),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
            ServerError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed".to_owned())
            }
            ServerError::Database(e) => {
                error!(error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR.to_owned())
            }
            ServerError::Core(e) => {
                error!(error = %e, "core error");
                (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR.to_owned())
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR.to_owned())
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}
