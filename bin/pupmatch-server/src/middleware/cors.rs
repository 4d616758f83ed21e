//! Fixed CORS headers for the backend handlers.
//!
//! Each handler advertises its own method list, so the headers are set per
//! router instead of through a global `CorsLayer`.

use axum::Router;
use axum::http::{HeaderValue, header};
use tower_http::set_header::SetResponseHeaderLayer;

pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Stamp `Access-Control-Allow-*` headers on every response from `router`,
/// errors included.
pub fn with_cors<S>(router: Router<S>, methods: &'static str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(methods),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
}
