//! Per-request trace span.
//!
//! Every request runs inside an `http_request` span carrying a trace id taken
//! from the `x-trace-id` header (or freshly generated) and echoed back on the
//! response. Small JSON bodies are logged; anything else is only sized.

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use http_body_util::BodyExt;
use std::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

/// JSON bodies up to this size are written to the log.
const LOGGED_BODY_LIMIT: usize = 1024;

pub async fn trace_middleware(req: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");
        let (parts, body) = req.into_parts();
        let body = if is_json(&parts.headers) {
            Body::from(buffer_and_log(body).await)
        } else {
            body
        };
        let mut req = Request::from_parts(parts, body);
        let header_value = HeaderValue::from_str(&trace_id.to_string()).ok();
        if let Some(v) = &header_value {
            req.headers_mut().insert(X_TRACE_ID, v.clone());
        }

        let mut response = next.run(req).await;
        if let Some(v) = header_value {
            response.headers_mut().insert(X_TRACE_ID, v);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis() as u64,
            "← response finished"
        );
        response
    }
    .instrument(span)
    .await
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"))
}

async fn buffer_and_log(body: Body) -> Bytes {
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(error = %e, "failed to read request body");
            return Bytes::new();
        }
    };
    match std::str::from_utf8(&bytes) {
        Ok(text) if bytes.len() <= LOGGED_BODY_LIMIT => debug!(body = %text, "request body"),
        _ => debug!(size = bytes.len(), "request body [skipped]"),
    }
    bytes
}
