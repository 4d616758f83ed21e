//! Axum router construction.
//!
//! [`build`] assembles the complete application router:
//! - the per-request trace middleware
//! - optional Swagger UI / OpenAPI document (disable with `PUPMATCH_ENABLE_SWAGGER=false`)
//! - `/health`
//! - the JSON handlers under `/api`, each with its own CORS headers
//! - the server-rendered site pages

mod adoptions;
pub mod doc;
mod dogs;
mod health;
mod site;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::{Router, middleware};
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ServerError;
use crate::middleware::trace;
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(dogs::router())
        .merge(adoptions::router())
        .merge(site::router(state.config.max_upload_bytes));

    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    app.layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

/// CORS preflight: headers only.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::middleware::trace::X_TRACE_ID;
    use crate::state::testing;
    use axum::http::Method;
    use pupmatch_core::mirror::RemoteMirror;
    use pupmatch_core::{AdoptionRecord, CoreError, NewDog};
    use super::test_support::{body_json, send, serve};

    #[tokio::test]
    async fn full_router_serves_health_with_trace_id() {
        let app = build(testing::state().await);
        let resp = send(app, Method::GET, "/health", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(X_TRACE_ID));
        assert_eq!(body_json(resp).await["status"], "ok");
    }

    #[tokio::test]
    async fn openapi_document_lists_handlers() {
        let app = build(testing::state().await);
        let resp = send(app, Method::GET, "/api-docs/openapi.json", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let doc = body_json(resp).await;
        assert!(doc["paths"]["/api/dogs"].is_object());
        assert!(doc["paths"]["/api/adoptions"].is_object());
    }

    #[tokio::test]
    async fn incoming_trace_id_is_echoed() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        let app = build(testing::state().await);
        let id = "6f1c3c52-4a36-4c5c-8f44-2b1e0a1f3d9e";
        let req = Request::builder()
            .uri("/health")
            .header(X_TRACE_ID, id)
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.headers()[X_TRACE_ID], id);
    }

    #[tokio::test]
    async fn remote_mirror_writes_through_to_live_handlers() {
        let base = serve(build(testing::state().await)).await;
        let mirror = RemoteMirror::new(format!("{base}/"));

        let dog = NewDog {
            name: "Rex".into(),
            breed: "Lab".into(),
            birthdate: Some("2025-08-17".into()),
            description: "friendly".into(),
            image_url: "https://example.com/rex.jpg".into(),
            ..Default::default()
        }
        .into_dog();
        mirror.create_dog(&dog).await.unwrap();

        let remote = mirror.list_dogs().await.unwrap();
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].id, dog.id);
        assert_eq!(remote[0].name, "Rex");
        assert_eq!(remote[0].breed, "Lab");

        let record = AdoptionRecord {
            id: "a1".into(),
            dog_id: dog.id.clone(),
            dog_name: dog.name.clone(),
            full_name: "Jane Doe".into(),
            pickup_time: "2026-11-01T10:00".into(),
            remarks: None,
            created_at: "2026-10-17T09:00:00.000Z".into(),
        };
        mirror.create_adoption(&record).await.unwrap();

        mirror.delete_dog(&dog.id).await.unwrap();
        assert!(mirror.list_dogs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remote_mirror_surfaces_rejections() {
        let base = serve(build(testing::state().await)).await;
        let mirror = RemoteMirror::new(base);

        let nameless = NewDog { breed: "Lab".into(), ..Default::default() }.into_dog();
        assert!(matches!(mirror.create_dog(&nameless).await, Err(CoreError::Http(_))));

        let record = AdoptionRecord {
            id: "a1".into(),
            dog_id: "d1".into(),
            dog_name: "Rex".into(),
            full_name: "Jane Doe".into(),
            pickup_time: "whenever".into(),
            remarks: None,
            created_at: String::new(),
        };
        assert!(matches!(mirror.create_adoption(&record).await, Err(CoreError::Http(_))));
    }
}
