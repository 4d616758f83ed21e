//! Checks that an image URL is usable before a dog refers to it.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url, header};
use tracing::debug;

use crate::error::{CoreError, Result};

/// Decides whether a remote image URL is acceptable.
///
/// Implementations can be swapped without touching the form handling.
pub trait ImageResolver: Send + Sync + 'static {
    fn check(&self, url: &str) -> impl Future<Output = Result<()>> + Send;
}

fn parse_http_url(url: &str) -> Result<Url> {
    let rejected = |reason: &str| CoreError::RejectedImageUrl {
        url: url.to_owned(),
        reason: reason.to_owned(),
    };
    let parsed = Url::parse(url).map_err(|e| rejected(&e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(rejected(&format!("unsupported scheme '{other}'"))),
    }
}

/// Accepts any absolute http(s) URL without contacting it.
#[derive(Debug, Clone, Default)]
pub struct PermissiveResolver;

impl ImageResolver for PermissiveResolver {
    async fn check(&self, url: &str) -> Result<()> {
        parse_http_url(url).map(|_| ())
    }
}

/// Issues a `HEAD` request and requires a 2xx `image/*` response.
#[derive(Debug, Clone)]
pub struct HttpImageResolver {
    client: Client,
}

impl HttpImageResolver {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(concat!("pupmatch/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl ImageResolver for HttpImageResolver {
    async fn check(&self, url: &str) -> Result<()> {
        let parsed = parse_http_url(url)?;
        let resp = self
            .client
            .head(parsed)
            .send()
            .await
            .map_err(|e| CoreError::RejectedImageUrl {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_owned();
        debug!(url, %status, %content_type, "image URL checked");
        if !status.is_success() {
            return Err(CoreError::RejectedImageUrl {
                url: url.to_owned(),
                reason: format!("status {status}"),
            });
        }
        if !content_type.starts_with("image/") {
            return Err(CoreError::RejectedImageUrl {
                url: url.to_owned(),
                reason: format!("content type '{content_type}'"),
            });
        }
        Ok(())
    }
}

/// Runtime choice between the two resolvers.
#[derive(Debug, Clone)]
pub enum AnyResolver {
    Permissive(PermissiveResolver),
    Http(HttpImageResolver),
}

impl ImageResolver for AnyResolver {
    async fn check(&self, url: &str) -> Result<()> {
        match self {
            AnyResolver::Permissive(r) => r.check(url).await,
            AnyResolver::Http(r) => r.check(url).await,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::Router;
    use axum::http::header::CONTENT_TYPE;
    use axum::routing::get;

    /// Local image host: one PNG, one HTML page, everything else 404.
    async fn image_host() -> String {
        let app = Router::new()
            .route("/rex.png", get(|| async { ([(CONTENT_TYPE, "image/png")], "png") }))
            .route("/about", get(|| async { ([(CONTENT_TYPE, "text/html")], "<p>hi</p>") }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn reason(result: Result<()>) -> String {
        match result {
            Err(CoreError::RejectedImageUrl { reason, .. }) => reason,
            other => panic!("expected a rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn permissive_accepts_any_http_host() {
        let r = PermissiveResolver;
        assert!(r.check("https://cdn.example.org/dogs/rex.webp").await.is_ok());
        assert!(r.check("http://localhost:8080/a").await.is_ok());
    }

    #[tokio::test]
    async fn permissive_rejects_non_http() {
        let r = PermissiveResolver;
        assert!(matches!(
            r.check("ftp://example.com/a.png").await,
            Err(CoreError::RejectedImageUrl { .. })
        ));
        assert!(r.check("not a url").await.is_err());
    }

    #[tokio::test]
    async fn http_resolver_accepts_image_responses() {
        let host = image_host().await;
        let r = HttpImageResolver::new(Duration::from_secs(5));
        assert!(r.check(&format!("{host}/rex.png")).await.is_ok());
    }

    #[tokio::test]
    async fn http_resolver_rejects_missing_images() {
        let host = image_host().await;
        let r = HttpImageResolver::new(Duration::from_secs(5));
        assert_eq!(reason(r.check(&format!("{host}/gone.png")).await), "status 404 Not Found");
    }

    #[tokio::test]
    async fn http_resolver_rejects_non_image_content() {
        let host = image_host().await;
        let r = HttpImageResolver::new(Duration::from_secs(5));
        assert_eq!(
            reason(r.check(&format!("{host}/about")).await),
            "content type 'text/html'"
        );
    }

    #[tokio::test]
    async fn http_resolver_rejects_unreachable_hosts() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let r = HttpImageResolver::new(Duration::from_secs(5));
        assert!(!reason(r.check(&format!("http://{addr}/rex.png")).await).is_empty());
    }
}
