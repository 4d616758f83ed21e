//! Shared application state injected into every Axum handler.

use std::sync::Arc;
use std::time::Duration;

use pupmatch_core::AppContext;
use pupmatch_core::mirror::RemoteMirror;
use pupmatch_core::resolver::{AnyResolver, HttpImageResolver, PermissiveResolver};

use crate::config::Config;
use crate::db::sqlite::SqliteStore;

/// Timeout for image URL `HEAD` checks.
const IMAGE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Backend `dogs` / `adoptions` tables.
    pub store: Arc<SqliteStore>,
    /// Local catalog, adoption book and image registry behind the site pages.
    pub site: Arc<AppContext>,
    pub resolver: Arc<AnyResolver>,
    /// Write-through target, when `PUPMATCH_REMOTE_URL` is set.
    pub mirror: Option<Arc<RemoteMirror>>,
}

impl AppState {
    pub fn new(config: Config, store: SqliteStore, site: AppContext) -> Self {
        let resolver = if config.verify_image_urls {
            AnyResolver::Http(HttpImageResolver::new(IMAGE_CHECK_TIMEOUT))
        } else {
            AnyResolver::Permissive(PermissiveResolver)
        };
        let mirror = config
            .remote_url
            .as_deref()
            .map(|url| Arc::new(RemoteMirror::new(url)));
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            site: Arc::new(site),
            resolver: Arc::new(resolver),
            mirror,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use chrono::NaiveDate;
    use pupmatch_core::MemoryStore;

    /// State over an in-memory database and store, mirror disabled.
    pub async fn state() -> Arc<AppState> {
        let store = SqliteStore::in_memory().await.unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let site = AppContext::open(MemoryStore::shared(), today).unwrap();
        Arc::new(AppState::new(Config::default(), store, site))
    }
}
