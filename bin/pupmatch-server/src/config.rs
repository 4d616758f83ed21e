//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;

/// Runtime configuration for pupmatch-server.
///
/// Every field has a default so the server starts without any environment
/// variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// sqlx SQLite URL for the backend tables (default: `"sqlite://pupmatch.db"`).
    pub database_url: String,

    /// Directory holding the local catalog, adoption and image entries.
    pub data_dir: PathBuf,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// PIN that unlocks owner mode. Not a security boundary.
    pub owner_pin: String,

    /// Base URL of a backend to mirror writes to. `None` disables mirroring.
    pub remote_url: Option<String>,

    /// Check image URLs with a `HEAD` request before accepting them.
    pub verify_image_urls: bool,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    /// Request body limit for the add-dog form.
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_owned(),
            database_url: "sqlite://pupmatch.db".to_owned(),
            data_dir: PathBuf::from("./pupmatch-data"),
            log_level: "info".to_owned(),
            log_json: false,
            owner_pin: "owner123".to_owned(),
            remote_url: None,
            verify_image_urls: false,
            enable_swagger: true,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: env_or("PUPMATCH_BIND", &defaults.bind_address),
            database_url: env_or("PUPMATCH_DATABASE_URL", &defaults.database_url),
            data_dir: std::env::var_os("PUPMATCH_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            log_level: env_or("PUPMATCH_LOG", &defaults.log_level),
            log_json: env_flag("PUPMATCH_LOG_JSON", defaults.log_json),
            owner_pin: env_or("PUPMATCH_OWNER_PIN", &defaults.owner_pin),
            remote_url: std::env::var("PUPMATCH_REMOTE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            verify_image_urls: env_flag("PUPMATCH_VERIFY_IMAGE_URLS", defaults.verify_image_urls),
            enable_swagger: env_flag("PUPMATCH_ENABLE_SWAGGER", defaults.enable_swagger),
            max_upload_bytes: parse_env("PUPMATCH_MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.bind_address, "0.0.0.0:3000");
        assert_eq!(cfg.owner_pin, "owner123");
        assert!(cfg.enable_swagger);
        assert!(cfg.remote_url.is_none());
        assert_eq!(cfg.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn unparseable_numbers_fall_back() {
        assert_eq!(parse_env("PUPMATCH_TEST_UNSET_NUMBER", 7usize), 7);
        assert!(env_flag("PUPMATCH_TEST_UNSET_FLAG", true));
    }
}
