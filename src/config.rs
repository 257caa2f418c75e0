//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::i18n::Locale;
use crate::state::pagination::PAGE_SIZES;

/// Application configuration loaded from environment variables.
///
/// Every field is read from `ROUTE_ADMIN_<FIELD>` except the logging knobs,
/// which keep their conventional `RUST_LOG` / `VERBOSE` names.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Backend ===
    /// Management API base URL, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout for management API calls.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    // === Local state ===
    /// File holding the persisted API key.
    #[serde(default = "default_key_file")]
    pub key_file: PathBuf,

    // === Panel behaviour ===
    /// Initial page size for route listings.
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Quiet period before a search input triggers a reload.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Lifetime of on-screen notices.
    #[serde(default = "default_notice_ms")]
    pub notice_ms: u64,

    /// UI language.
    #[serde(default)]
    pub locale: Locale,

    // === Web panel ===
    /// Port for `route-admin serve`.
    #[serde(default = "default_port")]
    pub port: u16,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level", skip)]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default, skip)]
    pub verbose: bool,
}

/// Logging knobs read without the `ROUTE_ADMIN_` prefix.
#[derive(Debug, Deserialize)]
struct LogEnv {
    #[serde(default = "default_log_level")]
    rust_log: String,
    #[serde(default)]
    verbose: bool,
}

fn default_base_url() -> String {
    "http://localhost:15001/_manage".to_string()
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

fn default_key_file() -> PathBuf {
    PathBuf::from(".route-admin.json")
}

fn default_per_page() -> u32 {
    10
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_notice_ms() -> u64 {
    3_000
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            http_timeout_ms: default_http_timeout_ms(),
            key_file: default_key_file(),
            per_page: default_per_page(),
            debounce_ms: default_debounce_ms(),
            notice_ms: default_notice_ms(),
            locale: Locale::default(),
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        let mut config: Config = envy::prefixed("ROUTE_ADMIN_").from_env()?;
        let log: LogEnv = envy::from_env()?;
        config.rust_log = log.rust_log;
        config.verbose = log.verbose;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| format!("ROUTE_ADMIN_BASE_URL is not a valid URL: {}", e))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err("ROUTE_ADMIN_BASE_URL must use http or https".to_string());
        }

        if !PAGE_SIZES.contains(&self.per_page) {
            return Err(format!(
                "ROUTE_ADMIN_PER_PAGE must be one of {:?}",
                PAGE_SIZES
            ));
        }

        if self.http_timeout_ms == 0 {
            return Err("ROUTE_ADMIN_HTTP_TIMEOUT_MS must be greater than 0".to_string());
        }

        if self.notice_ms == 0 {
            return Err("ROUTE_ADMIN_NOTICE_MS must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Request timeout as a duration.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    /// Search debounce window as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Notice lifetime as a duration.
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }
}
