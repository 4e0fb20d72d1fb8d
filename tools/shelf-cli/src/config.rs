//! CLI configuration.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shelf_cache::CachePolicy;
use shelf_data::{TimeoutConfig, DEFAULT_SEARCH_PATH};

/// Names searched for when no `--config` is given, in order.
pub const CONFIG_NAMES: [&str; 3] = ["shelf.toml", ".shelf.toml", "shelf.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShelfConfig {
    /// Catalog API.
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging.
    #[serde(default)]
    pub log: LogConfig,

    /// Shop page behaviour.
    #[serde(default)]
    pub shop: ShopConfig,
}

impl ShelfConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }
}

/// Catalog API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the storefront API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the aggregation endpoint.
    #[serde(default = "default_search_path")]
    pub search_path: String,

    /// Total request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_search_path() -> String {
    DEFAULT_SEARCH_PATH.to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_connect_timeout_ms() -> u64 {
    3_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            search_path: default_search_path(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl ApiConfig {
    pub fn timeouts(&self) -> TimeoutConfig {
        TimeoutConfig::new(
            Duration::from_millis(self.connect_timeout_ms),
            Duration::from_millis(self.timeout_ms),
        )
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging settings. `RUST_LOG` overrides `level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

/// Shop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Seconds the full price range is served without refetching.
    #[serde(default = "default_fresh_secs")]
    pub fresh_secs: u64,

    /// Seconds the full price range is kept at all.
    #[serde(default = "default_keep_secs")]
    pub keep_secs: u64,
}

fn default_fresh_secs() -> u64 {
    60 * 60
}

fn default_keep_secs() -> u64 {
    24 * 60 * 60
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            fresh_secs: default_fresh_secs(),
            keep_secs: default_keep_secs(),
        }
    }
}

impl ShopConfig {
    pub fn price_policy(&self) -> CachePolicy {
        CachePolicy::new(Duration::from_secs(self.fresh_secs))
            .keep_for(Duration::from_secs(self.keep_secs))
    }
}

/// Generate a default shelf.toml config file.
pub fn generate_default_config(base_url: &str) -> String {
    format!(
        r#"# Bookshelf catalog CLI configuration

[api]
base_url = "{base_url}"
search_path = "{search_path}"
timeout_ms = {timeout_ms}
connect_timeout_ms = {connect_timeout_ms}

[log]
# RUST_LOG overrides this
level = "warn"
# "pretty" or "json"
format = "pretty"

[shop]
# full price range: served from cache for fresh_secs, kept for keep_secs
fresh_secs = {fresh_secs}
keep_secs = {keep_secs}
"#,
        base_url = base_url,
        search_path = DEFAULT_SEARCH_PATH,
        timeout_ms = default_timeout_ms(),
        connect_timeout_ms = default_connect_timeout_ms(),
        fresh_secs = default_fresh_secs(),
        keep_secs = default_keep_secs(),
    )
}
