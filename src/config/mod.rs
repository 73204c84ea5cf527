//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `BOOKLISTING_*` environment variables (nested keys separated by `__`, e.g.
//! `BOOKLISTING_SEARCH__DEBOUNCE_MS=500`).
//!
//! ```toml
//! [api]
//! base_url = "https://www.googleapis.com/books/v1/volumes"
//! max_results = 30
//! order_by = "newest"
//! default_term = "android"
//!
//! [http]
//! connect_timeout_secs = 15
//! read_timeout_secs = 10
//!
//! [search]
//! debounce_ms = 300
//! malformed_items = "abort_batch"   # or "skip_item"
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::DEFAULT_SEARCH_TERM;
use crate::sources::MalformedItemPolicy;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Books API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Search behaviour
    #[serde(default)]
    pub search: SearchConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Books API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Volumes endpoint, without query string
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value of the `maxResults` parameter
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Value of the `orderBy` parameter
    #[serde(default = "default_order_by")]
    pub order_by: String,

    /// Term searched when the query is blank
    #[serde(default = "default_term")]
    pub default_term: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_results: default_max_results(),
            order_by: default_order_by(),
            default_term: default_term(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.googleapis.com/books/v1/volumes".to_string()
}

fn default_max_results() -> u32 {
    30
}

fn default_order_by() -> String {
    "newest".to_string()
}

fn default_term() -> String {
    DEFAULT_SEARCH_TERM.to_string()
}

/// HTTP transport configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Overrides the `booklisting/<version>` user agent
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            user_agent: None,
        }
    }
}

fn default_connect_timeout() -> u64 {
    15
}

fn default_read_timeout() -> u64 {
    10
}

/// Search behaviour configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a search is issued
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default)]
    pub malformed_items: MalformedItemPolicy,
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            malformed_items: MalformedItemPolicy::default(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    build_config(Some(path))
}

/// Get the configuration from environment variables and defaults
pub fn get_config() -> Result<Config, config::ConfigError> {
    build_config(None)
}

fn build_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    builder
        .add_source(
            config::Environment::with_prefix("BOOKLISTING")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// Look for `booklisting.toml` in the working directory, then in
/// `<config dir>/booklisting/config.toml`
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("booklisting.toml");
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("booklisting").join("config.toml"))
        .filter(|path| path.is_file())
}

impl Config {
    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
