//! Configuration management for the toolgate server.
//!
//! Configuration is loaded once at start-up from an optional TOML file
//! and environment variables, validated, and then handed to the
//! gateway as an immutable value. Handlers never read the environment.

use crate::core::error::{Result, ToolgateError};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Hard ceiling on `number_results`, whatever the configuration says
pub const MAX_RESULTS_LIMIT: u32 = 20;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Authorization configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Expected bearer token. Unset or empty disables authorization.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

/// Web search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// SearXNG instance; the searxng tool is unavailable when unset
    #[serde(default)]
    pub searxng_base_url: Option<String>,

    /// Google endpoint root
    #[serde(default = "default_google_base_url")]
    pub google_base_url: String,

    /// Default number of results when the caller omits it
    #[serde(default = "default_results")]
    pub default_results: u32,

    /// Upper bound accepted for number_results, at most
    /// [`MAX_RESULTS_LIMIT`]
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// User agent sent to search backends
    #[serde(default = "default_search_user_agent")]
    pub user_agent: String,
}

/// Webpage fetch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Timeout applied when the caller does not supply one
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: f64,

    /// Extracted text is cut at this many characters
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,

    /// Response bodies are read up to this many bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// User agent sent when fetching pages
    #[serde(default = "default_fetch_user_agent")]
    pub user_agent: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_google_base_url() -> String {
    "https://www.google.com".to_string()
}

fn default_results() -> u32 {
    5
}

fn default_max_results() -> u32 {
    20
}

fn default_search_user_agent() -> String {
    // Google serves a parseable, script-free result page to text browsers
    "Lynx/2.8.9rel.1 libwww-FM/2.14 SSL-MM/1.4.1 GNUTLS/3.6.13".to_string()
}

fn default_timeout_secs() -> f64 {
    10.0
}

fn default_max_content_chars() -> usize {
    50_000
}

fn default_max_body_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_fetch_user_agent() -> String {
    format!(
        "Mozilla/5.0 (compatible; toolgate/{})",
        env!("CARGO_PKG_VERSION")
    )
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            searxng_base_url: None,
            google_base_url: default_google_base_url(),
            default_results: default_results(),
            max_results: default_max_results(),
            user_agent: default_search_user_agent(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: default_timeout_secs(),
            max_content_chars: default_max_content_chars(),
            max_body_bytes: default_max_body_bytes(),
            user_agent: default_fetch_user_agent(),
        }
    }
}

impl FetchConfig {
    /// Provider timeout used when the caller gives none
    ///
    /// `None` when `default_timeout_secs` is not a positive duration
    /// that `Duration` can represent.
    pub fn default_timeout(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.default_timeout_secs)
            .ok()
            .filter(|d| !d.is_zero())
    }
}

/// Treat empty strings as unset
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ToolgateError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    ///
    /// File lookup order:
    /// 1. `explicit` path (from `--config`)
    /// 2. TOOLGATE_CONFIG env var
    /// 3. XDG config file (~/.config/toolgate/config.toml)
    /// 4. ./toolgate.toml
    /// 5. Defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit {
            Self::from_file(path)?
        } else if let Some(path) = non_empty(env::var("TOOLGATE_CONFIG").ok()) {
            Self::from_file(path)?
        } else if let Some(path) = Self::xdg_config_file().filter(|p| p.exists()) {
            Self::from_file(path)?
        } else if Path::new("toolgate.toml").exists() {
            Self::from_file("toolgate.toml")?
        } else {
            Self::default()
        };

        config.merge_env();
        config.normalize();
        config.validate()?;

        Ok(config)
    }

    /// Location of the per-user config file, if a config dir exists
    pub fn xdg_config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("toolgate").join("config.toml"))
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        if let Ok(token) = env::var("API_BEARER_TOKEN") {
            self.auth.bearer_token = Some(token);
        }
        if let Ok(url) = env::var("SEARXNG_BASE_URL") {
            self.search.searxng_base_url = Some(url);
        }

        if let Ok(host) = env::var("TOOLGATE_HOST") {
            if !host.is_empty() {
                self.server.host = host;
            }
        }
        if let Ok(port) = env::var("TOOLGATE_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(url) = env::var("TOOLGATE_GOOGLE_BASE_URL") {
            if !url.is_empty() {
                self.search.google_base_url = url;
            }
        }
        if let Ok(timeout) = env::var("TOOLGATE_FETCH_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.fetch.default_timeout_secs = t;
            }
        }
    }

    /// Collapse empty optional values to `None` and strip trailing
    /// slashes from base URLs
    pub fn normalize(&mut self) {
        self.auth.bearer_token = non_empty(self.auth.bearer_token.take());
        self.search.searxng_base_url = non_empty(
            self.search
                .searxng_base_url
                .take()
                .map(|url| url.trim().trim_end_matches('/').to_string()),
        );
        self.search.google_base_url = self
            .search
            .google_base_url
            .trim()
            .trim_end_matches('/')
            .to_string();
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.search.max_results == 0 || self.search.max_results > MAX_RESULTS_LIMIT {
            return Err(ToolgateError::ConfigError(format!(
                "Max results must be between 1 and {MAX_RESULTS_LIMIT}"
            )));
        }

        if self.search.default_results == 0 || self.search.default_results > self.search.max_results
        {
            return Err(ToolgateError::ConfigError(
                "Default results must be between 1 and max results".to_string(),
            ));
        }

        if self.search.google_base_url.is_empty() {
            return Err(ToolgateError::ConfigError(
                "Google base URL must not be empty".to_string(),
            ));
        }

        if self.fetch.default_timeout().is_none() {
            return Err(ToolgateError::ConfigError(
                "Default fetch timeout must be a positive number of seconds".to_string(),
            ));
        }

        if self.fetch.max_content_chars == 0 {
            return Err(ToolgateError::ConfigError(
                "Max content chars must be non-zero".to_string(),
            ));
        }

        if self.fetch.max_body_bytes == 0 {
            return Err(ToolgateError::ConfigError(
                "Max body bytes must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether a bearer token is required on tool calls
    pub fn auth_enabled(&self) -> bool {
        self.auth
            .bearer_token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    /// Log configuration (redacting sensitive values)
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Bind: {}:{}", self.server.host, self.server.port);
        if self.auth_enabled() {
            tracing::info!("  Auth: bearer token required");
        } else {
            tracing::warn!("  Auth: disabled (API_BEARER_TOKEN not set)");
        }
        match &self.search.searxng_base_url {
            Some(url) => tracing::info!("  SearXNG: {}", url),
            None => tracing::info!("  SearXNG: not configured"),
        }
        tracing::info!("  Google: {}", self.search.google_base_url);
        tracing::info!(
            "  Results: default {}, max {}",
            self.search.default_results,
            self.search.max_results
        );
        tracing::info!("  Fetch timeout: {}s", self.fetch.default_timeout_secs);
        tracing::info!("  Max content: {} chars", self.fetch.max_content_chars);
    }
}
