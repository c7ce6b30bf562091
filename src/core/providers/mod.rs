//! Capability providers
//!
//! The gateway only sees these traits. Concrete providers talk to
//! Google, SearXNG and arbitrary webpages over HTTP, or evaluate
//! expressions locally. Tests substitute their own implementations.

pub mod calculator;
pub mod google;
pub mod html;
pub mod searxng;
pub mod webpage;

use crate::core::config::FetchConfig;
use crate::core::types::{EvalValue, SearchResultRecord};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use calculator::ExpressionCalculator;
pub use google::GoogleSearch;
pub use searxng::SearxngSearch;
pub use webpage::WebpageExtractor;

/// Failure raised inside a provider
///
/// The gateway never forwards this type; it is flattened into a
/// caller-facing message.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("{0}")]
    Evaluation(String),

    #[error("Function '{0}' is not allowed")]
    UnknownFunction(String),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid provider configuration: {0}")]
    Config(String),
}

/// Web search backend
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Backend name used in logs
    fn name(&self) -> &str;

    /// Run a query and return at most `number_results` records in
    /// backend order
    async fn search(
        &self,
        query: &str,
        number_results: usize,
        timeout: Option<Duration>,
    ) -> Result<Vec<SearchResultRecord>, ProviderError>;
}

/// Webpage content extraction
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn extract(&self, url: &str, timeout: Option<Duration>) -> Result<String, ProviderError>;
}

/// Expression evaluation with a fixed function table
pub trait Calculator: Send + Sync {
    fn evaluate(&self, expression: &str) -> Result<EvalValue, ProviderError>;

    /// Help text for one allowed function
    fn help(&self, fn_name: &str) -> Result<String, ProviderError>;

    /// Listing of allowed functions, optionally with help text
    fn list_allowed_fns(&self, with_help: bool) -> String;
}

/// Build the shared HTTP client used by network providers
pub fn http_client(user_agent: &str) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(ProviderError::from)
}

/// Configured default timeout, or a configuration error
pub(crate) fn default_timeout(config: &FetchConfig) -> Result<Duration, ProviderError> {
    config.default_timeout().ok_or_else(|| {
        ProviderError::Config(format!(
            "default timeout of {}s is not a usable duration",
            config.default_timeout_secs
        ))
    })
}

/// Read a response body, keeping at most `limit` bytes
///
/// Reading stops once the limit is reached; the rest of the body is
/// never buffered.
pub(crate) async fn read_body_capped(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<String, ProviderError> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = limit - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Resolve the caller's timeout against the provider default
pub(crate) fn effective_timeout(timeout: Option<Duration>, default: Duration) -> Duration {
    timeout.unwrap_or(default)
}
