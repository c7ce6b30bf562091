//! Webpage content extraction provider

use super::html::{html_to_text, truncate_chars};
use super::{
    default_timeout, effective_timeout, http_client, read_body_capped, PageExtractor, ProviderError,
};
use crate::core::config::FetchConfig;
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

pub struct WebpageExtractor {
    client: reqwest::Client,
    default_timeout: Duration,
    max_content_chars: usize,
    max_body_bytes: usize,
}

impl WebpageExtractor {
    pub fn new(config: &FetchConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(&config.user_agent)?,
            default_timeout: default_timeout(config)?,
            max_content_chars: config.max_content_chars,
            max_body_bytes: config.max_body_bytes,
        })
    }
}

/// Only absolute http(s) URLs are fetched
fn parse_target(url: &str) -> Result<Url, ProviderError> {
    let parsed = Url::parse(url.trim()).map_err(|_| ProviderError::InvalidUrl(url.to_string()))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        _ => Err(ProviderError::InvalidUrl(url.to_string())),
    }
}

/// Turn a fetched body into text according to its content type
fn body_to_text(content_type: Option<&str>, body: &str) -> String {
    let is_html = match content_type {
        Some(ct) => ct.contains("html") || ct.contains("xml"),
        None => body.trim_start().starts_with('<'),
    };
    if is_html {
        html_to_text(body)
    } else {
        body.trim().to_string()
    }
}

#[async_trait]
impl PageExtractor for WebpageExtractor {
    async fn extract(&self, url: &str, timeout: Option<Duration>) -> Result<String, ProviderError> {
        let target = parse_target(url)?;

        let response = self
            .client
            .get(target.clone())
            .timeout(effective_timeout(timeout, self.default_timeout))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                url: target.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());
        let body = read_body_capped(response, self.max_body_bytes).await?;

        let text = body_to_text(content_type.as_deref(), &body);
        debug!(url = %target, chars = text.len(), "Extracted webpage content");
        Ok(truncate_chars(text, self.max_content_chars))
    }
}
