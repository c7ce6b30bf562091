//! SearXNG web search provider
//!
//! Uses the instance's JSON API (`/search?format=json`). The instance
//! must have the json output format enabled.

use super::{
    default_timeout, effective_timeout, http_client, read_body_capped, ProviderError, WebSearch,
};
use crate::core::config::{FetchConfig, SearchConfig};
use crate::core::types::SearchResultRecord;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearxngHit>,
}

#[derive(Debug, Deserialize)]
struct SearxngHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: Option<String>,
}

pub struct SearxngSearch {
    client: reqwest::Client,
    default_timeout: Duration,
    max_body_bytes: usize,
    base_url: Option<String>,
}

impl SearxngSearch {
    pub fn new(config: &SearchConfig, fetch: &FetchConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(&config.user_agent)?,
            default_timeout: default_timeout(fetch)?,
            max_body_bytes: fetch.max_body_bytes,
            base_url: config.searxng_base_url.clone(),
        })
    }
}

#[async_trait]
impl WebSearch for SearxngSearch {
    fn name(&self) -> &str {
        "searxng"
    }

    async fn search(
        &self,
        query: &str,
        number_results: usize,
        timeout: Option<Duration>,
    ) -> Result<Vec<SearchResultRecord>, ProviderError> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("SEARXNG_BASE_URL".to_string()))?;
        let url = format!("{base_url}/search");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("categories", "general")])
            .timeout(effective_timeout(timeout, self.default_timeout))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = read_body_capped(response, self.max_body_bytes).await?;
        let results = parse_results(&body, number_results)?;
        debug!(query = %query, count = results.len(), "SearXNG search completed");
        Ok(results)
    }
}

/// Map a SearXNG JSON response into records, keeping backend order
pub(crate) fn parse_results(
    body: &str,
    limit: usize,
) -> Result<Vec<SearchResultRecord>, ProviderError> {
    let response: SearxngResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    Ok(response
        .results
        .into_iter()
        .filter(|hit| !hit.url.is_empty())
        .take(limit)
        .map(|hit| {
            SearchResultRecord::new(
                hit.title.trim(),
                hit.url,
                hit.content.unwrap_or_default().trim(),
            )
        })
        .collect())
}
