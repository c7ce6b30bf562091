//! Google web search provider
//!
//! Requests the basic HTML results page that Google serves to text
//! browsers and scrapes result blocks from it.

use super::html::{decode_entities, inline_text};
use super::{
    default_timeout, effective_timeout, http_client, read_body_capped, ProviderError, WebSearch,
};
use crate::core::config::{FetchConfig, SearchConfig};
use crate::core::types::SearchResultRecord;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

static RESULT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<div[^>]*class="[^"]*\bezO2md\b[^"]*"[^>]*>"#).unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<a[^>]*\bhref="([^"]+)""#).unwrap());
static TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<span[^>]*class="[^"]*\bCVA68e\b[^"]*"[^>]*>(.*?)</span>"#).unwrap()
});
static DESCRIPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<span[^>]*class="[^"]*\bFrIlee\b[^"]*"[^>]*>(.*?)</span>"#).unwrap()
});

pub struct GoogleSearch {
    client: reqwest::Client,
    default_timeout: Duration,
    max_body_bytes: usize,
    base_url: String,
}

impl GoogleSearch {
    pub fn new(config: &SearchConfig, fetch: &FetchConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(&config.user_agent)?,
            default_timeout: default_timeout(fetch)?,
            max_body_bytes: fetch.max_body_bytes,
            base_url: config.google_base_url.clone(),
        })
    }
}

#[async_trait]
impl WebSearch for GoogleSearch {
    fn name(&self) -> &str {
        "google"
    }

    async fn search(
        &self,
        query: &str,
        number_results: usize,
        timeout: Option<Duration>,
    ) -> Result<Vec<SearchResultRecord>, ProviderError> {
        let url = format!("{}/search", self.base_url);
        let num = number_results.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("num", num.as_str()), ("hl", "en")])
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
        let results = parse_results(&self.base_url, &body, number_results);
        debug!(query = %query, count = results.len(), "Google search completed");
        Ok(results)
    }
}

/// Resolve a result href to the target URL
///
/// Google wraps outbound links as `/url?q=<target>&...`.
fn resolve_href(base_url: &str, href: &str) -> Option<String> {
    let href = decode_entities(href);

    let target = match Url::parse(&href) {
        Ok(absolute) => absolute,
        Err(_) => {
            // Relative links point back into Google; only redirects count
            let redirect = Url::parse(base_url).ok()?.join(&href).ok()?;
            if redirect.path() != "/url" {
                return None;
            }
            let q = redirect
                .query_pairs()
                .find(|(key, _)| key == "q" || key == "url")
                .map(|(_, value)| value.into_owned())?;
            Url::parse(&q).ok()?
        }
    };

    match target.scheme() {
        "http" | "https" => Some(target.to_string()),
        _ => None,
    }
}

/// Extract up to `limit` records from a results page, in page order
pub(crate) fn parse_results(base_url: &str, html: &str, limit: usize) -> Vec<SearchResultRecord> {
    let starts: Vec<usize> = RESULT_BLOCK.find_iter(html).map(|m| m.start()).collect();
    let mut results = Vec::new();

    for (i, &start) in starts.iter().enumerate() {
        if results.len() >= limit {
            break;
        }
        let end = starts.get(i + 1).copied().unwrap_or(html.len());
        let block = &html[start..end];

        let Some(url) = LINK
            .captures(block)
            .and_then(|c| resolve_href(base_url, &c[1]))
        else {
            continue;
        };
        let title = TITLE
            .captures(block)
            .map(|c| inline_text(&c[1]))
            .unwrap_or_default();
        if title.is_empty() {
            continue;
        }
        let description = DESCRIPTION
            .captures(block)
            .map(|c| inline_text(&c[1]))
            .unwrap_or_default();

        results.push(SearchResultRecord::new(title, url, description));
    }

    results
}
