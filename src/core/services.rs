//! Unified service container for toolgate
//!
//! Provides shared access to the configuration and the gateway. Both
//! adapters hold the same `Arc<Services>`.

use crate::core::config::Config;
use crate::core::dispatch::Gateway;
use crate::core::error::{Result, ToolgateError};
use crate::core::providers::{
    ExpressionCalculator, GoogleSearch, ProviderError, SearxngSearch, WebpageExtractor,
};
use crate::core::tools::{build_gateway, Providers};
use std::sync::Arc;

/// Unified services container
#[derive(Clone)]
pub struct Services {
    /// Application configuration
    pub config: Arc<Config>,

    /// Tool registry and dispatcher
    pub gateway: Arc<Gateway>,
}

impl Providers {
    /// Real network and local providers built from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider_err =
            |e: ProviderError| ToolgateError::ConfigError(format!("Failed to build provider: {e}"));

        let google = GoogleSearch::new(&config.search, &config.fetch).map_err(provider_err)?;
        let searxng = SearxngSearch::new(&config.search, &config.fetch).map_err(provider_err)?;
        let webpage = WebpageExtractor::new(&config.fetch).map_err(provider_err)?;

        Ok(Self {
            google: Arc::new(google),
            searxng: Arc::new(searxng),
            webpage: Arc::new(webpage),
            calculator: Arc::new(ExpressionCalculator::new()),
        })
    }
}

impl Services {
    /// Create services from configuration
    pub fn new(config: Config) -> Result<Self> {
        let providers = Providers::from_config(&config)?;
        Self::with_providers(config, providers)
    }

    /// Create services over an explicit provider set
    pub fn with_providers(config: Config, providers: Providers) -> Result<Self> {
        let config = Arc::new(config);
        let gateway = build_gateway(Arc::clone(&config), providers)?;

        Ok(Self {
            config,
            gateway: Arc::new(gateway),
        })
    }
}
