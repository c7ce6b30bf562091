//! Tool dispatcher
//!
//! Every call, from either adapter, goes through [`Gateway::invoke`]:
//! authorize, look up the descriptor, validate arguments, check
//! availability, then run the provider. Failures of any kind come back
//! as a [`GatewayError`].

use crate::core::auth::{authorize, AuthContext, AuthDecision};
use crate::core::config::Config;
use crate::core::error::{GatewayError, Result, ToolgateError};
use crate::core::providers::ProviderError;
use crate::core::schema::{RequestSchema, ToolArgs};
use crate::core::types::ToolOutput;
use async_trait::async_trait;
use futures::FutureExt;
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Runs one tool against its provider with validated arguments
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn invoke(&self, args: ToolArgs) -> std::result::Result<ToolOutput, GatewayError>;
}

/// Precondition checked before a provider is invoked
///
/// Returns the message reported to the caller when the tool is
/// unavailable.
pub type Availability = fn(&Config) -> std::result::Result<(), String>;

/// Everything the gateway knows about one tool
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: RequestSchema,
    availability: Option<Availability>,
    invoker: Arc<dyn ToolInvoker>,
}

impl ToolDescriptor {
    pub fn new(
        name: &'static str,
        description: &'static str,
        schema: RequestSchema,
        invoker: Arc<dyn ToolInvoker>,
    ) -> Self {
        Self {
            name,
            description,
            schema,
            availability: None,
            invoker,
        }
    }

    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = Some(availability);
        self
    }

    /// Check the availability predicate against `config`
    pub fn check_available(&self, config: &Config) -> std::result::Result<(), GatewayError> {
        match self.availability {
            Some(check) => check(config).map_err(GatewayError::ServiceUnavailable),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("gated", &self.availability.is_some())
            .finish()
    }
}

impl From<ProviderError> for GatewayError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => GatewayError::ServiceUnavailable(msg),
            other => GatewayError::Provider(other.to_string()),
        }
    }
}

/// Immutable registry of tool descriptors plus the configuration the
/// guard and availability checks read
pub struct Gateway {
    config: Arc<Config>,
    tools: Vec<ToolDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl Gateway {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool; a second registration under the same name fails
    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<()> {
        if self.index.contains_key(descriptor.name) {
            return Err(ToolgateError::RegistryError(format!(
                "Tool '{}' is already registered",
                descriptor.name
            )));
        }
        self.index.insert(descriptor.name, self.tools.len());
        self.tools.push(descriptor);
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Descriptors in registration order
    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn authorize(&self, presented: Option<&str>) -> std::result::Result<(), GatewayError> {
        let ctx = AuthContext::new(presented, self.config.auth.bearer_token.as_deref());
        match authorize(ctx) {
            AuthDecision::Allow => Ok(()),
            AuthDecision::Deny(reason) => Err(GatewayError::Authorization(reason)),
        }
    }

    /// Run the named tool on behalf of a caller
    pub async fn invoke(
        &self,
        name: &str,
        presented: Option<&str>,
        raw: &Map<String, Value>,
    ) -> std::result::Result<ToolOutput, GatewayError> {
        let start = Instant::now();
        let outcome = self.invoke_inner(name, presented, raw).await;
        let duration_ms = start.elapsed().as_millis();

        match &outcome {
            Ok(_) => debug!(tool = %name, duration_ms = %duration_ms, "Tool call succeeded"),
            Err(e) => warn!(
                tool = %name,
                kind = e.kind().as_str(),
                duration_ms = %duration_ms,
                error = %e,
                "Tool call failed"
            ),
        }

        outcome
    }

    async fn invoke_inner(
        &self,
        name: &str,
        presented: Option<&str>,
        raw: &Map<String, Value>,
    ) -> std::result::Result<ToolOutput, GatewayError> {
        self.authorize(presented)?;

        let descriptor = self
            .get(name)
            .ok_or_else(|| GatewayError::UnknownTool(name.to_string()))?;

        let args = descriptor.schema.validate(raw)?;
        descriptor.check_available(&self.config)?;

        let invocation = AssertUnwindSafe(descriptor.invoker.invoke(args)).catch_unwind();
        let output = match invocation.await {
            Ok(result) => result?,
            Err(payload) => return Err(GatewayError::Provider(panic_message(payload))),
        };

        Ok(match output {
            ToolOutput::Results(records) => {
                ToolOutput::Results(records.into_iter().map(|r| r.mirrored()).collect())
            }
            other => other,
        })
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("Provider failed unexpectedly: {detail}")
}
