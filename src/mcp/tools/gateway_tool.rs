//! MCP tool backed by a gateway descriptor
//!
//! One instance per registered tool. Execution goes through the same
//! `Gateway::invoke` path as the REST adapter; only the result shape
//! differs.

use super::handler::{error_content, success_content, CallContext, McpToolHandler};
use crate::core::dispatch::{Gateway, ToolDescriptor};
use crate::core::error::{FailureEnvelope, GatewayError};
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

pub struct GatewayTool {
    gateway: Arc<Gateway>,
    name: &'static str,
    schema: ToolSchema,
}

impl GatewayTool {
    pub fn new(gateway: Arc<Gateway>, descriptor: &ToolDescriptor) -> Self {
        let schema = ToolSchema {
            name: descriptor.name.to_string(),
            description: descriptor.description.to_string(),
            input_schema: descriptor.schema.to_json_schema(),
        };
        Self {
            gateway,
            name: descriptor.name,
            schema,
        }
    }

    /// One handler for every descriptor the gateway holds
    pub fn all(gateway: &Arc<Gateway>) -> Vec<Self> {
        gateway
            .descriptors()
            .iter()
            .map(|d| Self::new(Arc::clone(gateway), d))
            .collect()
    }
}

#[async_trait]
impl McpToolHandler for GatewayTool {
    fn name(&self) -> &str {
        self.name
    }

    fn schema(&self) -> ToolSchema {
        self.schema.clone()
    }

    async fn execute(
        &self,
        args: Map<String, Value>,
        ctx: &CallContext,
    ) -> Result<ToolResult, McpError> {
        match self
            .gateway
            .invoke(self.name, ctx.presented_token(), &args)
            .await
        {
            Ok(output) => Ok(success_content(
                output.to_text(),
                serde_json::to_value(&output)?,
            )),
            Err(GatewayError::UnknownTool(name)) => Err(GatewayError::UnknownTool(name).into()),
            Err(e) => Ok(error_content(FailureEnvelope::from(&e))),
        }
    }
}
