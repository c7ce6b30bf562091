//! Tool handler trait and common types

use crate::core::auth::parse_bearer;
use crate::core::error::FailureEnvelope;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ContentBlock, ToolResult, ToolSchema};
use async_trait::async_trait;
use serde_json::{json, Map, Value};

/// Per-request context handed to tool handlers
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    /// Raw `Authorization` value, from the HTTP header or `_meta`
    pub authorization: Option<String>,
}

impl CallContext {
    pub fn with_authorization(authorization: Option<String>) -> Self {
        Self { authorization }
    }

    /// Bearer token presented by the caller, if any
    pub fn presented_token(&self) -> Option<&str> {
        parse_bearer(self.authorization.as_deref())
    }
}

/// Trait for MCP tool implementations
#[async_trait]
pub trait McpToolHandler: Send + Sync {
    /// Tool name (e.g., "calc-evaluate")
    fn name(&self) -> &str;

    /// Tool schema for tools/list
    fn schema(&self) -> ToolSchema;

    /// Execute tool with arguments
    async fn execute(
        &self,
        args: Map<String, Value>,
        ctx: &CallContext,
    ) -> Result<ToolResult, McpError>;
}

/// Successful result: the payload as text and as structured content
pub fn success_content(text: String, result: Value) -> ToolResult {
    ToolResult {
        content: vec![ContentBlock::Text { text }],
        structured_content: Some(json!({ "result": result })),
        is_error: false,
    }
}

/// Failed result carrying the failure kind and message
///
/// MCP has no status codes, so the envelope's status is dropped.
pub fn error_content(failure: FailureEnvelope) -> ToolResult {
    ToolResult {
        content: vec![ContentBlock::Text {
            text: failure.message.clone(),
        }],
        structured_content: Some(json!({ "kind": failure.kind, "message": failure.message })),
        is_error: true,
    }
}
