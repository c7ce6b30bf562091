//! MCP protocol method handlers
//!
//! Shared by every transport: stdio, streamable HTTP and SSE all feed
//! raw messages into [`ProtocolHandlers::handle_message`].

use crate::core::dispatch::Gateway;
use crate::core::error::FailureEnvelope;
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::*;
use crate::mcp::tools::{error_content, CallContext, GatewayTool, ToolRegistry};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ProtocolHandlers {
    initialized: AtomicBool,
    gateway: Arc<Gateway>,
    tool_registry: ToolRegistry,
}

impl ProtocolHandlers {
    pub fn new(services: Arc<Services>) -> Self {
        let mut registry = ToolRegistry::new();
        for tool in GatewayTool::all(&services.gateway) {
            registry.register(Arc::new(tool));
        }

        Self {
            initialized: AtomicBool::new(false),
            gateway: Arc::clone(&services.gateway),
            tool_registry: registry,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    /// Handle one raw JSON-RPC message
    ///
    /// Returns `None` when nothing should be sent back (notifications
    /// and stray client responses).
    pub async fn handle_message(&self, raw: &str, ctx: &CallContext) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => self.handle_value(value, ctx).await,
            Err(e) => Some(McpError::ParseError(e.to_string()).into_response(None)),
        }
    }

    /// Handle one already-decoded JSON-RPC message
    pub async fn handle_value(&self, value: Value, ctx: &CallContext) -> Option<JsonRpcResponse> {
        let Value::Object(fields) = &value else {
            return Some(
                McpError::InvalidRequest("message must be a JSON object".to_string())
                    .into_response(None),
            );
        };

        // Responses to server-initiated requests; this server sends none
        if !fields.contains_key("method")
            && (fields.contains_key("result") || fields.contains_key("error"))
        {
            debug!("Ignoring client response message");
            return None;
        }

        let id = fields.get("id").cloned();
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request, ctx).await,
            Err(e) => Some(McpError::InvalidRequest(e.to_string()).into_response(id)),
        }
    }

    /// Route a request to its method handler
    pub async fn handle_request(
        &self,
        request: JsonRpcRequest,
        ctx: &CallContext,
    ) -> Option<JsonRpcResponse> {
        let id = request.id.clone();

        if request.jsonrpc != "2.0" {
            let message = format!("unsupported jsonrpc version '{}'", request.jsonrpc);
            return Some(McpError::InvalidRequest(message).into_response(id));
        }

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }

        let outcome = match request.method.as_str() {
            "initialize" => self.handle_initialize(request).await,
            "ping" => self.handle_ping(request).await,
            "tools/list" => self.handle_tools_list(request).await,
            "tools/call" => self.handle_tools_call(request, ctx).await,
            other => Err(McpError::MethodNotFound(other.to_string())),
        };

        Some(outcome.unwrap_or_else(|e| e.into_response(id)))
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" | "initialized" => {
                self.initialized.store(true, Ordering::SeqCst);
                info!("Client initialized");
            }
            other => debug!(method = %other, "Ignoring notification"),
        }
    }

    /// Handle initialize request
    pub async fn handle_initialize(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let params: InitializeParams =
            serde_json::from_value(request.params.unwrap_or_else(|| json!({})))
                .map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let version = negotiate_version(params.protocol_version.as_deref());
        match &params.client_info {
            Some(client) => info!(client = %client.name, protocol = %version, "Initialize"),
            None => info!(protocol = %version, "Initialize"),
        }

        let result = InitializeResult {
            protocol_version: version.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Web search (Google, SearXNG), webpage extraction and a calculator.".to_string(),
            ),
        };

        Ok(JsonRpcResponse::success(
            request.id,
            serde_json::to_value(result)?,
        ))
    }

    /// Handle tools/list request
    pub async fn handle_tools_list(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let tools = self.tool_registry.list();
        Ok(JsonRpcResponse::success(
            request.id,
            json!({ "tools": tools }),
        ))
    }

    /// Handle tools/call request
    ///
    /// The guard runs first, so an unauthenticated caller gets a denial
    /// whatever it asked for. Gateway failures come back as `isError`
    /// results; only a missing tool or malformed params are protocol
    /// errors.
    pub async fn handle_tools_call(
        &self,
        request: JsonRpcRequest,
        ctx: &CallContext,
    ) -> Result<JsonRpcResponse, McpError> {
        let params_value = request
            .params
            .ok_or_else(|| McpError::InvalidParams("Missing params".to_string()))?;

        let params: ToolCallParams = serde_json::from_value(params_value)
            .map_err(|e| McpError::InvalidParams(format!("Invalid params: {e}")))?;

        // The transport's header wins over a credential in _meta
        let call_ctx = match (&ctx.authorization, params.meta) {
            (Some(_), _) | (None, None) => ctx.clone(),
            (None, Some(meta)) => CallContext::with_authorization(meta.authorization),
        };

        if let Err(denied) = self.gateway.authorize(call_ctx.presented_token()) {
            let result = error_content(FailureEnvelope::from(&denied));
            return Ok(JsonRpcResponse::success(
                request.id,
                serde_json::to_value(result)?,
            ));
        }

        let args: Map<String, Value> = match params.arguments {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(McpError::InvalidParams(
                    "arguments must be an object".to_string(),
                ))
            }
        };

        let handler = self
            .tool_registry
            .get(&params.name)
            .ok_or_else(|| McpError::InvalidParams(format!("Unknown tool: {}", params.name)))?;

        let result = handler.execute(args, &call_ctx).await?;
        Ok(JsonRpcResponse::success(
            request.id,
            serde_json::to_value(result)?,
        ))
    }

    /// Handle ping request
    pub async fn handle_ping(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpError> {
        Ok(JsonRpcResponse::success(request.id, json!({})))
    }
}
