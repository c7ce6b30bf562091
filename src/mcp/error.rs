//! MCP-specific error types

use crate::core::error::GatewayError;
use crate::mcp::protocol::{
    JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
    PARSE_ERROR,
};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    /// JSON-RPC error code for this failure
    pub fn code(&self) -> i32 {
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::InternalError(_) | McpError::Io(_) | McpError::Json(_) => INTERNAL_ERROR,
        }
    }

    pub fn into_response(self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::error(id, self.code(), self.to_string())
    }
}

/// Only an unknown tool is a protocol fault; every other gateway
/// failure is reported inside the tool result
impl From<GatewayError> for McpError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::UnknownTool(name) => {
                McpError::InvalidParams(format!("Unknown tool: {name}"))
            }
            other => McpError::InternalError(other.to_string()),
        }
    }
}
