//! MCP tool implementations
//!
//! Every tool is a thin [`GatewayTool`] over a gateway descriptor, so
//! the MCP surface always matches the REST one.

pub mod gateway_tool;
pub mod handler;
pub mod registry;

pub use gateway_tool::GatewayTool;
pub use handler::{error_content, success_content, CallContext, McpToolHandler};
pub use registry::ToolRegistry;
