//! MCP (Model Context Protocol) adapter
//!
//! A JSON-RPC 2.0 MCP server exposing the gateway's tools over three
//! transports: stdio, streamable HTTP and SSE. Depends on core/ for
//! everything tool-related.

pub mod error;
pub mod handlers;
pub mod http;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

// Re-export main types
pub use error::McpError;
pub use handlers::ProtocolHandlers;
pub use server::McpServer;
pub use tools::{CallContext, McpToolHandler, ToolRegistry};
