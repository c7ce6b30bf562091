//! toolgate - authenticated tool gateway for AI agents
//!
//! Exposes web search (Google, SearXNG), webpage extraction and a
//! restricted calculator as named tools over a REST API and the Model
//! Context Protocol.
//!
//! # Architecture
//!
//! - **core**: Domain logic (protocol-agnostic)
//!   - config, error, types
//!   - auth (bearer token guard), schema (argument validation)
//!   - providers (search, extraction, calculator)
//!   - dispatch, tools (the gateway and its six tools)
//!   - services (unified service container)
//!
//! - **http**: REST adapter (depends on core)
//!   - handlers, middleware, OpenAPI document
//!
//! - **mcp**: MCP adapter (depends on core)
//!   - protocol, handlers, stdio server, HTTP/SSE transports
//!
//! - **cli**: flag parsing, logging setup and server start-up

// Core domain logic (protocol-agnostic)
pub mod core;

// Command-line entry point
pub mod cli;

// HTTP REST adapter
pub mod http;

// MCP (Model Context Protocol) adapter
pub mod mcp;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{GatewayError, Result, ToolgateError};
pub use core::services::Services;
pub use core::types::*;
