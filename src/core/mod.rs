//! Core domain logic (protocol-agnostic)
//!
//! This module contains all logic that is independent of transport
//! protocols (REST, MCP).
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Result shapes and response bodies
//! - **auth**: Bearer token guard
//! - **schema**: Argument validation and JSON Schema rendering
//! - **providers**: Search, extraction and calculator backends
//! - **dispatch**: Tool descriptors and the gateway
//! - **tools**: The six registered tools
//! - **services**: Unified service container

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod providers;
pub mod schema;
pub mod services;
pub mod tools;
pub mod types;

// Re-export key types for convenience
pub use config::Config;
pub use dispatch::{Gateway, ToolDescriptor};
pub use error::{GatewayError, Result, ToolgateError};
pub use services::Services;
