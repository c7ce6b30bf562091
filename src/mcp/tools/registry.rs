//! Tool registry for managing MCP tools

use super::handler::McpToolHandler;
use crate::mcp::protocol::ToolSchema;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry for all available MCP tools
///
/// Lookup is by name; listing follows registration order.
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn McpToolHandler>>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool handler, replacing any handler with the same name
    pub fn register(&mut self, handler: Arc<dyn McpToolHandler>) {
        let name = handler.name().to_string();
        if self.handlers.insert(name.clone(), handler).is_none() {
            self.order.push(name);
        }
    }

    /// Get a tool handler by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn McpToolHandler>> {
        self.handlers.get(name)
    }

    /// List all available tool schemas
    pub fn list(&self) -> Vec<ToolSchema> {
        self.order
            .iter()
            .filter_map(|name| self.handlers.get(name))
            .map(|handler| handler.schema())
            .collect()
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Get number of registered tools
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
