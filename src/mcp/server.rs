//! MCP server over stdio

use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::handlers::ProtocolHandlers;
use crate::mcp::tools::CallContext;
use crate::mcp::transport::StdioTransport;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, BufReader};
use tracing::{debug, info};

pub struct McpServer {
    handlers: Arc<ProtocolHandlers>,
}

impl McpServer {
    pub fn new(services: Arc<Services>) -> Self {
        Self {
            handlers: Arc::new(ProtocolHandlers::new(services)),
        }
    }

    /// Run the MCP server on stdin/stdout until EOF or Ctrl+C
    pub async fn run(&self) -> Result<(), McpError> {
        info!("Starting toolgate MCP server (stdio)");

        let reader = BufReader::new(tokio::io::stdin());
        let mut transport = StdioTransport::new();

        tokio::select! {
            result = self.serve(reader, &mut transport) => result?,
            _ = tokio::signal::ctrl_c() => info!("Received shutdown signal"),
        }

        info!("MCP server shutting down");
        Ok(())
    }

    /// Serve newline-delimited requests from `reader` until EOF
    pub async fn serve<R, W>(
        &self,
        reader: R,
        transport: &mut StdioTransport<W>,
    ) -> Result<(), McpError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        // No transport headers on stdio; credentials travel in _meta
        let ctx = CallContext::default();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            debug!("Received: {}", line);

            if let Some(response) = self.handlers.handle_message(&line, &ctx).await {
                transport.send_response(&response).await?;
            }
        }

        Ok(())
    }
}
