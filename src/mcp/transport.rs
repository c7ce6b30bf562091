//! Stdio transport for MCP protocol

use crate::mcp::error::McpError;
use crate::mcp::protocol::JsonRpcResponse;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::debug;

/// Newline-delimited JSON-RPC writer
///
/// Generic over the sink so tests can capture output in memory.
pub struct StdioTransport<W: AsyncWrite + Unpin = tokio::io::Stdout> {
    writer: BufWriter<W>,
}

impl StdioTransport {
    pub fn new() -> Self {
        Self::with_writer(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin> StdioTransport<W> {
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Send JSON-RPC response as one line
    pub async fn send_response(&mut self, response: &JsonRpcResponse) -> Result<(), McpError> {
        let json = serde_json::to_string(response)?;
        debug!("Sending: {}", json);

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}
