//! Command-line entry point for toolgate
//!
//! Parses flags, loads configuration, sets up logging and starts the
//! selected server. Parallel to `http/` and `mcp/`; it only wires them
//! together.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::config::Config;
use crate::core::error::{Result, ToolgateError};
use crate::core::services::Services;
use crate::mcp::{self, McpServer};

/// Authenticated tool gateway: web search, webpage extraction and a
/// calculator over REST and MCP
#[derive(Parser, Debug)]
#[command(name = "toolgate")]
#[command(version)]
#[command(about = "Tool gateway for AI agents (REST and MCP)", long_about = None)]
pub struct Cli {
    /// Host to bind the server to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind the server to
    #[arg(long)]
    pub port: Option<u16>,

    /// Server mode
    #[arg(long, value_enum, default_value_t = Mode::Openapi)]
    pub mode: Mode,

    /// MCP transport, used with --mode mcp
    #[arg(long, value_enum, default_value_t = McpMode::StreamableHttp)]
    pub mcp_mode: McpMode,

    /// Path to a TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// REST API with an OpenAPI document
    Openapi,
    /// Model Context Protocol server
    Mcp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum McpMode {
    StreamableHttp,
    Sse,
    Stdio,
}

impl Cli {
    /// stdout belongs to the protocol in stdio mode
    pub fn uses_stdio(&self) -> bool {
        self.mode == Mode::Mcp && self.mcp_mode == McpMode::Stdio
    }

    /// Apply --host/--port on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

/// Initialize tracing
///
/// In stdio mode everything goes to stderr without ANSI codes.
/// `TOOLGATE_LOG_FORMAT=json` switches to JSON lines.
pub fn init_logging(stdio: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "toolgate=info,tower_http=info".into());
    let json = std::env::var("TOOLGATE_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    match (json, stdio) {
        (true, _) => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        (false, true) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr) // Critical: stderr not stdout
                    .with_ansi(false)
                    .compact(),
            )
            .init(),
        (false, false) => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Run the selected server until it exits
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    tracing::info!("Starting toolgate {}", env!("CARGO_PKG_VERSION"));
    config.log_config();

    let services = Arc::new(Services::new(config.clone())?);

    let app = match (cli.mode, cli.mcp_mode) {
        (Mode::Mcp, McpMode::Stdio) => {
            return McpServer::new(services)
                .run()
                .await
                .map_err(|e| ToolgateError::ServerError(format!("MCP server error: {e}")));
        }
        (Mode::Openapi, _) => crate::http::router(services),
        (Mode::Mcp, McpMode::StreamableHttp) => mcp::http::streamable_router(services),
        (Mode::Mcp, McpMode::Sse) => mcp::http::sse_router(services),
    };

    serve(app, &config, cli.mode, cli.mcp_mode).await
}

async fn serve(app: Router, config: &Config, mode: Mode, mcp_mode: McpMode) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local: SocketAddr = listener.local_addr()?;

    tracing::info!("Listening on {}", local);
    match mode {
        Mode::Openapi => {
            tracing::info!("Service ready - OpenAPI document at http://{}/openapi.json", local)
        }
        Mode::Mcp => match mcp_mode {
            McpMode::Sse => tracing::info!("MCP ready - SSE stream at http://{}/sse", local),
            _ => tracing::info!("MCP ready - endpoint at http://{}/mcp", local),
        },
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Received shutdown signal");
        })
        .await?;

    Ok(())
}
