//! toolgate server binary
//!
//! ```bash
//! # REST API on 0.0.0.0:8000
//! toolgate
//!
//! # MCP over streamable HTTP, SSE or stdio
//! toolgate --mode mcp
//! toolgate --mode mcp --mcp-mode sse --port 9000
//! toolgate --mode mcp --mcp-mode stdio
//! ```

use clap::Parser;
use toolgate::cli::{init_logging, run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.uses_stdio());

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
