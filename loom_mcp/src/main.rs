use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use loom_core::{
    build_registry,
    mcp_server::{JsonRpcHandler, McpServer},
    transport::{HttpTransport, StdioTransport},
    LoomConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout
    Stdio,
    /// JSON-RPC over `POST /mcp`
    Http,
}

#[derive(Parser, Debug)]
#[command(name = "loom_mcp")]
#[command(about = "MCP server exposing Loom video transcripts and comments")]
#[command(version)]
struct Args {
    /// Transport to serve MCP on
    #[arg(long, value_enum, env = "LOOM_MCP_TRANSPORT", default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Address for the HTTP transport
    #[arg(long, env = "LOOM_MCP_BIND", default_value = "127.0.0.1:8787")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries protocol traffic in stdio mode.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Loom Transcript MCP Server");

    let config = LoomConfig::from_env();
    info!(
        graphql_url = %config.graphql_url,
        timeout_secs = config.request_timeout.as_secs(),
        "Loom client configured"
    );

    let registry = Arc::new(Mutex::new(build_registry(config)?));
    let server = McpServer::new(registry);
    let handler = Arc::new(JsonRpcHandler::new(server));

    let result = match args.transport {
        Transport::Stdio => {
            let transport = StdioTransport::new(handler);
            info!("MCP Server ready, listening on stdio");
            tokio::select! {
                res = transport.run() => res,
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, shutting down");
                    Ok(())
                }
            }
        }
        Transport::Http => {
            let transport = HttpTransport::new(handler);
            info!(bind = %args.bind, "MCP Server ready, listening on http");
            tokio::select! {
                res = transport.run(args.bind) => res,
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, shutting down");
                    Ok(())
                }
            }
        }
    };

    if let Err(e) = result {
        error!("Transport error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
