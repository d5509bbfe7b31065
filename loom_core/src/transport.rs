use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader as AsyncBufReader,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::mcp_server::{parse_error_response, JsonRpcHandler};

pub const HTTP_BANNER: &str = "Loom Transcript MCP Server - Use /mcp endpoint";

/// Stdio transport for MCP server
pub struct StdioTransport {
    handler: Arc<JsonRpcHandler>,
}

impl StdioTransport {
    pub fn new(handler: Arc<JsonRpcHandler>) -> Self {
        Self { handler }
    }

    /// Run the stdio transport, reading from stdin and writing to stdout
    pub async fn run(&self) -> io::Result<()> {
        info!("Starting stdio transport");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve newline-delimited JSON-RPC from `reader` until EOF, one response
    /// line per request written to `writer`.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> io::Result<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        // Spawn a task to read lines
        tokio::spawn(async move {
            let mut reader = AsyncBufReader::new(reader);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        debug!("EOF reached on input");
                        break;
                    }
                    Ok(_) => {
                        if !line.trim().is_empty() {
                            if let Err(e) = tx.send(line.clone()) {
                                error!("Failed to send line: {}", e);
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        error!("Error reading input: {}", e);
                        break;
                    }
                }
            }
        });

        while let Some(line) = rx.recv().await {
            if let Err(e) = self.process_line(&line, &mut writer).await {
                error!("Error processing line: {}", e);
                if e.kind() == io::ErrorKind::BrokenPipe {
                    break;
                }
            }
        }

        Ok(())
    }

    async fn process_line<W: AsyncWrite + Unpin>(
        &self,
        line: &str,
        writer: &mut W,
    ) -> io::Result<()> {
        debug!("Processing line: {}", line.trim_end());

        let response = match serde_json::from_str::<Value>(line) {
            Ok(request) => self.handler.handle_request(request).await,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                Some(parse_error_response(e))
            }
        };

        match response {
            Some(response) => write_response(writer, &response).await,
            None => Ok(()),
        }
    }
}

async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &Value) -> io::Result<()> {
    let response_str = serde_json::to_string(response)?;

    writer.write_all(response_str.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;

    debug!("Sent response: {}", response_str);
    Ok(())
}

/// Streamable-HTTP style transport: one JSON-RPC message per `POST /mcp`.
pub struct HttpTransport {
    handler: Arc<JsonRpcHandler>,
}

impl HttpTransport {
    pub fn new(handler: Arc<JsonRpcHandler>) -> Self {
        Self { handler }
    }

    pub fn router(&self) -> Router {
        router(self.handler.clone())
    }

    /// Bind `addr` and serve until the listener fails.
    pub async fn run(&self, addr: SocketAddr) -> io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    pub async fn serve(&self, listener: TcpListener) -> io::Result<()> {
        info!(addr = ?listener.local_addr().ok(), "Starting HTTP transport");
        axum::serve(listener, self.router()).await
    }
}

/// `POST /mcp` for JSON-RPC. Other methods on `/mcp` get `405`; every other
/// path gets the plaintext banner.
pub fn router(handler: Arc<JsonRpcHandler>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp).fallback(method_not_allowed))
        .fallback(banner)
        .with_state(handler)
}

async fn handle_mcp(State(handler): State<Arc<JsonRpcHandler>>, body: Bytes) -> Response {
    let request = match serde_json::from_slice::<Value>(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Failed to parse JSON-RPC request: {}", e);
            return (StatusCode::BAD_REQUEST, Json(parse_error_response(e))).into_response();
        }
    };

    match handler.handle_request(request).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

// No server-initiated stream is offered on GET.
async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "POST")])
}

async fn banner() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        HTTP_BANNER,
    )
}
