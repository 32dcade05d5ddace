use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::handlers;
use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::upstream::CoinGeckoApi;

/// Maximum bytes per JSON-RPC message (1 MiB).
pub const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Pause after a failed `accept` (e.g. EMFILE) before trying again.
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// MCP server speaking newline-delimited JSON-RPC 2.0 over stdio or TCP.
#[derive(Clone)]
pub struct McpServer {
    api: Arc<dyn CoinGeckoApi>,
}

impl McpServer {
    pub fn new(api: Arc<dyn CoinGeckoApi>) -> Self {
        Self { api }
    }

    /// Serve a single session on the process's stdin/stdout.
    pub async fn run_stdio(&self) -> Result<(), BoxError> {
        tracing::info!("serving MCP over stdio");
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        serve_session(reader, writer, Arc::clone(&self.api)).await
    }

    /// Bind `addr` and serve every accepted connection as its own session.
    ///
    /// Only a bind failure is returned; per-connection failures are logged.
    pub async fn run_tcp(&self, addr: SocketAddr) -> Result<(), BoxError> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("serving MCP over tcp on {}", listener.local_addr()?);
        self.accept_loop(listener).await
    }

    /// Accept connections on an already-bound listener.
    pub async fn accept_loop(&self, listener: TcpListener) -> Result<(), BoxError> {
        loop {
            let (stream, peer) = accept_with_backoff(|| listener.accept()).await;
            tracing::info!(%peer, "client connected");

            let api = Arc::clone(&self.api);
            tokio::spawn(async move {
                let (read_half, write_half) = stream.into_split();
                match serve_session(BufReader::new(read_half), write_half, api).await {
                    Ok(()) => tracing::info!(%peer, "client disconnected"),
                    Err(e) => tracing::warn!(%peer, "session ended with error: {e}"),
                }
            });
        }
    }
}

/// Retry `accept` until it yields a connection, pausing after each failure.
pub async fn accept_with_backoff<F, Fut, T>(mut accept: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<T>>,
{
    loop {
        match accept().await {
            Ok(conn) => return conn,
            Err(e) => {
                tracing::warn!("accept failed: {e}");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

/// Run one MCP session until the reader reaches EOF.
///
/// Requests are handled strictly one at a time, in arrival order.
pub async fn serve_session<R, W>(
    mut reader: R,
    mut writer: W,
    api: Arc<dyn CoinGeckoApi>,
) -> Result<(), BoxError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut initialized = false;
    let mut raw = Vec::new();

    loop {
        raw.clear();
        let n = (&mut reader)
            .take(MAX_MESSAGE_BYTES as u64 + 1)
            .read_until(b'\n', &mut raw)
            .await?;
        if n == 0 {
            break;
        }

        if n > MAX_MESSAGE_BYTES {
            tracing::warn!("message exceeds {MAX_MESSAGE_BYTES} bytes, dropping it");
            if raw.last() != Some(&b'\n') {
                discard_line(&mut reader).await?;
            }
            write_response(
                &mut writer,
                &JsonRpcResponse::error(None, JsonRpcError::parse_error()),
            ).await?;
            continue;
        }

        let trimmed = match std::str::from_utf8(&raw) {
            Ok(s) => s.trim(),
            Err(_) => {
                write_response(
                    &mut writer,
                    &JsonRpcResponse::error(None, JsonRpcError::parse_error()),
                ).await?;
                continue;
            }
        };

        if trimmed.is_empty() {
            continue;
        }

        let req: JsonRpcRequest = match serde_json::from_str(trimmed) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("parse error: {e}");
                write_response(
                    &mut writer,
                    &JsonRpcResponse::error(None, JsonRpcError::parse_error()),
                ).await?;
                continue;
            }
        };

        // Validate jsonrpc version
        if req.jsonrpc != "2.0" {
            write_response(
                &mut writer,
                &JsonRpcResponse::error(req.id.clone(), JsonRpcError::invalid_request()),
            ).await?;
            continue;
        }

        // Initialization gate: only `initialize` is allowed before handshake completes
        if !initialized && req.method != "initialize" {
            if req.id.is_none() {
                continue;
            }
            write_response(
                &mut writer,
                &JsonRpcResponse::error(
                    req.id.clone(),
                    JsonRpcError::invalid_request_with("Server not initialized"),
                ),
            ).await?;
            continue;
        }

        tracing::debug!(method = %req.method, "request");
        if let Some(resp) = handlers::dispatch(&req, &api).await {
            write_response(&mut writer, &resp).await?;
        }

        if req.method == "initialize" {
            initialized = true;
        }
    }

    Ok(())
}

/// Skip input up to and including the next newline without buffering it.
async fn discard_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(());
        }
        match buf.iter().position(|b| *b == b'\n') {
            Some(i) => {
                reader.consume(i + 1);
                return Ok(());
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

async fn write_response<W>(writer: &mut W, resp: &JsonRpcResponse) -> Result<(), BoxError>
where
    W: AsyncWrite + Unpin,
{
    let out = serde_json::to_string(resp)?;
    writer.write_all(out.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
