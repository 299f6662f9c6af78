//! Stdio transport (the `pipe` binding)
//!
//! Reads newline-delimited JSON-RPC requests and writes one response line per
//! request. Frames are handled strictly in arrival order, so responses come
//! back in request order.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::jsonrpc::{encode_response, serve_frame};
use crate::protocol::JsonRpcResponse;
use crate::transport::service::{DispatchService, traced_service};

/// Stdio transport for the dispatch server
///
/// # Example
///
/// ```rust,no_run
/// use deepseek_mcp::{StdioTransport, builtins};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///     let dispatcher = builtins::dispatcher()?;
///     StdioTransport::new(dispatcher).run().await?;
///     Ok(())
/// }
/// ```
pub struct StdioTransport {
    service: DispatchService,
}

impl StdioTransport {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            service: traced_service(dispatcher),
        }
    }

    /// Serve stdin/stdout until stdin reaches EOF
    pub async fn run(self) -> Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve an arbitrary byte stream pair until the reader reaches EOF
    pub async fn serve<R, W>(mut self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut line = Vec::new();

        tracing::info!("Stdio transport started, waiting for input");

        loop {
            line.clear();
            // Raw bytes: a line that is not UTF-8 is a parse error, not EOF
            let bytes_read = reader
                .read_until(b'\n', &mut line)
                .await
                .map_err(|e| Error::Transport(format!("Failed to read from stdin: {}", e)))?;

            if bytes_read == 0 {
                tracing::info!("Stdin closed, shutting down");
                break;
            }

            let trimmed = line.trim_ascii();
            if trimmed.is_empty() {
                continue;
            }

            tracing::debug!(input = %String::from_utf8_lossy(trimmed), "Received message");

            if let Some(response) = serve_frame(&mut self.service, trimmed).await {
                write_response(&mut writer, &response).await?;
            }
        }

        Ok(())
    }
}

async fn write_response<W>(writer: &mut W, response: &JsonRpcResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut json = encode_response(response)?;
    tracing::debug!(output = %json, "Sending response");
    json.push('\n');
    writer
        .write_all(json.as_bytes())
        .await
        .map_err(|e| Error::Transport(format!("Failed to write to stdout: {}", e)))?;
    writer
        .flush()
        .await
        .map_err(|e| Error::Transport(format!("Failed to flush stdout: {}", e)))
}
