//! Pipe client transport
//!
//! Talks newline-delimited JSON-RPC over a byte stream pair, normally the
//! stdin/stdout of a spawned server process. A reader task feeds every
//! inbound line to the [`Correlator`].

use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::{ClientTransport, Correlator, Delivery};
use crate::error::{Error, Result};
use crate::jsonrpc::encode_request;
use crate::protocol::JsonRpcRequest;

type BoxWriter = Box<dyn AsyncWrite + Send + Unpin>;

pub struct PipeClientTransport {
    writer: Mutex<Option<BoxWriter>>,
    connected: Arc<AtomicBool>,
    reader_task: JoinHandle<()>,
    child: Option<Mutex<Child>>,
}

impl PipeClientTransport {
    /// Spawn `program` and connect to its stdin/stdout
    pub async fn spawn(program: &str, args: &[&str], correlator: Arc<Correlator>) -> Result<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Transport(format!("Failed to spawn {}: {}", program, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Transport("Failed to get child stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Transport("Failed to get child stdout".to_string()))?;

        tracing::info!(program = %program, "Spawned server process");

        let mut transport = Self::from_streams(stdout, stdin, correlator);
        transport.child = Some(Mutex::new(child));
        Ok(transport)
    }

    /// Connect over an existing stream pair
    pub fn from_streams<R, W>(reader: R, writer: W, correlator: Arc<Correlator>) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let connected = Arc::new(AtomicBool::new(true));
        let reader_task = tokio::spawn(read_loop(reader, correlator, Arc::clone(&connected)));

        Self {
            writer: Mutex::new(Some(Box::new(writer))),
            connected,
            reader_task,
            child: None,
        }
    }
}

async fn read_loop<R>(reader: R, correlator: Arc<Correlator>, connected: Arc<AtomicBool>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => {
                tracing::info!("Server closed the pipe");
                break;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read from pipe");
                break;
            }
            Ok(_) => {
                let trimmed = line.trim_ascii();
                if !trimmed.is_empty() {
                    correlator.on_message(trimmed);
                }
            }
        }
    }
    connected.store(false, Ordering::SeqCst);
    let dropped = correlator.disconnect();
    if dropped > 0 {
        tracing::warn!(dropped, "Pipe closed with calls in flight");
    }
}

#[async_trait]
impl ClientTransport for PipeClientTransport {
    async fn send(&self, request: JsonRpcRequest) -> Result<Delivery> {
        if !self.is_connected() {
            return Err(Error::Disconnected);
        }

        let mut line = encode_request(&request)?;
        line.push('\n');

        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(Error::Disconnected)?;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| Error::Transport(format!("Failed to write to pipe: {}", e)))?;
        writer
            .flush()
            .await
            .map_err(|e| Error::Transport(format!("Failed to flush pipe: {}", e)))?;
        Ok(Delivery::Pushed)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<()> {
        // Dropping the writer closes the server's stdin, which ends its loop
        if let Some(mut writer) = self.writer.lock().await.take() {
            let _ = writer.shutdown().await;
        }
        self.connected.store(false, Ordering::SeqCst);

        if let Some(child) = &self.child {
            let mut child = child.lock().await;
            match tokio::time::timeout(std::time::Duration::from_secs(5), child.wait()).await {
                Ok(Ok(status)) => tracing::info!(status = ?status, "Server process exited"),
                Ok(Err(e)) => {
                    return Err(Error::Transport(format!("Server process error: {}", e)));
                }
                Err(_) => {
                    tracing::warn!("Server process did not exit, killing");
                    child
                        .kill()
                        .await
                        .map_err(|e| Error::Transport(format!("Failed to kill server: {}", e)))?;
                }
            }
        }
        Ok(())
    }
}

impl Drop for PipeClientTransport {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}
