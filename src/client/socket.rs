//! WebSocket client transport

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::{ClientTransport, Correlator, Delivery};
use crate::error::{Error, Result};
use crate::jsonrpc::encode_request;
use crate::protocol::JsonRpcRequest;

/// Persistent WebSocket connection; responses are pushed back over the
/// socket and matched by the [`Correlator`].
pub struct SocketClientTransport {
    outbound: mpsc::UnboundedSender<Message>,
    connected: Arc<AtomicBool>,
    reader_task: JoinHandle<()>,
    writer_task: JoinHandle<()>,
}

impl SocketClientTransport {
    pub async fn connect(url: &str, correlator: Arc<Correlator>) -> Result<Self> {
        let (websocket, _) = connect_async(url).await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Failed to connect to WebSocket");
            Error::Transport(format!("WebSocket connection failed: {}", e))
        })?;
        tracing::info!(url = %url, "WebSocket client connected");

        let (mut sink, mut stream) = websocket.split();
        let (outbound, mut rx) = mpsc::unbounded_channel::<Message>();
        let connected = Arc::new(AtomicBool::new(true));

        let writer_task = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                let closing = matches!(message, Message::Close(_));
                if let Err(e) = sink.send(message).await {
                    tracing::error!(error = %e, "Failed to send WebSocket message");
                    break;
                }
                if closing {
                    break;
                }
            }
        });

        let reader_task = {
            let connected = Arc::clone(&connected);
            let outbound = outbound.clone();
            tokio::spawn(async move {
                while let Some(message) = stream.next().await {
                    match message {
                        Ok(Message::Text(text)) => {
                            correlator.on_message(text.as_str().as_bytes());
                        }
                        Ok(Message::Binary(data)) => {
                            correlator.on_message(&data);
                        }
                        Ok(Message::Ping(payload)) => {
                            let _ = outbound.send(Message::Pong(payload));
                        }
                        Ok(Message::Close(frame)) => {
                            tracing::info!(frame = ?frame, "WebSocket closed by server");
                            break;
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::error!(error = %e, "WebSocket receive failed");
                            break;
                        }
                    }
                }
                connected.store(false, Ordering::SeqCst);
                let dropped = correlator.disconnect();
                if dropped > 0 {
                    tracing::warn!(dropped, "WebSocket closed with calls in flight");
                }
            })
        };

        Ok(Self {
            outbound,
            connected,
            reader_task,
            writer_task,
        })
    }
}

#[async_trait]
impl ClientTransport for SocketClientTransport {
    async fn send(&self, request: JsonRpcRequest) -> Result<Delivery> {
        if !self.is_connected() {
            return Err(Error::Disconnected);
        }
        let json = encode_request(&request)?;
        self.outbound
            .send(Message::Text(json.into()))
            .map_err(|_| Error::Disconnected)?;
        Ok(Delivery::Pushed)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<()> {
        if self.connected.swap(false, Ordering::SeqCst) {
            let _ = self.outbound.send(Message::Close(None));
        }
        Ok(())
    }
}

impl Drop for SocketClientTransport {
    fn drop(&mut self) {
        self.reader_task.abort();
        self.writer_task.abort();
    }
}
