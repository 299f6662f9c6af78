//! WebSocket transport (the `socket` binding)
//!
//! Every accepted connection is an independent peer served by its own task.
//! Frames from one connection are handled in arrival order and each response
//! is written back on the connection that sent the request.
//!
//! # Example
//!
//! ```rust,no_run
//! use deepseek_mcp::{WebSocketTransport, builtins};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let transport = WebSocketTransport::new(builtins::dispatcher()?);
//!     transport.serve("127.0.0.1:3001").await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;

use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::jsonrpc::{encode_response, serve_frame};
use crate::transport::service::{DispatchService, traced_service};

/// Shared state for WebSocket transport
struct AppState {
    service: DispatchService,
    active_connections: AtomicUsize,
}

/// WebSocket transport for the dispatch server
pub struct WebSocketTransport {
    dispatcher: Dispatcher,
}

impl WebSocketTransport {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Build the axum router for this transport
    pub fn into_router(self) -> Router {
        let state = Arc::new(AppState {
            service: traced_service(self.dispatcher),
            active_connections: AtomicUsize::new(0),
        });

        Router::new()
            .route("/", get(handle_websocket))
            .with_state(state)
    }

    /// Serve the transport on the given address
    pub async fn serve(self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Transport(format!("Failed to bind to {}: {}", addr, e)))?;
        self.serve_listener(listener).await
    }

    /// Serve the transport on an already-bound listener
    pub async fn serve_listener(self, listener: TcpListener) -> Result<()> {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!("WebSocket transport listening on ws://{}", addr);
        }

        axum::serve(listener, self.into_router())
            .await
            .map_err(|e| Error::Transport(format!("Server error: {}", e)))
    }
}

/// Handle WebSocket upgrade
async fn handle_websocket(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = uuid::Uuid::new_v4().to_string();
    let active = state.active_connections.fetch_add(1, Ordering::SeqCst) + 1;
    tracing::info!(
        connection_id = %connection_id,
        active_connections = active,
        "WebSocket connection established"
    );

    let mut service = state.service.clone();
    let (mut sender, mut receiver) = socket.split();

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "WebSocket receive error");
                break;
            }
        };

        let payload = match msg {
            Message::Text(text) => text.as_str().as_bytes().to_vec(),
            Message::Binary(data) => data.to_vec(),
            Message::Ping(data) => {
                if let Err(e) = sender.send(Message::Pong(data)).await {
                    tracing::error!(error = %e, "Failed to send pong");
                    break;
                }
                continue;
            }
            Message::Pong(_) => continue,
            Message::Close(_) => {
                tracing::info!(connection_id = %connection_id, "WebSocket close received");
                break;
            }
        };

        let Some(response) = serve_frame(&mut service, &payload).await else {
            continue;
        };

        let json = match encode_response(&response) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response");
                continue;
            }
        };

        if let Err(e) = sender.send(Message::Text(json.into())).await {
            tracing::error!(connection_id = %connection_id, error = %e, "Failed to send response");
            break;
        }
    }

    let active = state.active_connections.fetch_sub(1, Ordering::SeqCst) - 1;
    tracing::info!(
        connection_id = %connection_id,
        active_connections = active,
        "WebSocket connection closed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CapabilityRegistry;

    #[tokio::test]
    async fn test_websocket_transport_builds() {
        let transport = WebSocketTransport::new(Dispatcher::new(CapabilityRegistry::new()));
        let _router = transport.into_router();
    }

    #[tokio::test]
    async fn test_bind_failure_is_transport_error() {
        let transport = WebSocketTransport::new(Dispatcher::new(CapabilityRegistry::new()));
        let err = transport.serve("not-an-address").await.unwrap_err();
        assert!(matches!(err, Error::Transport(ref m) if m.contains("Failed to bind")));
    }
}
