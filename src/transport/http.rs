//! HTTP transport
//!
//! Stateless request/response binding: every POST body is one request
//! envelope and the response body is its response envelope. Mounted at
//! `/api/mcp` and at `/`, with permissive CORS so browser clients can call it.
//!
//! # Example
//!
//! ```rust,no_run
//! use deepseek_mcp::{HttpTransport, builtins};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let transport = HttpTransport::new(builtins::dispatcher()?);
//!     transport.serve("127.0.0.1:3000").await?;
//!     Ok(())
//! }
//! ```

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::jsonrpc::serve_frame;
use crate::transport::service::{DispatchService, traced_service};

/// Path the chat client posts to
pub const MCP_ENDPOINT: &str = "/api/mcp";

/// HTTP transport for the dispatch server
pub struct HttpTransport {
    dispatcher: Dispatcher,
}

impl HttpTransport {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Build the axum router for this transport
    pub fn into_router(self) -> Router {
        let service = traced_service(self.dispatcher);

        Router::new()
            .route(MCP_ENDPOINT, post(handle_post))
            .route("/", post(handle_post))
            .with_state(service)
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
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
            tracing::info!("HTTP transport listening on http://{}{}", addr, MCP_ENDPOINT);
        }

        axum::serve(listener, self.into_router())
            .await
            .map_err(|e| Error::Transport(format!("Server error: {}", e)))
    }
}

async fn handle_post(State(mut service): State<DispatchService>, body: Bytes) -> Response {
    match serve_frame(&mut service, &body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
