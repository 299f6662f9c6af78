//! Client side: correlator, transports and the [`McpClient`] facade
//!
//! ```rust,no_run
//! use deepseek_mcp::client::McpClient;
//! use deepseek_mcp::Intent;
//!
//! # async fn example() -> deepseek_mcp::Result<()> {
//! let client = McpClient::socket("ws://127.0.0.1:3001").await?;
//! let intent = Intent::parse("/read Cargo.toml").expect("an intent");
//! let result = client.call(intent).await?;
//! println!("{}", result.joined_text());
//! # Ok(())
//! # }
//! ```

mod correlator;
mod http;
mod pipe;
mod socket;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

pub use correlator::{Correlator, PendingCall, PendingReply};
pub use http::HttpClientTransport;
pub use pipe::PipeClientTransport;
pub use socket::SocketClientTransport;

use crate::error::Result;
use crate::intent::Intent;
use crate::protocol::{
    CapabilityResult, Category, InvokeParams, JsonRpcRequest, JsonRpcResponse, ListResult, Method,
};

/// How a transport delivers the response to a sent request
#[derive(Debug)]
pub enum Delivery {
    /// The response will arrive later through [`Correlator::on_message`]
    Pushed,
    /// The response came back as the direct return of the send
    Direct(JsonRpcResponse),
}

/// Trait for client transports
#[async_trait]
pub trait ClientTransport: Send + Sync {
    /// Send a request envelope
    async fn send(&self, request: JsonRpcRequest) -> Result<Delivery>;

    /// Check if the transport is still connected
    fn is_connected(&self) -> bool;

    /// Close the transport
    async fn close(&self) -> Result<()>;
}

/// Client for a dispatch server, transport-agnostic
pub struct McpClient {
    correlator: Arc<Correlator>,
    transport: Box<dyn ClientTransport>,
}

impl McpClient {
    /// Create a client over a transport that reports pushed responses to
    /// `correlator`
    pub fn new(correlator: Arc<Correlator>, transport: impl ClientTransport + 'static) -> Self {
        Self {
            correlator,
            transport: Box::new(transport),
        }
    }

    /// Connect to a WebSocket server
    pub async fn socket(url: &str) -> Result<Self> {
        let correlator = Arc::new(Correlator::new());
        let transport = SocketClientTransport::connect(url, Arc::clone(&correlator)).await?;
        Ok(Self::new(correlator, transport))
    }

    /// Talk to an HTTP server at `base_url`
    pub fn http(base_url: &str) -> Self {
        Self::new(Arc::new(Correlator::new()), HttpClientTransport::new(base_url))
    }

    /// Spawn a server process and talk to it over its stdin/stdout
    pub async fn pipe(program: &str, args: &[&str]) -> Result<Self> {
        let correlator = Arc::new(Correlator::new());
        let transport = PipeClientTransport::spawn(program, args, Arc::clone(&correlator)).await?;
        Ok(Self::new(correlator, transport))
    }

    /// Talk newline-delimited JSON-RPC over an existing stream pair
    pub fn from_streams<R, W>(reader: R, writer: W) -> Self
    where
        R: tokio::io::AsyncRead + Send + Unpin + 'static,
        W: tokio::io::AsyncWrite + Send + Unpin + 'static,
    {
        let correlator = Arc::new(Correlator::new());
        let transport = PipeClientTransport::from_streams(reader, writer, Arc::clone(&correlator));
        Self::new(correlator, transport)
    }

    pub fn correlator(&self) -> &Arc<Correlator> {
        &self.correlator
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Send a request and return the handle to its pending reply
    pub async fn send(
        &self,
        method: Method,
        params: Option<Value>,
        intent: Option<Intent>,
    ) -> Result<PendingReply> {
        let id = self.correlator.next_id();
        let mut request = JsonRpcRequest::new(id.clone(), method.as_str());
        request.params = params;

        tracing::debug!(request_id = %id, method = %method, "Sending request");
        let reply = self.correlator.track(id.clone(), intent);

        match self.transport.send(request).await {
            Ok(Delivery::Pushed) => {}
            Ok(Delivery::Direct(response)) => {
                // A direct response answers this request even when its id
                // is missing or wrong (e.g. a parse error with a null id).
                if response.id() != Some(&id) {
                    tracing::warn!(
                        request_id = %id,
                        response_id = ?response.id(),
                        "Direct response id does not match request"
                    );
                }
                self.correlator.complete(&id, response);
            }
            Err(e) => {
                self.correlator.forget(&id);
                return Err(e);
            }
        }
        Ok(reply)
    }

    /// Dispatch an intent as a tool call. The reply handle carries the id.
    pub async fn dispatch(&self, intent: Intent) -> Result<PendingReply> {
        let params = serde_json::to_value(intent.params())?;
        self.send(intent.method(), Some(params), Some(intent)).await
    }

    /// Dispatch an intent and wait for its result
    pub async fn call(&self, intent: Intent) -> Result<CapabilityResult> {
        self.dispatch(intent).await?.capability_result().await
    }

    /// List a category's capabilities
    pub async fn list(&self, category: Category) -> Result<ListResult> {
        let value = self
            .send(category.list_method(), None, None)
            .await?
            .value()
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Invoke any capability by name or uri
    pub async fn invoke(
        &self,
        category: Category,
        target: &str,
        arguments: Value,
    ) -> Result<CapabilityResult> {
        let params = serde_json::to_value(InvokeParams::new(category, target).with_arguments(arguments))?;
        self.send(category.invoke_method(), Some(params), None)
            .await?
            .capability_result()
            .await
    }

    /// Close the transport. Pending calls fail with `Disconnected`.
    pub async fn close(&self) -> Result<()> {
        let result = self.transport.close().await;
        self.correlator.disconnect();
        result
    }
}
