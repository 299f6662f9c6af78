//! # deepseek-mcp
//!
//! Tower-native capability-dispatch server with a matching chat client.
//!
//! The server keeps a registry of four capability categories (tools,
//! resources, prompt templates and code samples) and answers JSON-RPC 2.0
//! requests that list a category or invoke one of its entries. The same
//! [`Dispatcher`] is exposed over three bindings:
//!
//! - **pipe**: newline-delimited JSON over stdin/stdout ([`StdioTransport`])
//! - **socket**: one JSON message per WebSocket frame ([`WebSocketTransport`])
//! - **http**: one JSON body per `POST` ([`HttpTransport`])
//!
//! Every binding wraps the dispatcher in [`DispatchTracingLayer`], a tower
//! `Layer`, so each request is logged with its method, id and target.
//!
//! ## Quick Start: Server
//!
//! ```rust,no_run
//! use deepseek_mcp::{BoxError, CapabilityBuilder, CapabilityResult, Dispatcher, StdioTransport};
//! use deepseek_mcp::registry::CapabilityRegistry;
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize, JsonSchema)]
//! struct GreetInput {
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), BoxError> {
//!     let greet = CapabilityBuilder::tool("greet")
//!         .description("Greet someone by name")
//!         .handler(|input: GreetInput| async move {
//!             Ok(CapabilityResult::text(format!("Hello, {}!", input.name)))
//!         })
//!         .build()?;
//!
//!     let dispatcher = Dispatcher::new(CapabilityRegistry::new().with(greet)?)
//!         .server_info("my-server", "1.0.0");
//!
//!     StdioTransport::new(dispatcher).run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Quick Start: Client
//!
//! ```rust,no_run
//! use deepseek_mcp::{BoxError, Intent, McpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), BoxError> {
//!     let client = McpClient::http("http://127.0.0.1:3000");
//!     if let Some(intent) = Intent::parse("/search tower middleware") {
//!         let result = client.call(intent).await?;
//!         println!("{}", result.joined_text());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Key Types
//!
//! ### Server
//! - [`CapabilityBuilder`] - Builder for capabilities with typed handlers
//! - [`CapabilityRegistry`](registry::CapabilityRegistry) - Keyed catalogs per category
//! - [`Dispatcher`] - Routes JSON-RPC requests to the registry
//! - [`builtins`] - The capabilities the shipped server registers
//!
//! ### Client
//! - [`McpClient`] - Transport-agnostic client
//! - [`Correlator`] - Request ids and response matching
//! - [`Intent`] - `/read`, `/write`, `/search` input parsing
//! - [`ChatSession`] - Tool intents plus the chat-completion fallback

pub mod builtins;
pub mod capability;
pub mod chat;
pub mod client;
pub mod completion;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod intent;
pub mod jsonrpc;
pub mod protocol;
pub mod registry;
pub mod tracing_layer;
pub mod transport;

// Re-exports
pub use capability::{Capability, CapabilityBuilder, CapabilityHandler, NoParams};
pub use chat::{ChatSession, Turn};
pub use client::{ClientTransport, Correlator, Delivery, McpClient, PendingReply};
pub use completion::{ChatCompletion, DeepSeekClient};
pub use config::{ServerConfig, TransportKind};
pub use dispatch::Dispatcher;
pub use error::{BoxError, Error, HandlerError, JsonRpcError, RegistryError, Result};
pub use intent::Intent;
pub use protocol::{
    CapabilityDefinition, CapabilityResult, Category, Content, JsonRpcRequest, JsonRpcResponse,
    ListResult, McpRequest, McpResponse, Method, RequestId, ResourceContent,
};
pub use tracing_layer::{DispatchTracingLayer, DispatchTracingService};
pub use transport::{DispatchService, HttpTransport, StdioTransport, WebSocketTransport};
