//! Server transport bindings
//!
//! Each binding decodes frames into request envelopes, hands them to the
//! dispatcher and writes the response envelopes back:
//!
//! - `stdio` - newline-delimited JSON over stdin/stdout (the `pipe` binding)
//! - `websocket` - one text frame per envelope, many concurrent peers (the `socket` binding)
//! - `http` - one envelope per POST body, stateless
//!
//! Exactly one binding runs per server process; see [`crate::config::TransportKind`].

pub mod http;
pub mod service;
pub mod stdio;
pub mod websocket;

pub use http::HttpTransport;
pub use service::{DispatchService, traced_service};
pub use stdio::StdioTransport;
pub use websocket::WebSocketTransport;
