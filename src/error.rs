//! Error types for deepseek-mcp

use serde::{Deserialize, Serialize};

use crate::protocol::Category;

/// Boxed error used by the binaries and by transport setup
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// JSON-RPC error codes used on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    /// Invalid JSON was received
    ParseError = -32700,
    /// The JSON sent is not a valid Request object
    InvalidRequest = -32600,
    /// The method does not exist / is not available
    MethodNotFound = -32601,
    /// Invalid method parameter(s)
    InvalidParams = -32602,
    /// Internal JSON-RPC error
    InternalError = -32603,
    /// The named tool, resource, prompt or sample is not registered
    NotFound = -32002,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            ErrorCode::MethodNotFound,
            format!("Method not found: {}", method),
        )
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn not_found(category: Category, key: &str) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", category.label(), key),
        )
    }
}

impl From<RegistryError> for JsonRpcError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound { category, key } => JsonRpcError::not_found(category, &key),
            other => JsonRpcError::internal_error(other.to_string()),
        }
    }
}

/// Errors raised while building or querying the capability registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("{} '{key}' is already registered", .category.label())]
    Duplicate { category: Category, key: String },

    #[error("{} not found: {key}", .category.label())]
    NotFound { category: Category, key: String },

    #[error("Invalid capability: {0}")]
    Invalid(String),
}

/// Failure returned by a capability handler.
///
/// Distinct from a handled failure, which is a successful
/// [`CapabilityResult`](crate::protocol::CapabilityResult) with `is_error`
/// set. A `HandlerError` always becomes a protocol error on the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        HandlerError::Failed(message.into())
    }
}

impl From<HandlerError> for JsonRpcError {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::InvalidArguments(_) => JsonRpcError::invalid_params(err.to_string()),
            HandlerError::Failed(message) => JsonRpcError::internal_error(message),
        }
    }
}

/// deepseek-mcp error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("JSON-RPC error {}: {}", .0.code, .0.message)]
    JsonRpc(JsonRpcError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Connection closed before a response arrived")]
    Disconnected,

    #[error("Chat completion failed: {0}")]
    Completion(String),
}

impl From<JsonRpcError> for Error {
    fn from(err: JsonRpcError) -> Self {
        Error::JsonRpc(err)
    }
}

/// Result type alias for deepseek-mcp
pub type Result<T> = std::result::Result<T, Error>;
