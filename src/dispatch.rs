//! Dispatch core: routes request envelopes to registered capabilities.
//!
//! [`Dispatcher`] is transport-agnostic. Every binding decodes bytes into a
//! [`JsonRpcRequest`], calls the dispatcher (directly or as a tower
//! `Service`) and encodes the [`JsonRpcResponse`] it gets back. The
//! dispatcher never fails at the service level: every problem is folded into
//! an error envelope carrying the request's id.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use serde_json::Value;
use tower_service::Service;

use crate::error::{HandlerError, JsonRpcError};
use crate::protocol::{
    Category, JsonRpcRequest, JsonRpcResponse, ListResult, McpRequest, McpResponse,
};
use crate::registry::CapabilityRegistry;

/// Routes requests to the capability registry
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

#[derive(Clone)]
struct DispatcherInner {
    server_name: String,
    server_version: String,
    registry: CapabilityRegistry,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("server_name", &self.inner.server_name)
            .field("server_version", &self.inner.server_version)
            .field("tools", &self.inner.registry.len(Category::Tool))
            .field("resources", &self.inner.registry.len(Category::Resource))
            .field("prompts", &self.inner.registry.len(Category::PromptTemplate))
            .field("samples", &self.inner.registry.len(Category::Sample))
            .finish()
    }
}

impl Dispatcher {
    pub fn new(registry: CapabilityRegistry) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                server_name: env!("CARGO_PKG_NAME").to_string(),
                server_version: env!("CARGO_PKG_VERSION").to_string(),
                registry,
            }),
        }
    }

    /// Set server name and version, used in logs
    pub fn server_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        let inner = Arc::make_mut(&mut self.inner);
        inner.server_name = name.into();
        inner.server_version = version.into();
        self
    }

    pub fn server_name(&self) -> &str {
        &self.inner.server_name
    }

    pub fn server_version(&self) -> &str {
        &self.inner.server_version
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.inner.registry
    }

    /// Handle one request envelope, producing exactly one response envelope
    pub async fn handle(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();
        match self.process(&request).await {
            Ok(result) => JsonRpcResponse::result(id, result),
            Err(error) => {
                tracing::debug!(
                    request_id = %id,
                    method = %request.method,
                    code = error.code,
                    error = %error.message,
                    "Request failed"
                );
                JsonRpcResponse::error(Some(id), error)
            }
        }
    }

    async fn process(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        request.validate()?;
        let parsed = McpRequest::from_jsonrpc(request)?;
        let response = self.route(parsed).await?;
        serde_json::to_value(response).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    /// Route a decoded request to the registry
    pub async fn route(&self, request: McpRequest) -> Result<McpResponse, JsonRpcError> {
        match request {
            McpRequest::List(category) => Ok(McpResponse::List(ListResult::new(
                category,
                self.inner.registry.list(category),
            ))),
            McpRequest::Invoke {
                category,
                target,
                arguments,
            } => {
                let capability = self.inner.registry.lookup(category, &target)?;
                let call = capability.invoke(arguments);

                // Own task per invocation: a panicking handler surfaces as a
                // JoinError here instead of unwinding through the connection.
                match tokio::spawn(call).await {
                    Ok(Ok(result)) => Ok(McpResponse::Capability(result)),
                    Ok(Err(err @ HandlerError::InvalidArguments(_))) => Err(err.into()),
                    Ok(Err(err)) => {
                        tracing::warn!(
                            category = %category,
                            target = %target,
                            error = %err,
                            "Capability handler failed"
                        );
                        Err(err.into())
                    }
                    Err(join_error) => {
                        tracing::error!(
                            category = %category,
                            target = %target,
                            error = %join_error,
                            "Capability handler crashed"
                        );
                        Err(JsonRpcError::internal_error(format!(
                            "{} '{}' failed unexpectedly: {}",
                            category.label(),
                            target,
                            panic_message(join_error)
                        )))
                    }
                }
            }
        }
    }
}

fn panic_message(err: tokio::task::JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

impl Service<JsonRpcRequest> for Dispatcher {
    type Response = JsonRpcResponse;
    type Error = Infallible; // Errors are in the response
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: JsonRpcRequest) -> Self::Future {
        let dispatcher = self.clone();
        Box::pin(async move { Ok(dispatcher.handle(req).await) })
    }
}
