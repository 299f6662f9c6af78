//! The service type transports drive
//!
//! Every binding holds a [`DispatchService`]: the dispatcher wrapped in
//! [`DispatchTracingLayer`] and boxed, so the binding does not need to name
//! the middleware stack.

use std::convert::Infallible;

use tower::Layer;
use tower::util::BoxCloneSyncService;

use crate::dispatch::Dispatcher;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::tracing_layer::DispatchTracingLayer;

/// A boxed, cloneable, `Sync` dispatch service with `Error = Infallible`.
pub type DispatchService = BoxCloneSyncService<JsonRpcRequest, JsonRpcResponse, Infallible>;

/// Wrap a dispatcher with request tracing.
pub fn traced_service(dispatcher: Dispatcher) -> DispatchService {
    BoxCloneSyncService::new(DispatchTracingLayer::new().layer(dispatcher))
}
