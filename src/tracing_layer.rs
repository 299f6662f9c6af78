//! Request tracing middleware.
//!
//! [`DispatchTracingLayer`] wraps a dispatch service and records, for every
//! request, a span carrying the method, request id, category and target,
//! plus the duration and outcome once the response is ready. Error
//! responses are logged at `WARN`.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use tower::Layer;
use tower_service::Service;
use tracing::Instrument;

use crate::protocol::{InvokeParams, JsonRpcRequest, JsonRpcResponse, Method};

/// Tower layer that adds structured tracing to dispatched requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchTracingLayer;

impl DispatchTracingLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for DispatchTracingLayer {
    type Service = DispatchTracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DispatchTracingService { inner }
    }
}

/// Tower service created by [`DispatchTracingLayer`].
#[derive(Debug, Clone)]
pub struct DispatchTracingService<S> {
    inner: S,
}

impl<S> Service<JsonRpcRequest> for DispatchTracingService<S>
where
    S: Service<JsonRpcRequest, Response = JsonRpcResponse, Error = Infallible>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = JsonRpcResponse;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<JsonRpcResponse, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: JsonRpcRequest) -> Self::Future {
        let method = req.method.clone();
        let request_id = req.id.to_string();
        let (category, target) = operation_details(&req);
        let span = tracing::info_span!(
            "dispatch",
            method = %method,
            request_id = %request_id,
            category = category,
            target = target.as_deref(),
        );

        let start = Instant::now();
        let fut = self.inner.call(req);

        Box::pin(
            async move {
                let result = fut.await;
                let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

                match &result {
                    Ok(JsonRpcResponse::Error(err)) => {
                        tracing::warn!(
                            method = %method,
                            error_code = err.error.code,
                            error_message = %err.error.message,
                            duration_ms = duration_ms,
                            "Request failed"
                        );
                    }
                    Ok(JsonRpcResponse::Result(_)) => {
                        tracing::info!(method = %method, duration_ms = duration_ms, "Request completed")
                    }
                    Err(never) => match *never {},
                }

                result
            }
            .instrument(span),
        )
    }
}

/// Category label and invocation target, when the method is recognized.
fn operation_details(req: &JsonRpcRequest) -> (Option<&'static str>, Option<String>) {
    let Ok(method) = req.method.parse::<Method>() else {
        return (None, None);
    };
    let category = method.category();
    if method.is_list() {
        return (Some(category.label()), None);
    }
    let target = req
        .params
        .as_ref()
        .and_then(|p| serde_json::from_value::<InvokeParams>(p.clone()).ok())
        .and_then(|p| p.target(category).map(str::to_string));
    (Some(category.label()), target)
}
