//! Request id allocation and response matching
//!
//! Push-style transports deliver responses out of band, from a reader task,
//! so every outgoing request is recorded as a [`PendingCall`] keyed by its id
//! and resolved when the matching response arrives. Responses whose id
//! matches nothing are logged as orphans and dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{Error, JsonRpcError, Result};
use crate::intent::Intent;
use crate::jsonrpc::decode_response;
use crate::protocol::{CapabilityResult, JsonRpcResponse, RequestId};

type Reply = std::result::Result<Value, JsonRpcError>;

/// Bookkeeping for one in-flight request
#[derive(Debug)]
pub struct PendingCall {
    pub id: RequestId,
    pub issued_at: Instant,
    /// The intent that produced the request, if any
    pub intent: Option<Intent>,
    responder: oneshot::Sender<Reply>,
}

/// Caller's handle on an in-flight request
#[derive(Debug)]
pub struct PendingReply {
    id: RequestId,
    rx: oneshot::Receiver<Reply>,
}

impl PendingReply {
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    /// Wait for the raw result payload.
    ///
    /// Fails with [`Error::Disconnected`] if the connection dropped first and
    /// with [`Error::JsonRpc`] if the server answered with a protocol error.
    pub async fn value(self) -> Result<Value> {
        match self.rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(Error::JsonRpc(error)),
            Err(_) => Err(Error::Disconnected),
        }
    }

    /// Wait for a capability result
    pub async fn capability_result(self) -> Result<CapabilityResult> {
        Ok(serde_json::from_value(self.value().await?)?)
    }
}

/// Allocates request ids and matches responses to pending calls
#[derive(Debug)]
pub struct Correlator {
    next_id: AtomicI64,
    pending: Mutex<HashMap<RequestId, PendingCall>>,
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new()
    }
}

impl Correlator {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<RequestId, PendingCall>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate the next id. Ids start at 1 and strictly increase.
    pub fn next_id(&self) -> RequestId {
        RequestId::Number(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Record a pending call. Must happen before the request is sent, so a
    /// fast response cannot arrive ahead of its bookkeeping.
    pub fn track(&self, id: RequestId, intent: Option<Intent>) -> PendingReply {
        let (tx, rx) = oneshot::channel();
        let call = PendingCall {
            id: id.clone(),
            issued_at: Instant::now(),
            intent,
            responder: tx,
        };
        if self.pending().insert(id.clone(), call).is_some() {
            tracing::warn!(request_id = %id, "Replaced a pending call with the same id");
        }
        PendingReply { id, rx }
    }

    /// Drop a pending call without resolving it
    pub fn forget(&self, id: &RequestId) -> bool {
        self.pending().remove(id).is_some()
    }

    /// Decode an inbound frame and resolve its pending call.
    ///
    /// Returns `true` when a pending call was resolved.
    pub fn on_message(&self, bytes: &[u8]) -> bool {
        match decode_response(bytes) {
            Ok(response) => self.resolve(response),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding undecodable response");
                false
            }
        }
    }

    /// Resolve the pending call matching `response`'s id.
    ///
    /// Returns `false`, after logging, for orphaned responses.
    pub fn resolve(&self, response: JsonRpcResponse) -> bool {
        let Some(id) = response.id().cloned() else {
            tracing::warn!(
                error = ?response.into_result().err(),
                "Orphaned response without id"
            );
            return false;
        };
        if !self.complete(&id, response) {
            tracing::warn!(request_id = %id, "Orphaned response, no pending call");
            return false;
        }
        true
    }

    /// Resolve the pending call `id` with `response`, whatever id the
    /// response itself carries. Used when the transport hands back the
    /// answer to one specific request.
    pub fn complete(&self, id: &RequestId, response: JsonRpcResponse) -> bool {
        let Some(call) = self.pending().remove(id) else {
            return false;
        };

        tracing::debug!(
            request_id = %call.id,
            elapsed_ms = elapsed_ms(call.issued_at.elapsed()),
            "Resolved pending call"
        );
        // The caller may have stopped waiting; that is not an error here.
        let _ = call.responder.send(response.into_result());
        true
    }

    /// Drop every pending call. Each waiting caller sees
    /// [`Error::Disconnected`]. Returns how many calls were dropped.
    pub fn disconnect(&self) -> usize {
        let dropped: Vec<PendingCall> = self.pending().drain().map(|(_, call)| call).collect();
        for call in &dropped {
            tracing::debug!(request_id = %call.id, intent = ?call.intent, "Pending call dropped on disconnect");
        }
        dropped.len()
    }

    /// Number of in-flight calls
    pub fn in_flight(&self) -> usize {
        self.pending().len()
    }
}

fn elapsed_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
