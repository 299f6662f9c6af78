//! JSON-RPC 2.0 wire codec
//!
//! Shared by every transport binding and by the client:
//!
//! - [`decode_request`] classifies an inbound frame as a request, a
//!   notification or an invalid frame that already has its error response
//! - [`encode_response`] / [`decode_response`] for the reply path
//! - [`serve_frame`] runs one inbound frame through a dispatch service

use std::convert::Infallible;

use serde_json::Value;
use tower::ServiceExt;
use tower_service::Service;

use crate::error::{Error, JsonRpcError, Result};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, RequestId};

/// Classification of one inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A request that expects a response
    Request(JsonRpcRequest),
    /// A message without an id; never answered
    Notification { method: String },
    /// Undecodable frame, with the error response to send back
    Invalid(JsonRpcResponse),
}

/// Decode an inbound frame.
///
/// Bytes that are not JSON yield a parse error with a `null` id. JSON that is
/// not a request envelope yields an invalid-request error, echoing the id when
/// one can be recovered.
pub fn decode_request(bytes: &[u8]) -> Frame {
    let value: Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(e) => {
            return Frame::Invalid(JsonRpcResponse::error(
                None,
                JsonRpcError::parse_error(format!("Parse error: {}", e)),
            ));
        }
    };

    let Some(object) = value.as_object() else {
        return Frame::Invalid(JsonRpcResponse::error(
            None,
            JsonRpcError::invalid_request("Request must be a JSON object"),
        ));
    };

    let id = match object.get("id") {
        None => {
            return match object.get("method").and_then(Value::as_str) {
                Some(method) => Frame::Notification {
                    method: method.to_string(),
                },
                None => Frame::Invalid(JsonRpcResponse::error(
                    None,
                    JsonRpcError::invalid_request("Missing 'id' and 'method'"),
                )),
            };
        }
        Some(id) => serde_json::from_value::<RequestId>(id.clone()).ok(),
    };

    match serde_json::from_value::<JsonRpcRequest>(value) {
        Ok(request) => Frame::Request(request),
        Err(e) => Frame::Invalid(JsonRpcResponse::error(
            id,
            JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
        )),
    }
}

pub fn encode_request(request: &JsonRpcRequest) -> Result<String> {
    Ok(serde_json::to_string(request)?)
}

pub fn encode_response(response: &JsonRpcResponse) -> Result<String> {
    Ok(serde_json::to_string(response)?)
}

/// Decode a response envelope, rejecting any that carry both or neither of
/// `result` and `error`.
pub fn decode_response(bytes: &[u8]) -> Result<JsonRpcResponse> {
    let value: Value = serde_json::from_slice(bytes)?;
    let has_result = value.get("result").is_some();
    let has_error = value.get("error").is_some();
    if has_result == has_error {
        return Err(Error::JsonRpc(JsonRpcError::invalid_request(
            "Response must carry exactly one of 'result' or 'error'",
        )));
    }
    Ok(serde_json::from_value(value)?)
}

/// Run one inbound frame through `service`.
///
/// Returns the response to send back, or `None` for notifications.
pub async fn serve_frame<S>(service: &mut S, bytes: &[u8]) -> Option<JsonRpcResponse>
where
    S: Service<JsonRpcRequest, Response = JsonRpcResponse, Error = Infallible>,
{
    match decode_request(bytes) {
        Frame::Request(request) => {
            let result = match service.ready().await {
                Ok(ready) => ready.call(request).await,
                Err(never) => match never {},
            };
            match result {
                Ok(response) => Some(response),
                Err(never) => match never {},
            }
        }
        Frame::Notification { method } => {
            tracing::debug!(method = %method, "Ignoring notification");
            None
        }
        Frame::Invalid(response) => {
            if let JsonRpcResponse::Error(e) = &response {
                tracing::warn!(error = %e.error.message, "Rejected malformed frame");
            }
            Some(response)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_decode_request() {
        let frame = decode_request(br#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#);
        assert_eq!(frame, Frame::Request(JsonRpcRequest::new(1, "tools/list")));
    }

    #[test]
    fn test_request_round_trip() {
        let request = JsonRpcRequest::new("abc", "tools/call")
            .with_params(json!({"name": "file_read", "arguments": {"path": "/tmp/a"}}));
        let encoded = encode_request(&request).unwrap();
        assert_eq!(decode_request(encoded.as_bytes()), Frame::Request(request));
    }

    #[test]
    fn test_garbage_is_parse_error_with_null_id() {
        match decode_request(b"{not json") {
            Frame::Invalid(JsonRpcResponse::Error(e)) => {
                assert_eq!(e.id, None);
                assert_eq!(e.error.code, ErrorCode::ParseError.code());
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_missing_method_echoes_id() {
        match decode_request(br#"{"jsonrpc":"2.0","id":42}"#) {
            Frame::Invalid(JsonRpcResponse::Error(e)) => {
                assert_eq!(e.id, Some(RequestId::Number(42)));
                assert_eq!(e.error.code, ErrorCode::InvalidRequest.code());
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_notification() {
        let frame = decode_request(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#);
        assert_eq!(
            frame,
            Frame::Notification {
                method: "notifications/initialized".into()
            }
        );
    }

    #[test]
    fn test_response_round_trip() {
        let ok = JsonRpcResponse::result(RequestId::Number(1), json!({"tools": []}));
        let decoded = decode_response(encode_response(&ok).unwrap().as_bytes()).unwrap();
        assert_eq!(decoded, ok);

        let err = JsonRpcResponse::error(
            Some(RequestId::String("x".into())),
            JsonRpcError::method_not_found("nope"),
        );
        let decoded = decode_response(encode_response(&err).unwrap().as_bytes()).unwrap();
        assert_eq!(decoded, err);
    }

    #[test]
    fn test_response_with_both_or_neither_rejected() {
        let both = br#"{"jsonrpc":"2.0","id":1,"result":{},"error":{"code":-32603,"message":"x"}}"#;
        assert!(decode_response(both).is_err());
        let neither = br#"{"jsonrpc":"2.0","id":1}"#;
        assert!(decode_response(neither).is_err());
    }
}
