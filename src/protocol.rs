//! Wire types for the capability protocol
//!
//! Requests and responses are JSON-RPC 2.0 envelopes. Methods are a closed
//! set of eight, each bound to exactly one [`Category`] and either listing
//! the category or invoking one of its capabilities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::JsonRpcError;

/// JSON-RPC version carried by every envelope
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: impl Into<RequestId>, method: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.into(),
            method: method.into(),
            params: None,
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Validate that this request conforms to JSON-RPC 2.0.
    pub fn validate(&self) -> Result<(), JsonRpcError> {
        if self.jsonrpc != JSONRPC_VERSION {
            return Err(JsonRpcError::invalid_request(format!(
                "Invalid JSON-RPC version: expected '{}', got '{}'",
                JSONRPC_VERSION, self.jsonrpc
            )));
        }
        Ok(())
    }
}

/// JSON-RPC 2.0 response (success)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResultResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    pub result: Value,
}

/// JSON-RPC 2.0 response (error)
///
/// `id` is `null` only when the request could not be decoded far enough to
/// recover one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorResponse {
    pub jsonrpc: String,
    pub id: Option<RequestId>,
    pub error: JsonRpcError,
}

/// JSON-RPC 2.0 response: exactly one of `result` or `error`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcResponse {
    Result(JsonRpcResultResponse),
    Error(JsonRpcErrorResponse),
}

impl JsonRpcResponse {
    pub fn result(id: RequestId, result: Value) -> Self {
        Self::Result(JsonRpcResultResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
        })
    }

    pub fn error(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self::Error(JsonRpcErrorResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error,
        })
    }

    pub fn id(&self) -> Option<&RequestId> {
        match self {
            JsonRpcResponse::Result(r) => Some(&r.id),
            JsonRpcResponse::Error(e) => e.id.as_ref(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, JsonRpcResponse::Error(_))
    }

    /// Split into the result payload or the protocol error
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        match self {
            JsonRpcResponse::Result(r) => Ok(r.result),
            JsonRpcResponse::Error(e) => Err(e.error),
        }
    }
}

/// Request identifier, echoed verbatim in the response
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::String(s) => f.write_str(s),
            RequestId::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

impl From<i32> for RequestId {
    fn from(n: i32) -> Self {
        RequestId::Number(n as i64)
    }
}

// =============================================================================
// Categories and methods
// =============================================================================

/// The four independent capability namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Tool,
    Resource,
    PromptTemplate,
    Sample,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Tool,
        Category::Resource,
        Category::PromptTemplate,
        Category::Sample,
    ];

    /// Human-readable name used in error messages
    pub fn label(self) -> &'static str {
        match self {
            Category::Tool => "Tool",
            Category::Resource => "Resource",
            Category::PromptTemplate => "Prompt",
            Category::Sample => "Sample",
        }
    }

    /// Parameter that names the invocation target
    pub fn target_param(self) -> &'static str {
        match self {
            Category::Tool | Category::PromptTemplate => "name",
            Category::Resource | Category::Sample => "uri",
        }
    }

    pub fn list_method(self) -> Method {
        match self {
            Category::Tool => Method::ListTools,
            Category::Resource => Method::ListResources,
            Category::PromptTemplate => Method::ListPrompts,
            Category::Sample => Method::ListSamples,
        }
    }

    pub fn invoke_method(self) -> Method {
        match self {
            Category::Tool => Method::CallTool,
            Category::Resource => Method::ReadResource,
            Category::PromptTemplate => Method::GetPrompt,
            Category::Sample => Method::GetSample,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Recognized request methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    ListTools,
    CallTool,
    ListResources,
    ReadResource,
    ListPrompts,
    GetPrompt,
    ListSamples,
    GetSample,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::ListTools,
        Method::CallTool,
        Method::ListResources,
        Method::ReadResource,
        Method::ListPrompts,
        Method::GetPrompt,
        Method::ListSamples,
        Method::GetSample,
    ];

    /// Canonical wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Method::ListTools => "tools/list",
            Method::CallTool => "tools/call",
            Method::ListResources => "resources/list",
            Method::ReadResource => "resources/read",
            Method::ListPrompts => "prompts/list",
            Method::GetPrompt => "prompts/get",
            Method::ListSamples => "samples/list",
            Method::GetSample => "samples/get",
        }
    }

    /// Hyphenated alias accepted on input
    pub fn alias(self) -> &'static str {
        match self {
            Method::ListTools => "list-tools",
            Method::CallTool => "call-tool",
            Method::ListResources => "list-resources",
            Method::ReadResource => "read-resource",
            Method::ListPrompts => "list-prompts",
            Method::GetPrompt => "get-prompt",
            Method::ListSamples => "list-samples",
            Method::GetSample => "get-sample",
        }
    }

    pub fn category(self) -> Category {
        match self {
            Method::ListTools | Method::CallTool => Category::Tool,
            Method::ListResources | Method::ReadResource => Category::Resource,
            Method::ListPrompts | Method::GetPrompt => Category::PromptTemplate,
            Method::ListSamples | Method::GetSample => Category::Sample,
        }
    }

    pub fn is_list(self) -> bool {
        matches!(
            self,
            Method::ListTools | Method::ListResources | Method::ListPrompts | Method::ListSamples
        )
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = JsonRpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == s || m.alias() == s)
            .ok_or_else(|| JsonRpcError::method_not_found(s))
    }
}

// =============================================================================
// Typed requests
// =============================================================================

/// Parameters of an invoke-style method.
///
/// Tools and prompts are addressed by `name`, resources and samples by `uri`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvokeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

impl InvokeParams {
    pub fn new(category: Category, target: impl Into<String>) -> Self {
        let target = target.into();
        match category {
            Category::Tool | Category::PromptTemplate => Self {
                name: Some(target),
                ..Default::default()
            },
            Category::Resource | Category::Sample => Self {
                uri: Some(target),
                ..Default::default()
            },
        }
    }

    pub fn with_arguments(mut self, arguments: Value) -> Self {
        self.arguments = Some(arguments);
        self
    }

    pub fn target(&self, category: Category) -> Option<&str> {
        match category {
            Category::Tool | Category::PromptTemplate => self.name.as_deref(),
            Category::Resource | Category::Sample => self.uri.as_deref(),
        }
    }
}

/// A decoded request, ready for routing
#[derive(Debug, Clone, PartialEq)]
pub enum McpRequest {
    List(Category),
    Invoke {
        category: Category,
        target: String,
        arguments: Value,
    },
}

impl McpRequest {
    /// Parse from a JSON-RPC request
    pub fn from_jsonrpc(req: &JsonRpcRequest) -> Result<Self, JsonRpcError> {
        let method: Method = req.method.parse()?;
        let category = method.category();

        if method.is_list() {
            return Ok(McpRequest::List(category));
        }

        let params: InvokeParams = match &req.params {
            Some(params) => serde_json::from_value(params.clone())
                .map_err(|e| JsonRpcError::invalid_params(e.to_string()))?,
            None => InvokeParams::default(),
        };

        let target = params
            .target(category)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                JsonRpcError::invalid_params(format!(
                    "Missing '{}' parameter for {}",
                    category.target_param(),
                    method
                ))
            })?
            .to_string();

        Ok(McpRequest::Invoke {
            category,
            target,
            arguments: params
                .arguments
                .unwrap_or_else(|| Value::Object(Default::default())),
        })
    }

    pub fn method(&self) -> Method {
        match self {
            McpRequest::List(category) => category.list_method(),
            McpRequest::Invoke { category, .. } => category.invoke_method(),
        }
    }
}

/// Successful routing outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum McpResponse {
    List(ListResult),
    Capability(CapabilityResult),
}

// =============================================================================
// Results
// =============================================================================

/// Public metadata of a registered capability. Never carries the handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub input_schema: Value,
}

/// Result of a list-style method, keyed by category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListResult {
    Tools(Vec<CapabilityDefinition>),
    Resources(Vec<CapabilityDefinition>),
    Prompts(Vec<CapabilityDefinition>),
    Samples(Vec<CapabilityDefinition>),
}

impl ListResult {
    pub fn new(category: Category, definitions: Vec<CapabilityDefinition>) -> Self {
        match category {
            Category::Tool => ListResult::Tools(definitions),
            Category::Resource => ListResult::Resources(definitions),
            Category::PromptTemplate => ListResult::Prompts(definitions),
            Category::Sample => ListResult::Samples(definitions),
        }
    }

    pub fn definitions(&self) -> &[CapabilityDefinition] {
        match self {
            ListResult::Tools(d)
            | ListResult::Resources(d)
            | ListResult::Prompts(d)
            | ListResult::Samples(d) => d,
        }
    }
}

/// Result of invoking a capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityResult {
    pub content: Vec<Content>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl CapabilityResult {
    /// Create a text result
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(text)],
            is_error: false,
        }
    }

    /// Create a handled-failure result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(message)],
            is_error: true,
        }
    }

    /// Create a result carrying a resource body
    pub fn resource(resource: ResourceContent) -> Self {
        Self {
            content: vec![Content::Resource { resource }],
            is_error: false,
        }
    }

    /// Concatenated text of all text-bearing content items
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(Content::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Content item, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Text {
        text: String,
    },
    Resource {
        resource: ResourceContent,
    },
    /// A content type this build does not know about
    #[serde(other)]
    Unsupported,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text { text } => Some(text),
            Content::Resource { resource } => Some(&resource.text),
            Content::Unsupported => None,
        }
    }
}

/// Body of a resource or sample read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContent {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_round_trip_and_aliases() {
        for method in Method::ALL {
            assert_eq!(method.as_str().parse::<Method>().unwrap(), method);
            assert_eq!(method.alias().parse::<Method>().unwrap(), method);
        }
        let err = "tools/delete".parse::<Method>().unwrap_err();
        assert_eq!(err.message, "Method not found: tools/delete");
    }

    #[test]
    fn test_every_method_maps_to_one_category() {
        for category in Category::ALL {
            assert_eq!(category.list_method().category(), category);
            assert_eq!(category.invoke_method().category(), category);
            assert!(category.list_method().is_list());
            assert!(!category.invoke_method().is_list());
        }
    }

    #[test]
    fn test_request_id_untagged() {
        let id: RequestId = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(id, RequestId::Number(7));
        let id: RequestId = serde_json::from_value(json!("abc")).unwrap();
        assert_eq!(id, RequestId::String("abc".into()));
        assert_eq!(RequestId::Number(3).to_string(), "3");
    }

    #[test]
    fn test_parse_invoke_request() {
        let req = JsonRpcRequest::new(1, "tools/call").with_params(json!({
            "name": "file_read",
            "arguments": {"path": "/tmp/x"}
        }));
        let parsed = McpRequest::from_jsonrpc(&req).unwrap();
        assert_eq!(
            parsed,
            McpRequest::Invoke {
                category: Category::Tool,
                target: "file_read".into(),
                arguments: json!({"path": "/tmp/x"}),
            }
        );
        assert_eq!(parsed.method(), Method::CallTool);
    }

    #[test]
    fn test_parse_invoke_defaults_arguments() {
        let req = JsonRpcRequest::new(2, "read-resource")
            .with_params(json!({"uri": "resource://system/info"}));
        let parsed = McpRequest::from_jsonrpc(&req).unwrap();
        assert_eq!(
            parsed,
            McpRequest::Invoke {
                category: Category::Resource,
                target: "resource://system/info".into(),
                arguments: json!({}),
            }
        );
    }

    #[test]
    fn test_parse_invoke_requires_target_for_category() {
        // A resource is addressed by uri, not name
        let req = JsonRpcRequest::new(3, "resources/read").with_params(json!({"name": "x"}));
        let err = McpRequest::from_jsonrpc(&req).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidParams.code());
        assert!(err.message.contains("'uri'"));
    }

    #[test]
    fn test_list_result_shape() {
        let list = ListResult::new(
            Category::Tool,
            vec![CapabilityDefinition {
                name: "echo".into(),
                uri: None,
                description: Some("Echo".into()),
                mime_type: None,
                input_schema: json!({"type": "object"}),
            }],
        );
        let value = serde_json::to_value(&list).unwrap();
        assert_eq!(
            value,
            json!({"tools": [{"name": "echo", "description": "Echo", "inputSchema": {"type": "object"}}]})
        );
    }

    #[test]
    fn test_capability_result_is_error_default() {
        let ok = serde_json::to_value(CapabilityResult::text("hi")).unwrap();
        assert_eq!(ok, json!({"content": [{"type": "text", "text": "hi"}]}));

        let err = serde_json::to_value(CapabilityResult::error("boom")).unwrap();
        assert_eq!(err["isError"], json!(true));

        let parsed: CapabilityResult =
            serde_json::from_value(json!({"content": [{"type": "text", "text": "hi"}]})).unwrap();
        assert!(!parsed.is_error);
    }

    #[test]
    fn test_unknown_content_type_is_tolerated() {
        let parsed: CapabilityResult = serde_json::from_value(json!({
            "content": [
                {"type": "image", "data": "...", "mimeType": "image/png"},
                {"type": "text", "text": "caption"}
            ]
        }))
        .unwrap();
        assert_eq!(parsed.content[0], Content::Unsupported);
        assert_eq!(parsed.joined_text(), "caption");
    }

    #[test]
    fn test_error_response_serializes_null_id() {
        let resp = JsonRpcResponse::error(None, JsonRpcError::parse_error("bad json"));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["id"], Value::Null);
        assert!(value.get("result").is_none());
    }
}
