//! Integration tests for deepseek-mcp
//!
//! Drives the built-in dispatcher through tower's `ServiceExt` and the
//! client over an in-memory pipe.

use deepseek_mcp::error::ErrorCode;
use deepseek_mcp::{
    Category, Dispatcher, Error, Intent, JsonRpcRequest, JsonRpcResponse, ListResult, McpClient,
    RequestId, StdioTransport, builtins,
};
use serde_json::{Value, json};
use tower::ServiceExt;

// =============================================================================
// Test fixtures
// =============================================================================

fn dispatcher() -> Dispatcher {
    builtins::dispatcher().expect("built-in registry")
}

async fn call(request: JsonRpcRequest) -> JsonRpcResponse {
    dispatcher().oneshot(request).await.unwrap()
}

fn expect_result(response: JsonRpcResponse) -> Value {
    match response {
        JsonRpcResponse::Result(r) => r.result,
        JsonRpcResponse::Error(e) => panic!("expected result, got error: {:?}", e.error),
    }
}

fn expect_error(response: JsonRpcResponse) -> (i32, String) {
    match response {
        JsonRpcResponse::Error(e) => (e.error.code, e.error.message),
        JsonRpcResponse::Result(r) => panic!("expected error, got result: {}", r.result),
    }
}

/// A client wired to an in-process pipe server
fn pipe_client() -> McpClient {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_io);
    tokio::spawn(StdioTransport::new(dispatcher()).serve(server_read, server_write));
    let (client_read, client_write) = tokio::io::split(client_io);
    McpClient::from_streams(client_read, client_write)
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_tools_returns_builtin_definitions() {
    let result = expect_result(call(JsonRpcRequest::new(1, "tools/list")).await);
    let tools = result["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["file_read", "file_write", "web_search"]);

    let file_read = &tools[0];
    assert_eq!(file_read["description"], "读取文件内容");
    assert_eq!(file_read["inputSchema"]["type"], "object");
    assert_eq!(file_read["inputSchema"]["required"], json!(["path"]));
}

#[tokio::test]
async fn test_list_aliases_match_canonical_names() {
    for method in deepseek_mcp::Method::ALL.into_iter().filter(|m| m.is_list()) {
        let canonical = expect_result(call(JsonRpcRequest::new(1, method.as_str())).await);
        let alias = expect_result(call(JsonRpcRequest::new(1, method.alias())).await);
        assert_eq!(canonical, alias, "{} vs {}", method.as_str(), method.alias());
    }
}

#[tokio::test]
async fn test_list_every_category() {
    let resources = expect_result(call(JsonRpcRequest::new(1, "resources/list")).await);
    assert_eq!(resources["resources"][0]["uri"], "resource://system/info");
    assert_eq!(resources["resources"][0]["mimeType"], "text/plain");

    let prompts = expect_result(call(JsonRpcRequest::new(2, "prompts/list")).await);
    assert_eq!(prompts["prompts"][0]["name"], "code_review");

    let samples = expect_result(call(JsonRpcRequest::new(3, "samples/list")).await);
    assert_eq!(samples["samples"][0]["name"], "python_hello_world");
}

// =============================================================================
// Invocation
// =============================================================================

#[tokio::test]
async fn test_call_web_search() {
    let request = JsonRpcRequest::new(7, "tools/call").with_params(json!({
        "name": "web_search",
        "arguments": {"query": "tower", "max_results": 2}
    }));
    let response = call(request).await;
    assert_eq!(response.id(), Some(&RequestId::Number(7)));

    let result = expect_result(response);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("搜索 \"tower\" 的结果:"));
    assert_eq!(text.lines().count(), 3);
    assert!(result.get("isError").is_none());
}

#[tokio::test]
async fn test_read_resource_and_get_prompt() {
    let resource = expect_result(
        call(JsonRpcRequest::new(1, "resources/read").with_params(json!({
            "uri": "resource://system/info"
        })))
        .await,
    );
    assert_eq!(resource["content"][0]["type"], "resource");
    assert_eq!(resource["content"][0]["resource"]["mimeType"], "text/plain");

    let prompt = expect_result(
        call(JsonRpcRequest::new(2, "prompts/get").with_params(json!({
            "name": "code_review",
            "arguments": {"code": "fn main() {}", "language": "rust"}
        })))
        .await,
    );
    let text = prompt["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("rust"));
    assert!(text.contains("fn main() {}"));
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_unknown_method() {
    let (code, message) = expect_error(call(JsonRpcRequest::new(1, "tools/explode")).await);
    assert_eq!(code, ErrorCode::MethodNotFound.code());
    assert_eq!(message, "Method not found: tools/explode");
}

#[tokio::test]
async fn test_unknown_tool() {
    let request = JsonRpcRequest::new(1, "tools/call").with_params(json!({"name": "nope"}));
    let (code, message) = expect_error(call(request).await);
    assert_eq!(code, ErrorCode::NotFound.code());
    assert_eq!(message, "Tool not found: nope");
}

#[tokio::test]
async fn test_missing_target_is_invalid_params() {
    let request = JsonRpcRequest::new(1, "resources/read").with_params(json!({}));
    let (code, _) = expect_error(call(request).await);
    assert_eq!(code, ErrorCode::InvalidParams.code());
}

#[tokio::test]
async fn test_malformed_arguments_are_invalid_params() {
    let request = JsonRpcRequest::new(1, "tools/call").with_params(json!({
        "name": "file_read",
        "arguments": {"path": 42}
    }));
    let (code, message) = expect_error(call(request).await);
    assert_eq!(code, ErrorCode::InvalidParams.code());
    assert!(message.starts_with("Invalid arguments:"));
}

#[tokio::test]
async fn test_wrong_jsonrpc_version() {
    let mut request = JsonRpcRequest::new(1, "tools/list");
    request.jsonrpc = "1.0".to_string();
    let (code, _) = expect_error(call(request).await);
    assert_eq!(code, ErrorCode::InvalidRequest.code());
}

// =============================================================================
// Client over the pipe binding
// =============================================================================

#[tokio::test]
async fn test_read_missing_file_is_handled_failure() {
    let client = pipe_client();
    let intent = Intent::parse("/read /tmp/missing.txt").unwrap();

    let reply = client.dispatch(intent).await.unwrap();
    assert_eq!(reply.id(), &RequestId::Number(1));

    let result = reply.capability_result().await.unwrap();
    assert!(result.is_error);
    assert!(result.joined_text().starts_with("读取文件失败: "));
}

#[tokio::test]
async fn test_write_then_read_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/notes.txt");
    let path = path.to_str().unwrap();
    let client = pipe_client();

    let written = client
        .call(Intent::parse(&format!("/write {} hello from the pipe", path)).unwrap())
        .await
        .unwrap();
    assert!(!written.is_error);
    assert_eq!(written.joined_text(), format!("文件已成功写入: {}", path));

    let read = client
        .call(Intent::parse(&format!("/read {}", path)).unwrap())
        .await
        .unwrap();
    assert_eq!(read.joined_text(), "hello from the pipe");
}

#[tokio::test]
async fn test_concurrent_calls_on_one_pipe_are_correlated() {
    let client = pipe_client();
    let queries = ["alpha", "beta", "gamma", "delta"];

    let replies = futures::future::join_all(queries.iter().map(|q| {
        let client = &client;
        async move {
            client
                .call(Intent::parse(&format!("/search {}", q)).unwrap())
                .await
                .unwrap()
        }
    }))
    .await;

    for (query, result) in queries.iter().zip(replies) {
        assert!(result.joined_text().contains(&format!("\"{}\"", query)));
    }
    assert_eq!(client.correlator().in_flight(), 0);
}

#[tokio::test]
async fn test_client_list_and_protocol_errors() {
    let client = pipe_client();

    let tools = client.list(Category::Tool).await.unwrap();
    assert!(matches!(tools, ListResult::Tools(_)));
    assert_eq!(tools.definitions().len(), 3);

    let err = client
        .invoke(Category::PromptTemplate, "missing_prompt", json!({}))
        .await
        .unwrap_err();
    match err {
        Error::JsonRpc(e) => {
            assert_eq!(e.code, ErrorCode::NotFound.code());
            assert_eq!(e.message, "Prompt not found: missing_prompt");
        }
        other => panic!("expected protocol error, got {:?}", other),
    }
}
