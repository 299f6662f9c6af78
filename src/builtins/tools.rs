//! Built-in tools: `file_read`, `file_write` and `web_search`.
//!
//! File failures are handled results (`is_error: true`), not protocol errors.

use std::path::Path;

use schemars::JsonSchema;
use serde::Deserialize;

use crate::capability::{Capability, CapabilityBuilder};
use crate::error::RegistryError;
use crate::protocol::CapabilityResult;

/// Number of results `web_search` returns unless told otherwise
pub const DEFAULT_MAX_RESULTS: usize = 5;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FileReadInput {
    /// 文件路径
    pub path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FileWriteInput {
    /// 文件路径
    pub path: String,
    /// 要写入的内容
    pub content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WebSearchInput {
    /// 搜索查询
    pub query: String,
    /// 最大结果数量 (0 means the default)
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

pub fn file_read() -> Result<Capability, RegistryError> {
    CapabilityBuilder::tool("file_read")
        .description("读取文件内容")
        .handler(|input: FileReadInput| async move {
            Ok(match tokio::fs::read_to_string(&input.path).await {
                Ok(content) => CapabilityResult::text(content),
                Err(e) => {
                    tracing::debug!(path = %input.path, error = %e, "file_read failed");
                    CapabilityResult::error(format!("读取文件失败: {}", e))
                }
            })
        })
        .build()
}

pub fn file_write() -> Result<Capability, RegistryError> {
    CapabilityBuilder::tool("file_write")
        .description("写入文件内容")
        .handler(|input: FileWriteInput| async move {
            Ok(match write_creating_parents(&input.path, &input.content).await {
                Ok(()) => CapabilityResult::text(format!("文件已成功写入: {}", input.path)),
                Err(e) => {
                    tracing::debug!(path = %input.path, error = %e, "file_write failed");
                    CapabilityResult::error(format!("写入文件失败: {}", e))
                }
            })
        })
        .build()
}

async fn write_creating_parents(path: &str, content: &str) -> std::io::Result<()> {
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await
}

pub fn web_search() -> Result<Capability, RegistryError> {
    CapabilityBuilder::tool("web_search")
        .description("执行网络搜索")
        .handler(|input: WebSearchInput| async move {
            let max_results = match input.max_results {
                0 => DEFAULT_MAX_RESULTS,
                n => n,
            };
            Ok(CapabilityResult::text(search_results(&input.query, max_results)))
        })
        .build()
}

/// Mock search backend
fn search_results(query: &str, max_results: usize) -> String {
    let results = [
        format!("搜索结果 1: 关于 \"{}\" 的信息", query),
        format!("搜索结果 2: {} 的详细解释", query),
        format!("搜索结果 3: {} 的相关资源", query),
    ];
    let shown: Vec<&str> = results
        .iter()
        .take(max_results)
        .map(String::as_str)
        .collect();
    format!("搜索 \"{}\" 的结果:\n{}", query, shown.join("\n"))
}

pub fn all() -> Result<Vec<Capability>, RegistryError> {
    Ok(vec![file_read()?, file_write()?, web_search()?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_then_read_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/note.txt");
        let path = path.to_str().unwrap();

        let written = file_write()
            .unwrap()
            .invoke(json!({"path": path, "content": "第一行\nsecond line"}))
            .await
            .unwrap();
        assert!(!written.is_error);
        assert_eq!(written.joined_text(), format!("文件已成功写入: {}", path));

        let read = file_read()
            .unwrap()
            .invoke(json!({"path": path}))
            .await
            .unwrap();
        assert!(!read.is_error);
        assert_eq!(read.joined_text(), "第一行\nsecond line");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_handled_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");

        let result = file_read()
            .unwrap()
            .invoke(json!({"path": path.to_str().unwrap()}))
            .await
            .unwrap();
        assert!(result.is_error);
        assert!(result.joined_text().starts_with("读取文件失败: "));
    }

    #[tokio::test]
    async fn test_write_into_a_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let path = blocker.join("child.txt");

        let result = file_write()
            .unwrap()
            .invoke(json!({"path": path.to_str().unwrap(), "content": "y"}))
            .await
            .unwrap();
        assert!(result.is_error);
        assert!(result.joined_text().starts_with("写入文件失败: "));
    }

    #[test]
    fn test_search_results_truncation() {
        let text = search_results("rust", 5);
        assert_eq!(
            text,
            "搜索 \"rust\" 的结果:\n搜索结果 1: 关于 \"rust\" 的信息\n搜索结果 2: rust 的详细解释\n搜索结果 3: rust 的相关资源"
        );
        assert_eq!(search_results("rust", 1).lines().count(), 2);
    }

    #[tokio::test]
    async fn test_web_search_defaults_max_results() {
        let result = web_search()
            .unwrap()
            .invoke(json!({"query": "tokio"}))
            .await
            .unwrap();
        assert_eq!(result.joined_text().lines().count(), 4);
    }

    #[tokio::test]
    async fn test_web_search_zero_max_results_uses_default() {
        let result = web_search()
            .unwrap()
            .invoke(json!({"query": "tokio", "max_results": 0}))
            .await
            .unwrap();
        assert_eq!(result.joined_text().lines().count(), 4);
    }

    #[test]
    fn test_input_contracts() {
        let tool = file_write().unwrap();
        assert_eq!(tool.input_schema()["required"], json!(["path", "content"]));

        let tool = web_search().unwrap();
        assert_eq!(tool.input_schema()["required"], json!(["query"]));
    }
}
