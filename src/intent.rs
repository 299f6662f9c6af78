//! Intent parser: turns chat input into built-in tool calls.
//!
//! Recognized prefixes:
//!
//! - `/read <path>`
//! - `/write <path> <content...>`
//! - `/search <query>`
//!
//! Anything else is not an intent and goes to the chat fallback.

use serde_json::{Value, json};

use crate::builtins::tools::DEFAULT_MAX_RESULTS;
use crate::protocol::{Category, InvokeParams, Method};

/// A parsed user request for a built-in tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    ReadFile { path: String },
    WriteFile { path: String, content: String },
    Search { query: String, max_results: usize },
}

impl Intent {
    /// Parse trimmed user input. Returns `None` when no prefix matches or the
    /// required argument is empty.
    pub fn parse(text: &str) -> Option<Intent> {
        let text = text.trim();

        if let Some(rest) = text.strip_prefix("/read ") {
            let path = rest.trim();
            return (!path.is_empty()).then(|| Intent::ReadFile {
                path: path.to_string(),
            });
        }

        if let Some(rest) = text.strip_prefix("/write ") {
            let rest = rest.trim_start();
            let (path, content) = rest.split_once(' ').unwrap_or((rest, ""));
            return (!path.is_empty()).then(|| Intent::WriteFile {
                path: path.to_string(),
                content: content.to_string(),
            });
        }

        if let Some(rest) = text.strip_prefix("/search ") {
            let query = rest.trim();
            return (!query.is_empty()).then(|| Intent::Search {
                query: query.to_string(),
                max_results: DEFAULT_MAX_RESULTS,
            });
        }

        None
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            Intent::ReadFile { .. } => "file_read",
            Intent::WriteFile { .. } => "file_write",
            Intent::Search { .. } => "web_search",
        }
    }

    pub fn method(&self) -> Method {
        Category::Tool.invoke_method()
    }

    pub fn arguments(&self) -> Value {
        match self {
            Intent::ReadFile { path } => json!({ "path": path }),
            Intent::WriteFile { path, content } => json!({ "path": path, "content": content }),
            Intent::Search { query, max_results } => {
                json!({ "query": query, "max_results": max_results })
            }
        }
    }

    /// Request params for the tool call this intent maps to
    pub fn params(&self) -> InvokeParams {
        InvokeParams::new(Category::Tool, self.tool_name()).with_arguments(self.arguments())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read() {
        assert_eq!(
            Intent::parse("/read /tmp/missing.txt"),
            Some(Intent::ReadFile {
                path: "/tmp/missing.txt".into()
            })
        );
    }

    #[test]
    fn test_write_keeps_content_spacing() {
        assert_eq!(
            Intent::parse("/write notes/a.txt hello   world "),
            Some(Intent::WriteFile {
                path: "notes/a.txt".into(),
                content: "hello   world".into()
            })
        );
        assert_eq!(
            Intent::parse("/write empty.txt"),
            Some(Intent::WriteFile {
                path: "empty.txt".into(),
                content: String::new()
            })
        );
    }

    #[test]
    fn test_search_defaults() {
        let intent = Intent::parse("/search rust async").unwrap();
        assert_eq!(
            intent,
            Intent::Search {
                query: "rust async".into(),
                max_results: 5
            }
        );
        assert_eq!(intent.tool_name(), "web_search");
        assert_eq!(
            intent.arguments(),
            json!({"query": "rust async", "max_results": 5})
        );
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(Intent::parse("hello there"), None);
        assert_eq!(Intent::parse("/reading list"), None);
        assert_eq!(Intent::parse("/read"), None);
        assert_eq!(Intent::parse("/read    "), None);
        assert_eq!(Intent::parse("/search "), None);
        assert_eq!(Intent::parse("/delete x"), None);
    }

    #[test]
    fn test_params_target_the_tool() {
        let intent = Intent::parse("/read a.txt").unwrap();
        assert_eq!(intent.method(), Method::CallTool);
        let params = intent.params();
        assert_eq!(params.target(Category::Tool), Some("file_read"));
        assert_eq!(params.arguments, Some(json!({"path": "a.txt"})));
    }
}
