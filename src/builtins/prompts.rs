//! Built-in prompt template `code_review`

use schemars::JsonSchema;
use serde::Deserialize;

use crate::capability::{Capability, CapabilityBuilder};
use crate::error::RegistryError;
use crate::protocol::CapabilityResult;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CodeReviewInput {
    /// 要审查的代码
    pub code: String,
    /// 编程语言
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "text".to_string()
}

pub fn code_review() -> Result<Capability, RegistryError> {
    CapabilityBuilder::prompt("code_review")
        .description("代码审查提示模板")
        .handler(|input: CodeReviewInput| async move {
            Ok(CapabilityResult::text(render(&input.code, &input.language)))
        })
        .build()
}

fn render(code: &str, language: &str) -> String {
    format!(
        "请对以下{language}代码进行审查:\n```{language}\n{code}\n```\n请提供改进建议和潜在问题。"
    )
}

pub fn all() -> Result<Vec<Capability>, RegistryError> {
    Ok(vec![code_review()?])
}
