use serde::Deserialize;
use serde_json::Value;

use super::{InputMessage, Tool, ToolChoice};
use crate::unknown_fields::UnknownFields;

/// An inbound Dialect A chat request.
///
/// Every field the gateway doesn't translate (`metadata`, `container`,
/// `context_management`, `thinking`, ...) lands in `unknown_fields` rather than
/// rejecting the request, matching how a forward-compatible Messages-API client is
/// expected to be served.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<InputMessage>>,
    #[serde(default)]
    pub system: Option<SystemPrompt>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub top_k: Option<u32>,
    #[serde(default)]
    pub stop_sequences: Vec<String>,
    #[serde(default)]
    pub tools: Vec<Tool>,
    #[serde(default)]
    pub tool_choice: Option<ToolChoice>,
    #[serde(default)]
    pub response_format: Option<ResponseFormat>,
    #[serde(default)]
    pub stream: bool,
    /// Accepted so a forward-compatible client doesn't get a parse error; the
    /// auxiliary-tool bridge it would configure is not shipped.
    #[serde(default)]
    pub mcp_servers: Option<Value>,
    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

/// System prompt: either a bare string or an array of text blocks to join.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SystemPrompt {
    Text(String),
    Blocks(Vec<SystemBlock>),
}

impl SystemPrompt {
    /// Flatten to the single instruction string the upstream's `system_instruction`
    /// expects, joining blocks with a blank line.
    pub fn joined_text(&self) -> String {
        match self {
            SystemPrompt::Text(text) => text.clone(),
            SystemPrompt::Blocks(blocks) => blocks
                .iter()
                .map(|b| b.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Structured-output directive.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: ResponseFormatKind,
    #[serde(default)]
    pub schema: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormatKind {
    JsonObject,
    JsonSchema,
    #[serde(other)]
    Unknown,
}
