//! Request Translator (component B): Dialect A request → Dialect G request.

use std::collections::HashMap;

use serde_json::Value;

use crate::anthropic::{self, ContentBlock, InputMessage, Role, Tool as DialectATool, ToolChoice};
use crate::error::{GatewayError, Result};
use crate::google::{
    self, Content, FunctionCallingConfig, FunctionCallingMode, FunctionDeclaration, GenerationConfig, Part,
    SafetySetting, SystemInstruction, Tool as DialectGTool, ToolConfig,
};
use crate::schema;

const DEFAULT_MAX_TOKENS: u32 = 4096;
const MIN_MAX_TOKENS: u32 = 100;

/// Translate a Dialect A request into a Dialect G request. Never mutates `request`.
pub fn translate_request(request: &anthropic::Request) -> Result<google::GenerateRequest> {
    let messages = request
        .messages
        .as_ref()
        .filter(|messages| !messages.is_empty())
        .ok_or_else(|| GatewayError::Validation("messages is required".to_string()))?;

    let tool_use_names = index_tool_use_names(messages);
    let (contents, has_function_response) = translate_messages(messages, &tool_use_names);

    let system_instruction = request
        .system
        .as_ref()
        .map(|system| SystemInstruction { parts: vec![Part::Text { text: system.joined_text() }] });

    let max_tokens = request.max_tokens.filter(|&tokens| tokens >= MIN_MAX_TOKENS).unwrap_or(DEFAULT_MAX_TOKENS);
    let generation_config = Some(build_generation_config(request, max_tokens));

    let tools = if has_function_response || request.tools.is_empty() {
        None
    } else {
        Some(vec![DialectGTool {
            function_declarations: request.tools.iter().map(translate_tool).collect(),
        }])
    };

    let tool_config = request.tool_choice.as_ref().map(translate_tool_choice);

    Ok(google::GenerateRequest {
        contents,
        system_instruction,
        generation_config,
        safety_settings: SafetySetting::permissive_vector(),
        tools,
        tool_config,
    })
}

/// Map every `tool_use` block's id to its name, so a later `tool_result` can resolve
/// the function it answers without carrying the name itself.
fn index_tool_use_names(messages: &[InputMessage]) -> HashMap<String, String> {
    let mut names = HashMap::new();
    for message in messages {
        for block in message.content.as_blocks() {
            if let ContentBlock::ToolUse { id, name, .. } = block {
                names.insert(id, name);
            }
        }
    }
    names
}

fn translate_messages(messages: &[InputMessage], tool_use_names: &HashMap<String, String>) -> (Vec<Content>, bool) {
    let mut contents: Vec<Content> = Vec::new();
    let mut has_function_response = false;

    for message in messages {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "model",
        };

        let mut parts = Vec::new();
        for block in message.content.as_blocks() {
            match block {
                ContentBlock::Text { text } => parts.push(Part::Text { text }),
                ContentBlock::Image { source } => parts.push(Part::InlineData {
                    inline_data: google::InlineData { mime_type: source.media_type, data: source.data },
                }),
                ContentBlock::ToolUse { name, input, .. } => {
                    parts.push(Part::FunctionCall { function_call: google::FunctionCall { name, args: input } })
                }
                ContentBlock::ToolResult { tool_use_id, content, is_error } => {
                    has_function_response = true;
                    let name = tool_use_names.get(&tool_use_id).cloned().unwrap_or_else(|| {
                        log::error!("no tool_use found for tool_use_id {tool_use_id}; forwarding raw id as function name");
                        tool_use_id.clone()
                    });
                    let response = build_function_response(&content, is_error);
                    parts.push(Part::FunctionResponse { function_response: google::FunctionResponse { name, response } });
                }
                ContentBlock::Unknown => {}
            }
        }

        if parts.is_empty() {
            continue;
        }

        match contents.last_mut() {
            Some(last) if last.role == role => last.parts.extend(parts),
            _ => contents.push(Content { role: role.to_string(), parts }),
        }
    }

    (contents, has_function_response)
}

fn build_function_response(content: &Option<Value>, is_error: bool) -> Value {
    let mut response = match content {
        None => serde_json::json!({ "result": Value::Null }),
        Some(Value::String(text)) => serde_json::json!({ "result": text }),
        Some(Value::Array(items)) => serde_json::json!({ "result": items }),
        Some(Value::Object(map)) => Value::Object(map.clone()),
        Some(other) => serde_json::json!({ "result": other.to_string() }),
    };

    if is_error && let Value::Object(map) = &mut response {
        let message = match content {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        map.insert("error".to_string(), Value::Bool(true));
        map.insert("error_message".to_string(), Value::String(message));
    }

    response
}

fn translate_tool(tool: &DialectATool) -> FunctionDeclaration {
    FunctionDeclaration {
        name: tool.name.clone(),
        description: tool.description.clone(),
        parameters: schema::sanitize(&tool.input_schema),
    }
}

fn translate_tool_choice(choice: &ToolChoice) -> ToolConfig {
    let (mode, allowed_function_names) = match choice {
        ToolChoice::Auto | ToolChoice::Unknown => (FunctionCallingMode::Auto, Vec::new()),
        ToolChoice::Any => (FunctionCallingMode::Any, Vec::new()),
        ToolChoice::Tool { name } => (FunctionCallingMode::Any, vec![name.clone()]),
        ToolChoice::None => (FunctionCallingMode::None, Vec::new()),
    };

    ToolConfig { function_calling_config: FunctionCallingConfig { mode, allowed_function_names } }
}

fn build_generation_config(request: &anthropic::Request, max_tokens: u32) -> GenerationConfig {
    let mut config = GenerationConfig {
        max_output_tokens: Some(max_tokens),
        temperature: request.temperature,
        top_p: request.top_p,
        top_k: request.top_k,
        stop_sequences: request.stop_sequences.clone(),
        ..Default::default()
    };

    if let Some(format) = &request.response_format {
        match format.kind {
            anthropic::ResponseFormatKind::JsonObject | anthropic::ResponseFormatKind::JsonSchema => {
                config.response_mime_type = Some("application/json".to_string());
                config.response_json_schema = format.schema.as_ref().map(schema::sanitize);
            }
            anthropic::ResponseFormatKind::Unknown => {}
        }
    }

    config
}
