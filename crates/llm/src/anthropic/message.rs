use serde::Deserialize;
use serde_json::Value;

/// Turn author. The gateway only ever sees the two roles a client may submit;
/// anything else is a client error caught at deserialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One dialogue turn.
#[derive(Debug, Clone, Deserialize)]
pub struct InputMessage {
    pub role: Role,
    pub content: MessageContent,
}

/// A turn's content is either a bare string (implicitly one text block) or a sequence
/// of typed blocks.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl MessageContent {
    /// View this content as a slice of blocks, wrapping a bare string as a single text
    /// block so callers never special-case the untagged form.
    pub fn as_blocks(&self) -> Vec<ContentBlock> {
        match self {
            MessageContent::Text(text) => vec![ContentBlock::Text { text: text.clone() }],
            MessageContent::Blocks(blocks) => blocks.clone(),
        }
    }
}

/// A typed content block inside a message turn.
///
/// `Unknown` absorbs block kinds the gateway does not translate (thinking blocks,
/// server-tool results, redacted thinking, ...) so a forward-compatible client never
/// fails to deserialise; the translator simply skips them.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Image {
        source: ImageSource,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        #[serde(default)]
        content: Option<Value>,
        #[serde(default)]
        is_error: bool,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub media_type: String,
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_string_content_becomes_single_text_block() {
        let content = MessageContent::Text("hi".to_string());
        let blocks = content.as_blocks();
        assert_eq!(blocks.len(), 1);
        assert!(matches!(&blocks[0], ContentBlock::Text { text } if text == "hi"));
    }

    #[test]
    fn unrecognised_block_type_deserialises_as_unknown() {
        let block: ContentBlock = serde_json::from_str(r#"{"type":"thinking","thinking":"..."}"#).unwrap();
        assert!(matches!(block, ContentBlock::Unknown));
    }
}
