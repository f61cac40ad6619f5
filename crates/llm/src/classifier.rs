//! Request classifier (component F): labels an inbound request from its first user
//! text and tool count, to decide whether the tool catalog is worth forwarding.

use crate::anthropic::{ContentBlock, InputMessage, Role};

const TITLE_TRIGGERS: &[&str] = &[
    "please write a 5-10 word title",
    "summarize this coding conversation",
];

const TOPIC_TRIGGERS: &[&str] = &["analyze if this message indicates a new conversation topic"];

/// Heuristic markers for an agent's opening self-introduction turn, which carries no
/// tool-use intent of its own.
const WARMUP_MARKERS: &[&str] = &[
    "you are an ai coding assistant",
    "you are acting as an autonomous coding agent",
    "i am an ai coding assistant",
];

const WARMUP_MAX_LEN: usize = 500;
const TOOLS_THRESHOLD: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Title,
    Topic,
    Warmup,
    Tools,
    Normal,
}

impl Classification {
    /// Whether the Proxy Controller should clear the tool catalog before translating.
    pub fn strips_tools(self) -> bool {
        matches!(self, Classification::Title | Classification::Topic | Classification::Warmup)
    }
}

/// Classify a request from its messages and declared tool count.
pub fn classify(messages: &[InputMessage], tool_count: usize) -> Classification {
    if let Some(text) = first_user_text(messages) {
        let lowered = text.to_lowercase();

        if TITLE_TRIGGERS.iter().any(|trigger| lowered.contains(trigger)) {
            return Classification::Title;
        }
        if TOPIC_TRIGGERS.iter().any(|trigger| lowered.contains(trigger)) {
            return Classification::Topic;
        }
        if text.chars().count() < WARMUP_MAX_LEN && WARMUP_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            return Classification::Warmup;
        }
    }

    if tool_count > TOOLS_THRESHOLD {
        return Classification::Tools;
    }

    Classification::Normal
}

fn first_user_text(messages: &[InputMessage]) -> Option<String> {
    let first_user = messages.iter().find(|m| m.role == Role::User)?;

    first_user.content.as_blocks().into_iter().find_map(|block| match block {
        ContentBlock::Text { text } => Some(text),
        _ => None,
    })
}
