//! Stream Translator (component D): one `INIT / STREAMING / DONE` state machine per
//! response, turning parsed upstream chunks into a Dialect A event sequence.
//!
//! Deliberately has no opinion on how chunks arrive (SSE parsing, timeouts,
//! cancellation all live in the caller) so the state machine itself stays a plain,
//! synchronous transform that is trivial to unit test.

use serde_json::Value;

use super::response::{generate_message_id, generate_tool_use_id, translate_finish_reason};
use crate::anthropic::{ContentBlockStart, Delta, MessageDeltaBody, StreamEvent, StreamMessageStart, Usage};
use crate::google::{self, Part};

enum State {
    Init,
    Streaming,
    Done,
}

pub struct StreamTranslator {
    state: State,
    message_id: String,
    model: String,
    text_block_started: bool,
    had_any_text: bool,
    next_tool_index: u32,
    last_chunk: Option<google::GenerateResponse>,
}

impl StreamTranslator {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            state: State::Init,
            message_id: generate_message_id(),
            model: model.into(),
            text_block_started: false,
            had_any_text: false,
            next_tool_index: 1,
            last_chunk: None,
        }
    }

    /// Translate one already-parsed upstream chunk into the events it produces.
    pub fn translate_chunk(&mut self, chunk: google::GenerateResponse) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        if matches!(self.state, State::Init) {
            self.state = State::Streaming;
            events.push(StreamEvent::MessageStart {
                message: StreamMessageStart::new(self.message_id.clone(), self.model.clone()),
            });
        }

        if let Some(content) = chunk.candidates.first().and_then(|candidate| candidate.content.as_ref()) {
            for part in &content.parts {
                self.translate_part(part, &mut events);
            }
        }

        self.last_chunk = Some(chunk);
        events
    }

    fn translate_part(&mut self, part: &Part, events: &mut Vec<StreamEvent>) {
        match part {
            Part::Text { text } => {
                if !self.text_block_started {
                    self.text_block_started = true;
                    self.had_any_text = true;
                    events.push(StreamEvent::ContentBlockStart {
                        index: 0,
                        content_block: ContentBlockStart::Text { text: String::new() },
                    });
                }
                events.push(StreamEvent::ContentBlockDelta { index: 0, delta: Delta::TextDelta { text: text.clone() } });
            }
            Part::FunctionCall { function_call } => {
                let index = self.next_tool_index;
                self.next_tool_index += 1;

                events.push(StreamEvent::ContentBlockStart {
                    index,
                    content_block: ContentBlockStart::ToolUse {
                        id: generate_tool_use_id(),
                        name: function_call.name.clone(),
                        input: Value::Object(Default::default()),
                    },
                });
                events.push(StreamEvent::ContentBlockDelta {
                    index,
                    delta: Delta::InputJsonDelta { partial_json: function_call.args.to_string() },
                });
                events.push(StreamEvent::ContentBlockStop { index });
            }
            Part::InlineData { .. } | Part::FunctionResponse { .. } => {}
        }
    }

    /// Emit the closing event sequence once the upstream stream has ended normally.
    pub fn finalize(mut self) -> Vec<StreamEvent> {
        if matches!(self.state, State::Done) {
            return Vec::new();
        }
        self.state = State::Done;

        let mut events = Vec::new();
        if self.had_any_text {
            events.push(StreamEvent::ContentBlockStop { index: 0 });
        }

        let last_candidate = self.last_chunk.as_ref().and_then(|chunk| chunk.candidates.first());
        let stop_reason = last_candidate.and_then(|c| c.finish_reason.as_deref()).map(translate_finish_reason);
        let output_tokens = self
            .last_chunk
            .as_ref()
            .and_then(|chunk| chunk.usage_metadata)
            .map(|usage| usage.candidates_token_count)
            .unwrap_or_default();

        events.push(StreamEvent::MessageDelta {
            delta: MessageDeltaBody { stop_reason, stop_sequence: None },
            usage: Usage { input_tokens: 0, output_tokens },
        });
        events.push(StreamEvent::MessageStop);
        events
    }
}

/// Parse one `data: <json>` SSE frame body. Malformed JSON is dropped silently, as the
/// translator is best-effort over an upstream stream it doesn't control.
pub fn parse_chunk(data: &str) -> Option<google::GenerateResponse> {
    serde_json::from_str(data).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::{Candidate, Content, UsageMetadata};

    fn text_chunk(text: &str) -> google::GenerateResponse {
        google::GenerateResponse {
            candidates: vec![Candidate {
                content: Some(Content { role: "model".to_string(), parts: vec![Part::Text { text: text.to_string() }] }),
                finish_reason: None,
            }],
            usage_metadata: None,
        }
    }

    #[test]
    fn s5_stream_assembly_emits_expected_event_sequence() {
        let mut translator = StreamTranslator::new("gemini-2.0-flash");

        let mut events = translator.translate_chunk(text_chunk("Hel"));
        events.extend(translator.translate_chunk(text_chunk("lo")));
        events.extend(translator.translate_chunk(text_chunk(" world")));

        let mut final_chunk = text_chunk(" world");
        final_chunk.candidates[0].finish_reason = Some("STOP".to_string());
        final_chunk.usage_metadata = Some(UsageMetadata { prompt_token_count: 5, candidates_token_count: 3 });
        events.extend(translator.translate_chunk(final_chunk));
        events.extend(translator.finalize());

        let names: Vec<&str> = events.iter().map(StreamEvent::event_name).collect();
        assert_eq!(
            names,
            vec![
                "message_start",
                "content_block_start",
                "content_block_delta",
                "content_block_delta",
                "content_block_delta",
                "content_block_delta",
                "content_block_stop",
                "message_delta",
                "message_stop",
            ]
        );
    }

    #[test]
    fn i6_concatenated_text_deltas_match_full_text() {
        let mut translator = StreamTranslator::new("gemini-2.0-flash");
        let mut events = translator.translate_chunk(text_chunk("Hel"));
        events.extend(translator.translate_chunk(text_chunk("lo")));
        events.extend(translator.translate_chunk(text_chunk(" world")));

        let text: String = events
            .iter()
            .filter_map(|event| match event {
                StreamEvent::ContentBlockDelta { delta: Delta::TextDelta { text }, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();

        assert_eq!(text, "Hello world");
    }

    #[test]
    fn function_call_chunk_emits_start_delta_stop_triplet() {
        let mut translator = StreamTranslator::new("gemini-2.0-flash");
        let chunk = google::GenerateResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: "model".to_string(),
                    parts: vec![Part::FunctionCall {
                        function_call: google::FunctionCall {
                            name: "get_weather".to_string(),
                            args: serde_json::json!({"city": "Paris"}),
                        },
                    }],
                }),
                finish_reason: None,
            }],
            usage_metadata: None,
        };

        let events = translator.translate_chunk(chunk);
        let names: Vec<&str> = events.iter().map(StreamEvent::event_name).collect();
        assert_eq!(names, vec!["message_start", "content_block_start", "content_block_delta", "content_block_stop"]);
    }

    #[test]
    fn malformed_frame_is_dropped_silently() {
        assert!(parse_chunk("{not json").is_none());
    }

    #[test]
    fn finalize_after_text_only_stream_emits_stop_delta_and_message_stop() {
        let mut translator = StreamTranslator::new("gemini-2.0-flash");
        translator.translate_chunk(text_chunk("hi"));
        let closing = translator.finalize();
        let names: Vec<&str> = closing.iter().map(StreamEvent::event_name).collect();
        assert_eq!(names, vec!["content_block_stop", "message_delta", "message_stop"]);
    }
}
