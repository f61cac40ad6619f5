//! Response Translator (component C): Dialect G reply → Dialect A assistant message.

use rand::Rng;
use rand::distr::Alphanumeric;

use crate::anthropic::{Response, ResponseContentBlock, StopReason, Usage};
use crate::error::{GatewayError, Result};
use crate::google::{self, Part};

/// Translate a synchronous Dialect G reply into a Dialect A message.
pub fn translate_response(reply: &google::GenerateResponse, model: &str) -> Result<Response> {
    let candidate = reply.candidates.first().ok_or(GatewayError::NoCandidate)?;

    let content = candidate
        .content
        .as_ref()
        .map(|content| content.parts.iter().filter_map(translate_part).collect())
        .unwrap_or_default();

    let stop_reason = candidate.finish_reason.as_deref().map(translate_finish_reason);

    let usage = reply
        .usage_metadata
        .map(|usage| Usage {
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
        })
        .unwrap_or_default();

    Ok(Response::new(generate_message_id(), model.to_string(), content, stop_reason, usage))
}

fn translate_part(part: &Part) -> Option<ResponseContentBlock> {
    match part {
        Part::Text { text } => Some(ResponseContentBlock::Text { text: text.clone(), citations: None }),
        Part::FunctionCall { function_call } => Some(ResponseContentBlock::ToolUse {
            id: generate_tool_use_id(),
            name: function_call.name.clone(),
            input: function_call.args.clone(),
        }),
        Part::InlineData { .. } | Part::FunctionResponse { .. } => None,
    }
}

/// `STOP→end_turn`, `MAX_TOKENS→max_tokens`, `SAFETY|RECITATION→stop_sequence`;
/// anything else maps to `end_turn`.
pub fn translate_finish_reason(reason: &str) -> StopReason {
    match reason {
        "MAX_TOKENS" => StopReason::MaxTokens,
        "SAFETY" | "RECITATION" => StopReason::StopSequence,
        _ => StopReason::EndTurn,
    }
}

pub fn generate_message_id() -> String {
    format!("msg_{}", random_alnum(29))
}

pub fn generate_tool_use_id() -> String {
    format!("toolu_{}", random_alnum(12))
}

fn random_alnum(len: usize) -> String {
    rand::rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::{Candidate, Content, FunctionCall, UsageMetadata};
    use serde_json::json;

    #[test]
    fn translates_text_candidate_with_usage() {
        let reply = google::GenerateResponse {
            candidates: vec![Candidate {
                content: Some(Content { role: "model".to_string(), parts: vec![Part::Text { text: "hi".to_string() }] }),
                finish_reason: Some("STOP".to_string()),
            }],
            usage_metadata: Some(UsageMetadata { prompt_token_count: 10, candidates_token_count: 2 }),
        };

        let response = translate_response(&reply, "gemini-2.0-flash").unwrap();
        assert_eq!(response.content.len(), 1);
        assert_eq!(response.stop_reason, Some(StopReason::EndTurn));
        assert_eq!(response.usage.input_tokens, 10);
        assert_eq!(response.usage.output_tokens, 2);
        assert!(response.id.starts_with("msg_"));
    }

    #[test]
    fn s3_function_call_becomes_tool_use_block() {
        let reply = google::GenerateResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: "model".to_string(),
                    parts: vec![Part::FunctionCall {
                        function_call: FunctionCall { name: "get_weather".to_string(), args: json!({"city": "Paris"}) },
                    }],
                }),
                finish_reason: Some("STOP".to_string()),
            }],
            usage_metadata: None,
        };

        let response = translate_response(&reply, "gemini-2.0-flash").unwrap();
        match &response.content[0] {
            ResponseContentBlock::ToolUse { id, name, input } => {
                assert!(id.starts_with("toolu_"));
                assert_eq!(name, "get_weather");
                assert_eq!(input, &json!({"city": "Paris"}));
            }
            _ => panic!("expected a tool_use block"),
        }
    }

    #[test]
    fn fails_when_no_candidates() {
        let reply = google::GenerateResponse { candidates: vec![], usage_metadata: None };
        let err = translate_response(&reply, "gemini-2.0-flash").unwrap_err();
        assert!(matches!(err, GatewayError::NoCandidate));
    }

    #[test]
    fn maps_max_tokens_and_safety_finish_reasons() {
        assert_eq!(translate_finish_reason("MAX_TOKENS"), StopReason::MaxTokens);
        assert_eq!(translate_finish_reason("SAFETY"), StopReason::StopSequence);
        assert_eq!(translate_finish_reason("RECITATION"), StopReason::StopSequence);
        assert_eq!(translate_finish_reason("WEIRD_NEW_REASON"), StopReason::EndTurn);
    }
}
