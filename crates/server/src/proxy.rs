//! Proxy Controller (component I): the client-facing `/v1/messages` handler wiring
//! classification, caching, queue admission, translation and the upstream client.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::sse::{Event as SseEvent, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::stream::{self, Stream, StreamExt};
use http::{HeaderValue, StatusCode};
use llm::anthropic::{self, ErrorBody, StreamEvent};
use llm::classifier;
use llm::translate::{self, StreamTranslator};
use llm::{endpoint, GatewayError};
use serde_json::Value;

use crate::error::error_response;
use crate::state::AppState;

/// Idle-read ceiling once an upstream stream has started.
const STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn messages(State(state): State<AppState>, body: Bytes) -> Response {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => return error_response(&GatewayError::Validation(format!("invalid JSON body: {err}"))),
    };

    let fingerprint = dispatch::fingerprint(&raw);

    let mut request: anthropic::Request = match serde_json::from_value(raw) {
        Ok(request) => request,
        Err(err) => return error_response(&GatewayError::Validation(format!("invalid messages request: {err}"))),
    };

    let classification = classifier::classify(request.messages.as_deref().unwrap_or(&[]), request.tools.len());
    if classification.strips_tools() {
        request.tools.clear();
        request.tool_choice = None;
    }
    state.stats.record_request(classification);

    let streaming = request.stream;

    if !streaming && let Some(cached) = state.cache.get(&fingerprint) {
        state.stats.record_cached();
        let mut response = axum::Json(cached).into_response();
        response.headers_mut().insert("x-cache", HeaderValue::from_static("HIT"));
        return response;
    }

    let _permit = state.queue.acquire().await;

    let config = state.config.current();
    let google_request = match translate::translate_request(&request) {
        Ok(request) => request,
        Err(err) => {
            state.stats.record_error();
            return error_response(&err);
        }
    };

    let model = endpoint::resolve_model(request.model.as_deref(), &config.default_model);

    if streaming {
        let upstream = match state
            .client
            .generate_stream(config.upstream_base_url.as_str(), &model, &config.upstream_api_key, &google_request)
            .await
        {
            Ok(stream) => stream,
            Err(err) => {
                state.stats.record_error();
                return error_response(&err);
            }
        };

        let event_stream = translated_event_stream(upstream, model, _permit).map(|event| {
            let sse_event = SseEvent::default()
                .event(event.event_name())
                .json_data(&event)
                .expect("StreamEvent always serialises");
            Ok::<_, std::convert::Infallible>(sse_event)
        });

        let mut response = Sse::new(event_stream).into_response();
        response.headers_mut().insert(http::header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        response.headers_mut().insert(http::header::CONNECTION, HeaderValue::from_static("keep-alive"));
        return response;
    }

    let reply = match state
        .client
        .generate(config.upstream_base_url.as_str(), &model, &config.upstream_api_key, &google_request)
        .await
    {
        Ok(reply) => reply,
        Err(err) => {
            state.stats.record_error();
            return error_response(&err);
        }
    };

    let translated = match translate::translate_response(&reply, &model) {
        Ok(response) => response,
        Err(err) => {
            state.stats.record_error();
            return error_response(&err);
        }
    };

    let body = serde_json::to_value(&translated).unwrap_or(Value::Null);
    state.cache.insert(fingerprint, body.clone());

    let mut response = (StatusCode::OK, axum::Json(body)).into_response();
    response.headers_mut().insert("x-cache", HeaderValue::from_static("MISS"));
    response
}

/// Drive an upstream SSE frame stream through the [`StreamTranslator`], enforcing the
/// inter-chunk idle timeout and finalising once the upstream stream ends.
///
/// `permit` is held for the lifetime of the returned stream, not just until upstream
/// headers arrive: the dispatch slot and min-spacing accounting must stay occupied for
/// the whole streaming response, and must unwind on client disconnect (the stream, and
/// with it the permit, simply gets dropped).
fn translated_event_stream(
    upstream: llm::client::UpstreamEventStream,
    model: String,
    permit: dispatch::DispatchPermit,
) -> impl Stream<Item = StreamEvent> {
    struct Cursor {
        upstream: llm::client::UpstreamEventStream,
        translator: Option<StreamTranslator>,
        pending: std::collections::VecDeque<StreamEvent>,
        done: bool,
        _permit: dispatch::DispatchPermit,
    }

    let initial =
        Cursor { upstream, translator: Some(StreamTranslator::new(model)), pending: Default::default(), done: false, _permit: permit };

    stream::unfold(initial, |mut cursor| async move {
        loop {
            if let Some(event) = cursor.pending.pop_front() {
                return Some((event, cursor));
            }
            if cursor.done {
                return None;
            }

            match tokio::time::timeout(STREAM_IDLE_TIMEOUT, cursor.upstream.next()).await {
                Ok(Some(Ok(frame))) => {
                    if let Some(chunk) = translate::parse_chunk(&frame.data)
                        && let Some(translator) = cursor.translator.as_mut()
                    {
                        cursor.pending.extend(translator.translate_chunk(chunk));
                    }
                }
                Ok(Some(Err(err))) => {
                    log::error!("upstream event stream failed mid-flight: {err}");
                    cursor.pending.push_back(StreamEvent::Error {
                        error: ErrorBody { kind: "stream_error".to_string(), message: "stream failed".to_string() },
                    });
                    cursor.done = true;
                }
                Ok(None) => {
                    if let Some(translator) = cursor.translator.take() {
                        cursor.pending.extend(translator.finalize());
                    }
                    cursor.done = true;
                }
                Err(_elapsed) => {
                    log::warn!("upstream stream idled past the {}s timeout", STREAM_IDLE_TIMEOUT.as_secs());
                    cursor.pending.push_back(StreamEvent::Error {
                        error: ErrorBody { kind: "stream_timeout".to_string(), message: "stream idled past the timeout".to_string() },
                    });
                    cursor.done = true;
                }
            }
        }
    })
}
