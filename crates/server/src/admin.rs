//! Admin Surface (component J): login, configuration, connectivity probe, key
//! rotation, password change and stats, all behind a session token except login.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use config::{ConfigPatch, ConfigurationView};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::auth::AdminSession;
use crate::error::error_response_raw;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    token: String,
}

/// `POST /api/login` — the only admin operation that doesn't require a session.
pub async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> Response {
    let config = state.config.current();
    let (matched, upgrade) = config.admin_secret.verify(&body.password);

    if !matched {
        return error_response_raw(StatusCode::UNAUTHORIZED, "authentication_error", "invalid password");
    }

    if let Some(hash) = upgrade {
        let result = state.config.update(|c| {
            c.upgrade_admin_secret(hash);
            Ok(())
        });
        if let Err(err) = result {
            log::error!("failed to persist upgraded admin secret: {err}");
        }
    }

    let session = state.sessions.create();
    Json(LoginResponse { token: session.token }).into_response()
}

/// `GET /api/config` — configuration with the admin secret omitted.
pub async fn get_config(_session: AdminSession, State(state): State<AppState>) -> Json<ConfigurationView> {
    Json(state.config.current().view())
}

/// `POST /api/config` — merge patch, validate, persist atomically.
pub async fn put_config(
    _session: AdminSession,
    State(state): State<AppState>,
    Json(patch): Json<ConfigPatch>,
) -> Response {
    match state.config.update(|c| c.apply_patch(patch)) {
        Ok(config) => Json(config.view()).into_response(),
        Err(err) => error_response_raw(StatusCode::BAD_REQUEST, "validation_error", err.to_string()),
    }
}

#[derive(Serialize)]
pub struct TestConnectionResponse {
    connected: bool,
    status: Option<u16>,
    error: Option<String>,
}

/// `POST /api/test-connection` — a single minimal generation against the default model.
pub async fn test_connection(_session: AdminSession, State(state): State<AppState>) -> Json<TestConnectionResponse> {
    let config = state.config.current();

    let probe = llm::google::GenerateRequest {
        contents: vec![llm::google::Content {
            role: "user".to_string(),
            parts: vec![llm::google::Part::Text { text: "ping".to_string() }],
        }],
        system_instruction: None,
        generation_config: Some(llm::google::GenerationConfig { max_output_tokens: Some(1), ..Default::default() }),
        safety_settings: llm::google::SafetySetting::permissive_vector(),
        tools: None,
        tool_config: None,
    };

    let result = state
        .client
        .generate(config.upstream_base_url.as_str(), &config.default_model, &config.upstream_api_key, &probe)
        .await;

    Json(match result {
        Ok(_) => TestConnectionResponse { connected: true, status: Some(200), error: None },
        Err(err) => TestConnectionResponse { connected: false, status: Some(err.status_code()), error: Some(err.to_string()) },
    })
}

#[derive(Serialize)]
pub struct GenerateKeyResponse {
    local_api_key: String,
}

/// `POST /api/generate-key` — rotates `localApiKey`.
pub async fn generate_key(_session: AdminSession, State(state): State<AppState>) -> Response {
    let mut new_key = String::new();
    let result = state.config.update(|c| {
        new_key = c.regenerate_local_api_key();
        Ok(())
    });

    match result {
        Ok(_) => Json(GenerateKeyResponse { local_api_key: new_key }).into_response(),
        Err(err) => error_response_raw(StatusCode::INTERNAL_SERVER_ERROR, "server_error", err.to_string()),
    }
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

/// `POST /api/change-password` — verify current, hash and persist new, clear sessions.
pub async fn change_password(
    _session: AdminSession,
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordRequest>,
) -> Response {
    let (matched, _) = state.config.current().admin_secret.verify(&body.current_password);
    if !matched {
        return error_response_raw(StatusCode::UNAUTHORIZED, "authentication_error", "current password is incorrect");
    }

    let result = state.config.update(|c| {
        c.set_password(&body.new_password);
        Ok(())
    });

    match result {
        Ok(_) => {
            state.sessions.clear();
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => error_response_raw(StatusCode::INTERNAL_SERVER_ERROR, "server_error", err.to_string()),
    }
}

/// `GET /api/stats` — counters, cache hit rate, queue state. Unauthenticated, matching
/// the external interface table (operational visibility, not a secret).
pub async fn stats(State(state): State<AppState>) -> Json<crate::stats::StatsSnapshot> {
    Json(state.stats.snapshot(state.cache.stats(), state.queue.in_flight()))
}
