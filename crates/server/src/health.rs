use std::time::{SystemTime, UNIX_EPOCH};

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthBody {
    status: &'static str,
    uptime_seconds: u64,
    timestamp: u64,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();

    Json(HealthBody { status: "ok", uptime_seconds: state.started_at.elapsed().as_secs(), timestamp })
}
