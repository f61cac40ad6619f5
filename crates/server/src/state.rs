use std::sync::Arc;
use std::time::Instant;

use config::{ConfigStore, SessionStore};
use dispatch::{DispatchQueue, ResponseCache};
use llm::UpstreamClient;

use crate::stats::Stats;

/// Everything every handler needs, cheaply `Clone`-able (every field is already an
/// `Arc` or internally reference-counted).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConfigStore>,
    pub sessions: Arc<SessionStore>,
    pub cache: ResponseCache,
    pub queue: Arc<DispatchQueue>,
    pub client: UpstreamClient,
    pub stats: Arc<Stats>,
    pub started_at: Instant,
}
