//! Gateway server library.
//!
//! Provides a reusable `serve` function used by the binary and by integration tests.

mod admin;
mod auth;
mod error;
mod health;
mod proxy;
mod state;
mod stats;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use config::ConfigStore;
use dispatch::{DispatchQueue, ResponseCache, DEFAULT_TTL};
use llm::UpstreamClient;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::Error;
pub use state::AppState;

/// At most this many upstream calls in flight at once (spec §4.H, N).
const DISPATCH_CONCURRENCY: usize = 3;
/// Minimum spacing between upstream call departures (spec §4.H, M).
const DISPATCH_MIN_SPACING: Duration = Duration::from_millis(200);
/// How often traffic counters are logged while requests are flowing.
const STATS_LOG_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for serving the gateway.
pub struct ServeConfig {
    /// The socket address (IP and port) the server will bind to.
    pub listen_address: SocketAddr,
    /// The configuration store backing the admin surface and proxy controller.
    pub config_store: Arc<ConfigStore>,
    /// Maximum accepted inbound request body size, in bytes.
    pub max_body_bytes: usize,
    /// Cancellation token for graceful shutdown.
    pub shutdown_signal: CancellationToken,
    /// Optional oneshot sender to report back the bound address (useful with port 0).
    pub bound_addr_sender: Option<tokio::sync::oneshot::Sender<SocketAddr>>,
}

/// Starts and runs the gateway server with the provided configuration.
pub async fn serve(
    ServeConfig { listen_address, config_store, max_body_bytes, shutdown_signal, bound_addr_sender }: ServeConfig,
) -> anyhow::Result<()> {
    let state = AppState {
        config: config_store,
        sessions: Arc::new(config::SessionStore::new()),
        cache: ResponseCache::new(DEFAULT_TTL),
        queue: Arc::new(DispatchQueue::new(DISPATCH_CONCURRENCY, DISPATCH_MIN_SPACING)),
        client: UpstreamClient::new(),
        stats: Arc::new(stats::Stats::new()),
        started_at: Instant::now(),
    };

    tokio::spawn(log_stats_periodically(state.clone()));

    let proxy_router = Router::new()
        .route("/v1/messages", post(proxy::messages))
        .layer(auth::BearerAuthLayer::new(state.clone()))
        .layer(DefaultBodyLimit::max(max_body_bytes));

    let admin_router = Router::new()
        .route("/api/login", post(admin::login))
        .route("/api/config", get(admin::get_config).post(admin::put_config))
        .route("/api/test-connection", post(admin::test_connection))
        .route("/api/generate-key", post(admin::generate_key))
        .route("/api/change-password", post(admin::change_password))
        .route("/api/stats", get(admin::stats));

    let public_router = Router::new().route("/health", get(health::health));

    let app = Router::new()
        .merge(proxy_router)
        .merge(admin_router)
        .merge(public_router)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = TcpListener::bind(listen_address).await.map_err(Error::Bind)?;

    if let Some(sender) = bound_addr_sender {
        let _ = sender.send(listener.local_addr()?);
    }

    log::info!("gateway listening on {listen_address}");

    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result.map_err(Error::Server)?;
        }
        _ = shutdown_signal.cancelled() => {
            log::info!("received shutdown signal, shutting down gracefully...");
        }
    }

    Ok(())
}

async fn log_stats_periodically(state: AppState) {
    let mut last_total = 0u64;
    let mut ticker = tokio::time::interval(STATS_LOG_INTERVAL);

    loop {
        ticker.tick().await;
        let total = state.stats.total();
        if total != last_total {
            let snapshot = state.stats.snapshot(state.cache.stats(), state.queue.in_flight());
            log::info!(
                "requests={} cached={} errors={} cache_hit_rate={:.2} queue_in_flight={}",
                snapshot.total,
                snapshot.cached,
                snapshot.errors,
                snapshot.cache_hit_rate,
                snapshot.queue_in_flight
            );
            last_total = total;
        }
    }
}
