//! CLI surface for the gateway binary: listening port, config directory and the
//! bootstrap values seeded into the persisted configuration on first boot.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "gateway", about = "Anthropic-to-Google translation gateway")]
pub struct Args {
    /// Port the HTTP server listens on.
    #[arg(long, env = "GATEWAY_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Directory holding the persisted configuration document.
    #[arg(long, env = "GATEWAY_CONFIG_DIR", default_value = "./data")]
    pub config_dir: String,

    /// Admin password used on first boot, before any login has upgraded it to a hash.
    #[arg(long, env = "GATEWAY_ADMIN_BOOTSTRAP_PASSWORD")]
    pub admin_bootstrap_password: String,

    /// Base URL of the upstream Generative Language provider. Must be `https`.
    #[arg(
        long,
        env = "GATEWAY_UPSTREAM_BASE_URL",
        default_value = "https://generativelanguage.googleapis.com/v1beta"
    )]
    pub upstream_base_url: String,

    /// API key placed on outbound requests as the `key` query parameter.
    #[arg(long, env = "GATEWAY_UPSTREAM_API_KEY")]
    pub upstream_api_key: String,

    /// Model used when a client request omits one.
    #[arg(long, env = "GATEWAY_DEFAULT_MODEL", default_value = "gemini-2.0-flash")]
    pub default_model: String,

    /// Maximum accepted inbound request body size, in bytes.
    #[arg(long, env = "GATEWAY_MAX_BODY_BYTES", default_value_t = 200 * 1024 * 1024)]
    pub max_body_bytes: usize,

    /// `log` filter string, e.g. `"info"` or `"server=debug,gateway=debug"`.
    #[arg(long, env = "GATEWAY_LOG_FILTER", default_value = "info")]
    pub log_filter: String,
}
