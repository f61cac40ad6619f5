use std::path::Path;

use clap::Parser;
use config::{Configuration, ConfigStore};

use args::Args;

mod args;
mod logger;

/// Config-directory permission or I/O failure (spec §6 exit codes).
const EXIT_CONFIG_ERROR: i32 = 2;
/// Port bind failure (spec §6 exit codes).
const EXIT_BIND_ERROR: i32 = 3;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init(&args.log_filter);

    let config_store = match load_config(&args) {
        Ok(store) => store,
        Err(err) => {
            log::error!("failed to load configuration: {err}");
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };

    let shutdown_signal = tokio_util::sync::CancellationToken::new();
    let shutdown_signal_for_ctrl_c = shutdown_signal.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown_signal_for_ctrl_c.cancel();
        }
    });

    let serve_config = server::ServeConfig {
        listen_address: ([0, 0, 0, 0], args.port).into(),
        config_store: std::sync::Arc::new(config_store),
        max_body_bytes: args.max_body_bytes,
        shutdown_signal,
        bound_addr_sender: None,
    };

    if let Err(err) = server::serve(serve_config).await {
        match err.downcast_ref::<server::Error>() {
            Some(server::Error::Bind(_)) => {
                log::error!("failed to bind to port {}: {err}", args.port);
                std::process::exit(EXIT_BIND_ERROR);
            }
            _ => {
                log::error!("server error: {err}");
                std::process::exit(1);
            }
        }
    }
}

fn load_config(args: &Args) -> anyhow::Result<ConfigStore> {
    std::fs::create_dir_all(&args.config_dir)?;
    let config_path = Path::new(&args.config_dir).join("config.json");

    let bootstrap = Configuration::new(
        args.upstream_base_url.clone(),
        args.upstream_api_key.clone(),
        args.default_model.clone(),
        config::random_hex_token(32),
        args.admin_bootstrap_password.clone(),
    )?;

    Ok(ConfigStore::load(config_path, bootstrap)?)
}
