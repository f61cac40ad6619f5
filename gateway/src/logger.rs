//! Logger initialization for the gateway binary.

use std::str::FromStr;
use std::sync::Once;

use logforth::append::Stderr;
use logforth::filter::EnvFilter;

static INIT: Once = Once::new();

/// Initializes the global logger once. `log_filter` is a string like `"info"` or
/// `"server=debug,gateway=debug"`.
pub fn init(log_filter: &str) {
    let log_filter = log_filter.to_owned();
    INIT.call_once(move || apply_logger(&log_filter));
}

fn apply_logger(log_filter: &str) {
    let filter =
        EnvFilter::from_str(log_filter).unwrap_or_else(|_| EnvFilter::from_str("info").expect("default filter should be valid"));

    logforth::builder()
        .dispatch(move |d| d.filter(filter).append(Stderr::default()))
        .apply();
}
