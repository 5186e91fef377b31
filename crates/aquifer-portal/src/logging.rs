#![forbid(unsafe_code)]

//! JSON log output for hosted deployments.
//!
//! Compiled only with the `json-logs` feature. Local development usually
//! runs without it and lets the host process pick its own subscriber.

use tracing_subscriber::EnvFilter;

/// Install the global JSON subscriber.
///
/// `RUST_LOG` wins when set and parseable; otherwise `default_filter`
/// applies (pass [`PortalConfig::log_filter`] here). Calling this a second
/// time is a no-op: the first subscriber stays installed.
///
/// [`PortalConfig::log_filter`]: crate::config::PortalConfig
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_default();
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init();
}
