//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Directive used when neither `RUST_LOG` nor an explicit level is given
const DEFAULT_DIRECTIVE: &str = "proxy_harvester=info";

/// Install the global fmt subscriber.
///
/// `level` (e.g. `debug`) applies to this crate and takes precedence over
/// `RUST_LOG`.
pub fn init(level: Option<&str>) -> anyhow::Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::new(format!("proxy_harvester={}", level)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))
}

/// Test logger; ignores the error if a subscriber is already installed.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("proxy_harvester=debug"))
        .with_test_writer()
        .try_init();
}
