//! Structured logging initialisation.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level so an operator can
/// raise verbosity without touching the config file.
pub fn init_logging(config: &ObservabilityConfig) {
    let default_filter = format!("cad_relay={0},tower_http={0}", config.log_level);
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
