use thiserror::Error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::TrackerConfig;

/// Telemetry setup errors
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter directive could not be parsed
    #[error("Invalid log filter {filter:?}: {message}")]
    InvalidFilter { filter: String, message: String },

    /// A global subscriber is already installed
    #[error("Tracing subscriber already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Build the log filter: `RUST_LOG` when set, the configured filter otherwise
pub fn env_filter(config: &TrackerConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.log_filter).map_err(|e| TelemetryError::InvalidFilter {
        filter: config.log_filter.clone(),
        message: e.to_string(),
    })
}

/// Install the global tracing subscriber
pub fn init_tracing(config: &TrackerConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;

    let json_layer = config
        .log_json
        .then(|| fmt::layer().json().with_current_span(true).with_target(true));
    let plain_layer = (!config.log_json).then(|| fmt::layer().with_target(false));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(plain_layer)
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))
}
