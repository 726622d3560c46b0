use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

use crate::config::TelemetryConfig;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("{origin} '{value}' is not a valid tracing filter")]
    EnvFilter {
        origin: &'static str,
        value: String,
        source: ParseError,
    },
    #[error("failed to install the log subscriber: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Installs the global `fmt` subscriber. A non-empty `RUST_LOG` takes precedence
/// over `FIN360_LOG_LEVEL`.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let (filter, origin) = log_filter(&config.log_level, rust_log.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)?;

    tracing::debug!(origin, "log filter installed");
    Ok(())
}

fn log_filter(
    log_level: &str,
    rust_log: Option<&str>,
) -> Result<(EnvFilter, &'static str), TelemetryError> {
    let (value, origin) = match rust_log.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => (value, "RUST_LOG"),
        None => (log_level.trim(), "FIN360_LOG_LEVEL"),
    };
    EnvFilter::try_new(value)
        .map(|filter| (filter, origin))
        .map_err(|source| TelemetryError::EnvFilter {
            origin,
            value: value.to_string(),
            source,
        })
}
