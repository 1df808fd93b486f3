//! Tracing subscriber setup

use busysync_domain::{LogFormat, LogLevel, LoggingConfig, Result, SyncError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter from `RUST_LOG` when set, otherwise from the configured level.
///
/// # Errors
/// Returns `SyncError::Config` if the configured level is unknown.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let level = config.level.parse::<LogLevel>()?;
    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str())))
}

/// Install the global subscriber.
///
/// # Errors
/// Returns `SyncError::Config` for an unknown level and `SyncError::Internal`
/// if a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => {
            registry.with(fmt::layer().json().with_current_span(true)).try_init()
        }
    };

    installed.map_err(|e| SyncError::Internal(format!("failed to install log subscriber: {e}")))
}
