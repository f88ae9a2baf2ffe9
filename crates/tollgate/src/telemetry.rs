//! Tracing subscriber setup.
//!
//! Library code only emits `tracing` events; binaries and services choose
//! how they are rendered by calling one of these once at startup.

use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,tollgate=debug";

/// Install a global subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. With `json` set,
/// events are written as one JSON object per line for log shippers;
/// otherwise they use the human-readable format.
///
/// # Errors
///
/// Fails if a global subscriber is already installed or the filter does
/// not parse.
pub fn init_telemetry(
    default_filter: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()?;
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()?;
    }

    info!(json, "Telemetry initialized");
    Ok(())
}

/// Install a human-readable subscriber with [`DEFAULT_FILTER`].
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_console_telemetry() -> Result<(), Box<dyn std::error::Error>> {
    init_telemetry(DEFAULT_FILTER, false)
}
