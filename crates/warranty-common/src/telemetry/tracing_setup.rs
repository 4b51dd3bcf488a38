//! Tracing subscriber setup
//!
//! Output format follows the deployment environment: human-readable with
//! file locations in development, JSON lines in production. `RUST_LOG`
//! overrides the default filter when set.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Environment;

/// Initialize the global tracing subscriber for the given environment.
///
/// Returns an error instead of panicking when a subscriber is already
/// installed, so tests can call this freely.
pub fn init_telemetry(env: Environment) -> Result<(), TelemetryError> {
    let default_filter = if env.is_development() { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);

    let installed = if env.is_production() {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry
            .with(fmt::layer().with_file(true).with_line_number(true))
            .try_init()
    };

    installed.map_err(|_| TelemetryError::AlreadyInitialized)
}

/// Telemetry initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("tracing subscriber already initialized")]
    AlreadyInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_already_initialized() {
        // Whichever call wins the race installs the subscriber; the next
        // one must fail gracefully rather than panic.
        let _ = init_telemetry(Environment::Development);
        let second = init_telemetry(Environment::Development);
        assert!(matches!(second, Err(TelemetryError::AlreadyInitialized)));
    }
}
