//! Tracing/logging initialization.

use scwos_core::LogSettings;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` when set and valid, otherwise the configured directive.
pub fn env_filter(settings: &LogSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(settings: &LogSettings) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(settings))
        .with_timer(tracing_subscriber::fmt::time::SystemTime);

    let _ = if settings.json {
        builder.json().with_target(true).try_init()
    } else {
        builder.with_target(true).try_init()
    };
}
