//! Tracing and transaction-log plumbing shared by hosts of the domain crates.

use scwos_core::LogSettings;

/// Initialize process-wide tracing output.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(settings: &LogSettings) {
    tracing::init(settings);
}

/// Subscriber setup (filters, output format).
pub mod tracing;

/// `LogSink` implementations backed by `tracing`.
pub mod sink;

pub use sink::{TRANSACTIONS_TARGET, TracingSink, tracing_sink};
