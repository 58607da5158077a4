//! Log sink abstraction (mechanics only).
//!
//! Every mutating domain operation emits a human-readable line, e.g.
//! `"Order O-1 transitioned PENDING -> PICKED"`, tagged with a [`LogKind`]. The domain only needs a
//! place to put that line; what happens to it (kept in memory, forwarded to
//! `tracing`, shown in a UI) is the host's business.
//!
//! ```text
//! InventoryManager ─┐
//! StorageLocation ──┼─ record_as(kind, line) ─▶ LogSink ─▶ TransactionLog / TracingSink / NullSink
//! Order ────────────┘
//! ```
//!
//! Sinks take `&self` so one instance can be shared (`Arc`) between every
//! collaborator that writes to it. Implementations that buffer must use
//! interior mutability.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Category of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogKind {
    #[default]
    Info,
    OrderStatus,
    ShipmentEvent,
    Warning,
}

impl LogKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            LogKind::Info => "INFO",
            LogKind::OrderStatus => "ORDER_STATUS",
            LogKind::ShipmentEvent => "SHIPMENT_EVENT",
            LogKind::Warning => "WARNING",
        }
    }
}

impl core::fmt::Display for LogKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts textual log lines.
pub trait LogSink: Send + Sync + core::fmt::Debug {
    fn record_as(&self, kind: LogKind, line: &str);

    /// Record an [`LogKind::Info`] line.
    fn record(&self, line: &str) {
        self.record_as(LogKind::Info, line)
    }
}

/// Sink shared between the inventory, the warehouse and orders.
pub type SharedSink = Arc<dyn LogSink>;

impl<S> LogSink for Arc<S>
where
    S: LogSink + ?Sized,
{
    fn record_as(&self, kind: LogKind, line: &str) {
        (**self).record_as(kind, line)
    }
}

/// Discards every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn record_as(&self, _kind: LogKind, _line: &str) {}
}

/// A [`SharedSink`] that discards everything; the default collaborator.
pub fn null_sink() -> SharedSink {
    Arc::new(NullSink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_render_as_upper_snake_case() {
        assert_eq!(LogKind::default(), LogKind::Info);
        assert_eq!(LogKind::OrderStatus.to_string(), "ORDER_STATUS");
        assert_eq!(LogKind::ShipmentEvent.as_str(), "SHIPMENT_EVENT");
        assert_eq!(serde_json::to_value(LogKind::Warning).unwrap(), "WARNING");
    }
}
