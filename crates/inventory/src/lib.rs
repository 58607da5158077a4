//! Inventory domain module.
//!
//! Registry of unique products keyed by id, with per-category counters,
//! valuation, expiry checks, projected storage cost and order reservations.
//! Pure deterministic domain logic: the only side effect is the log line each
//! mutation hands to its [`scwos_events::LogSink`].

pub mod manager;
pub mod report;

pub use manager::InventoryManager;
pub use report::{CategoryCounts, InventoryReport};
