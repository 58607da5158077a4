//! Warehouse domain module.
//!
//! Storage locations (shelves and refrigerated units) with weight capacity,
//! the warehouse that owns them, and the placement engine that picks the
//! first location able to take a product.

pub mod location;
pub mod optimization;
pub mod warehouse;

pub use location::{LocationKind, LocationSnapshot, StorageLocation};
pub use optimization::OptimizationEngine;
pub use warehouse::Warehouse;
