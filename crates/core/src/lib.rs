//! Domain foundation building blocks for the warehouse crates.
//!
//! This crate contains **pure domain** primitives shared by the product,
//! inventory, warehouse and order crates (no IO).

pub mod aggregate;
pub mod config;
pub mod entity;
pub mod error;
pub mod id;

pub use aggregate::{Aggregate, AggregateRoot, execute};
pub use config::{ExpiryPolicy, LogSettings, Settings, StorageTariff};
pub use entity::Entity;
pub use error::{DomainError, DomainResult, ensure_non_negative, ensure_positive};
pub use id::{LocationId, OrderId, ProductId, ShipmentId};
