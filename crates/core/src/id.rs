//! Strongly-typed identifiers used across the domain.
//!
//! Identifiers are human-facing codes (`"P01"`, `"Shelf-A"`, `"ORD-100"`), so
//! they wrap a trimmed, non-empty `String` rather than a UUID.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of a product registered in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

/// Identifier of a storage location (shelf, refrigerated unit).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(String);

/// Identifier of a customer order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

/// Identifier of a shipment opened when an order ships.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipmentId(String);

macro_rules! impl_string_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Validate and wrap an identifier. Surrounding whitespace is trimmed.
            pub fn new(value: impl AsRef<str>) -> Result<Self, DomainError> {
                let trimmed = value.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(DomainError::validation(format!("{} cannot be empty", $name)));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<&str> for $t {
            type Error = DomainError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

impl_string_id!(ProductId, "ProductId");
impl_string_id!(LocationId, "LocationId");
impl_string_id!(OrderId, "OrderId");
impl_string_id!(ShipmentId, "ShipmentId");

impl OrderId {
    /// Generate a fresh order id (`ORD-<uuidv7>`).
    ///
    /// Prefer passing ids explicitly in tests for determinism.
    pub fn generate() -> Self {
        Self(format!("ORD-{}", Uuid::now_v7().simple()))
    }
}

impl ShipmentId {
    /// Generate a fresh shipment id (`SHP-<uuidv7>`).
    pub fn generate() -> Self {
        Self(format!("SHP-{}", Uuid::now_v7().simple()))
    }
}
