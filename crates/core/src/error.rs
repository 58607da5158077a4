//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is recoverable by the immediate caller. Operations validate
/// before they mutate, so an `Err` always means "nothing changed".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A constructor or setter received bad input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was registered twice.
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    /// A lookup missed.
    #[error("not found: {0}")]
    NotFound(String),

    /// A storage location cannot take the item (category or weight).
    #[error("capacity exceeded: {0}")]
    Capacity(String),

    /// An order references a product that cannot be picked.
    #[error("stock unavailable: {0}")]
    Stock(String),

    /// An order lifecycle step was attempted from the wrong state.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn duplicate_id(msg: impl Into<String>) -> Self {
        Self::DuplicateId(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn capacity(msg: impl Into<String>) -> Self {
        Self::Capacity(msg.into())
    }

    pub fn stock(msg: impl Into<String>) -> Self {
        Self::Stock(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }
}

/// Reject NaN, infinities and negative values for a named quantity.
pub fn ensure_non_negative(field: &str, value: f64) -> DomainResult<f64> {
    if !value.is_finite() {
        return Err(DomainError::validation(format!("{field} must be a finite number")));
    }
    if value < 0.0 {
        return Err(DomainError::validation(format!("{field} cannot be negative")));
    }
    Ok(value)
}

/// Like [`ensure_non_negative`], but zero is rejected too.
pub fn ensure_positive(field: &str, value: f64) -> DomainResult<f64> {
    ensure_non_negative(field, value)?;
    if value == 0.0 {
        return Err(DomainError::validation(format!("{field} must be positive")));
    }
    Ok(value)
}
