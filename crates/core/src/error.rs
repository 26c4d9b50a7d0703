//! Shared error taxonomy.

use thiserror::Error;

/// Result type used across the ledger and query surfaces.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors surfaced by ledger operations and derived views.
///
/// Deterministic caller-facing failures (validation, ownership, business
/// rules) sit alongside the two datastore outcomes (`Timeout`,
/// `Unavailable`) that callers must be able to distinguish when deciding
/// whether to retry. Nothing here is retried automatically.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    /// Malformed or out-of-range input (caller bug). Raised before a
    /// transaction opens wherever possible.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced entity is absent. Carries the entity id for messages.
    #[error("not found: {0}")]
    NotFound(String),

    /// The entity exists but belongs to another user.
    #[error("forbidden: record belongs to another user")]
    Forbidden,

    /// A deduction asked for more than the record holds.
    #[error("insufficient quantity: requested {requested}, available {available}")]
    InsufficientQuantity { requested: f64, available: f64 },

    /// The transaction exceeded its wait bound. No partial effect was
    /// committed.
    #[error("transaction timed out")]
    Timeout,

    /// Transport/connectivity failure from the datastore, surfaced
    /// unchanged.
    #[error("datastore unavailable: {0}")]
    Unavailable(String),
}

impl LedgerError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn insufficient(requested: f64, available: f64) -> Self {
        Self::InsufficientQuantity {
            requested,
            available,
        }
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
