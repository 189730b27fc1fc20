//! Domain error model.

use thiserror::Error;

use crate::id::PartId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// unknown parts, stock shortfalls). Persistence failures belong to the
/// infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. non-positive quantity, missing field).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. blank part number).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// An outbound movement referenced a part with no inbound record.
    #[error("part {part_id} has no inbound record")]
    UnknownPart { part_id: PartId },

    /// An outbound movement asked for more than is on hand.
    #[error("insufficient stock for part {part_id} (available: {available}, requested: {requested})")]
    InsufficientStock {
        part_id: PartId,
        available: u64,
        requested: u64,
    },

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn unknown_part(part_id: PartId) -> Self {
        Self::UnknownPart { part_id }
    }

    pub fn insufficient_stock(part_id: PartId, available: u64, requested: u64) -> Self {
        Self::InsufficientStock {
            part_id,
            available,
            requested,
        }
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}
