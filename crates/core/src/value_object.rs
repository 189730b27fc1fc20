//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; they are defined entirely by their
//! attribute values. Two quantities of 5 are the same quantity.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: `Quantity(5)` equals any other `Quantity(5)`
/// - **Entity**: an inbound record for part `P1` stays the same record while
///   its stock counter changes
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// A strictly positive movement quantity.
///
/// Zero and negative quantities never reach the ledger; they are rejected at
/// construction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Quantity(u64);

impl Quantity {
    pub fn new(value: u64) -> Result<Self, DomainError> {
        if value == 0 {
            return Err(DomainError::validation("quantity must be a positive integer"));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Parse user-entered text, accepting surrounding whitespace only.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.starts_with('-') {
            return Err(DomainError::validation("quantity must be a positive integer"));
        }
        let value: u64 = trimmed
            .parse()
            .map_err(|_| DomainError::validation(format!("quantity must be a valid integer (got {raw:?})")))?;
        Self::new(value)
    }
}

impl ValueObject for Quantity {}

impl TryFrom<u64> for Quantity {
    type Error = DomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u64 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quantity_is_rejected() {
        assert!(matches!(Quantity::new(0), Err(DomainError::Validation(_))));
    }

    #[test]
    fn parse_accepts_padded_positive_integers() {
        assert_eq!(Quantity::parse(" 12 ").unwrap().get(), 12);
    }

    #[test]
    fn parse_accepts_the_full_unsigned_range() {
        assert_eq!(Quantity::parse("18446744073709551615").unwrap().get(), u64::MAX);
        assert_eq!(Quantity::parse("9223372036854775808").unwrap().get(), 1u64 << 63);
        assert!(Quantity::parse("18446744073709551616").is_err());
    }

    #[test]
    fn negative_input_reports_positivity_not_syntax() {
        let err = Quantity::parse(" -3").unwrap_err();
        assert_eq!(err, DomainError::validation("quantity must be a positive integer"));
    }

    #[test]
    fn parse_rejects_negative_and_garbage() {
        assert!(Quantity::parse("-3").is_err());
        assert!(Quantity::parse("0").is_err());
        assert!(Quantity::parse("twelve").is_err());
        assert!(Quantity::parse("1.5").is_err());
    }

    #[test]
    fn deserializing_zero_fails() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("7").unwrap().get(), 7);
    }
}
