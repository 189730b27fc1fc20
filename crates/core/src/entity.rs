//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Inbound records and status rows are keyed by part; movement records by
/// their own movement id.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
