#![forbid(unsafe_code)]

//! Entity identifiers and the store's id allocator.
//!
//! Every record in a collection carries an [`EntityId`]: an opaque string,
//! stable for the record's whole life. Records seeded from the remote
//! database keep whatever identifiers the database assigned; records created
//! locally get theirs from the store's allocator.
//!
//! # Allocation
//!
//! Two strategies exist (see [`IdStrategy`]):
//!
//! - `Uuid` (default): random v4 identifiers.
//! - `Sequential`: a monotonic decimal sequence (`"1"`, `"2"`, ...), which
//!   makes assigned ids deterministic. Intended for tests and fixtures.
//!
//! Either way the allocator re-draws while a candidate collides with an id
//! already present in the collection, so uniqueness holds structurally even
//! when a sequence runs into ids the database handed out.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque identifier of one record within an entity collection.
///
/// Compared, hashed, and ordered as a plain string. Construct one from an
/// existing database value via `From<&str>`/`From<String>`, or mint a fresh
/// random one with [`EntityId::fresh`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EntityId(String);

impl EntityId {
    /// Mint a random v4 identifier.
    #[must_use]
    pub fn fresh() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// View the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntityId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

/// How a store mints identifiers for newly added records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// Random UUIDv4 identifiers (default).
    #[default]
    Uuid,
    /// Monotonic decimal sequence: `"1"`, `"2"`, ... Deterministic, so tests
    /// can assert the exact ids a store assigns.
    Sequential,
}

/// Allocator state owned by one store.
///
/// The sequence counter only ever advances; a sequential allocator never
/// re-issues an id it already handed out.
#[derive(Debug)]
pub(crate) struct IdAllocator {
    strategy: IdStrategy,
    next_seq: u64,
}

impl IdAllocator {
    pub(crate) fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            next_seq: 0,
        }
    }

    /// Draw candidate ids until one is not claimed by `occupied`.
    pub(crate) fn next_free(&mut self, occupied: impl Fn(&EntityId) -> bool) -> EntityId {
        loop {
            let candidate = match self.strategy {
                IdStrategy::Uuid => EntityId::fresh(),
                IdStrategy::Sequential => {
                    self.next_seq += 1;
                    EntityId::from(self.next_seq.to_string())
                }
            };
            if !occupied(&candidate) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_distinct() {
        let a = EntityId::fresh();
        let b = EntityId::fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn display_matches_raw_string() {
        let id = EntityId::from("abc-123");
        assert_eq!(id.to_string(), "abc-123");
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn sequential_counts_up_from_one() {
        let mut ids = IdAllocator::new(IdStrategy::Sequential);
        assert_eq!(ids.next_free(|_| false), EntityId::from("1"));
        assert_eq!(ids.next_free(|_| false), EntityId::from("2"));
        assert_eq!(ids.next_free(|_| false), EntityId::from("3"));
    }

    #[test]
    fn sequential_skips_occupied_candidates() {
        let taken = [EntityId::from("1"), EntityId::from("2")];
        let mut ids = IdAllocator::new(IdStrategy::Sequential);
        let first = ids.next_free(|cand| taken.contains(cand));
        assert_eq!(first, EntityId::from("3"));
        // The counter advanced past the collisions; nothing is re-issued.
        let second = ids.next_free(|cand| taken.contains(cand));
        assert_eq!(second, EntityId::from("4"));
    }

    #[test]
    fn uuid_strategy_respects_occupied_set() {
        let mut ids = IdAllocator::new(IdStrategy::Uuid);
        let first = ids.next_free(|_| false);
        let second = ids.next_free(|cand| cand == &first);
        assert_ne!(first, second);
    }
}
