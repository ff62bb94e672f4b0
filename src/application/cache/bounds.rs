//! Authoritative tick bounds for open positions.
//!
//! The vault's position read path returns stale or zero bounds after a mint,
//! so the agent records bounds itself. An entry exists exactly while the
//! position is open: it is inserted when a mint confirms and removed when
//! the matching close confirms.

use std::collections::HashMap;

use crate::domain::{PositionBounds, PositionId};

/// Position id to bounds map.
#[derive(Debug, Default)]
pub struct PositionBoundsCache {
    entries: HashMap<PositionId, PositionBounds>,
}

impl PositionBoundsCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record bounds for a freshly minted position.
    ///
    /// Returns the previous bounds if the id was already present.
    pub fn insert(&mut self, id: PositionId, bounds: PositionBounds) -> Option<PositionBounds> {
        self.entries.insert(id, bounds)
    }

    /// Forget a closed position.
    pub fn remove(&mut self, id: PositionId) -> Option<PositionBounds> {
        self.entries.remove(&id)
    }

    /// Bounds of an open position.
    #[must_use]
    pub fn get(&self, id: PositionId) -> Option<PositionBounds> {
        self.entries.get(&id).copied()
    }

    /// Return `true` if the position is tracked.
    #[must_use]
    pub fn contains(&self, id: PositionId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of tracked positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries sorted by position id.
    #[must_use]
    pub fn entries(&self) -> Vec<(PositionId, PositionBounds)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(id, b)| (*id, *b)).collect();
        entries.sort_by_key(|(id, _)| *id);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(lower: i32, upper: i32) -> PositionBounds {
        PositionBounds {
            tick_lower: lower,
            tick_upper: upper,
        }
    }

    #[test]
    fn insert_then_remove() {
        let mut cache = PositionBoundsCache::new();
        assert!(cache.is_empty());

        cache.insert(PositionId::new(5), bounds(-120, 120));
        assert!(cache.contains(PositionId::new(5)));
        assert_eq!(cache.get(PositionId::new(5)), Some(bounds(-120, 120)));

        assert_eq!(cache.remove(PositionId::new(5)), Some(bounds(-120, 120)));
        assert!(!cache.contains(PositionId::new(5)));
        assert_eq!(cache.remove(PositionId::new(5)), None);
    }

    #[test]
    fn entries_are_sorted() {
        let mut cache = PositionBoundsCache::new();
        cache.insert(PositionId::new(9), bounds(0, 60));
        cache.insert(PositionId::new(2), bounds(-60, 0));
        let ids: Vec<u64> = cache.entries().iter().map(|(id, _)| id.value()).collect();
        assert_eq!(ids, vec![2, 9]);
    }
}
