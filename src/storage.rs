use crate::core::{contests::ContestListing, profile::RatingSnapshot};
use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock};

/// A cached value and the time it was published. `timestamp` is `None` until
/// the first refresh succeeds.
#[derive(Debug, Default)]
pub struct Published<T> {
    pub timestamp: Option<DateTime<Utc>>,
    pub data: T,
}

/// Holds the latest published value. Publishing swaps the inner `Arc`, so a
/// reader holding an older value keeps a complete, unchanged copy of it.
#[derive(Debug)]
pub struct SnapshotCell<T> {
    current: Arc<RwLock<Arc<Published<T>>>>,
}

impl<T> Clone for SnapshotCell<T> {
    fn clone(&self) -> Self {
        SnapshotCell {
            current: Arc::clone(&self.current),
        }
    }
}

impl<T: Default> SnapshotCell<T> {
    pub fn new() -> Self {
        SnapshotCell {
            current: Arc::new(RwLock::new(Arc::new(Published::default()))),
        }
    }
}

impl<T: Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SnapshotCell<T> {
    pub fn load(&self) -> Arc<Published<T>> {
        // The lock only ever guards a pointer swap, a poisoned lock still
        // holds a complete value.
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    /// Only the refresh scheduler publishes.
    pub(crate) fn publish(&self, data: T) -> Arc<Published<T>> {
        let next = Arc::new(Published {
            timestamp: Some(Utc::now()),
            data,
        });
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Arc::clone(&next);
        next
    }
}

pub type RosterSnapshotCache = SnapshotCell<Vec<RatingSnapshot>>;
pub type ContestListingCache = SnapshotCell<ContestListing>;

#[derive(Clone, Default)]
pub struct MemoryCache {
    pub ratings: RosterSnapshotCache,
    pub contests: ContestListingCache,
}

impl MemoryCache {
    pub fn new() -> MemoryCache {
        MemoryCache::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::snapshot;

    #[test]
    fn cache_starts_empty_and_unpublished() {
        let cache = MemoryCache::new();
        let ratings = cache.ratings.load();
        assert!(ratings.timestamp.is_none());
        assert!(ratings.data.is_empty());
        assert!(cache.contests.load().data.upcoming.is_empty());
    }

    #[test]
    fn readers_keep_the_value_they_loaded() {
        let cache = MemoryCache::new();
        cache.ratings.publish(vec![snapshot("alice", 1000)]);
        let before = cache.ratings.load();

        cache.ratings.publish(vec![snapshot("bob", 2000), snapshot("carol", 10)]);
        let after = cache.ratings.load();

        assert_eq!(before.data, vec![snapshot("alice", 1000)]);
        assert_eq!(after.data.len(), 2);
        assert!(after.timestamp.is_some());
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn clones_share_the_same_cell() {
        let cache = MemoryCache::new();
        let reader = cache.clone();
        cache.ratings.publish(vec![snapshot("alice", 1000)]);
        assert_eq!(reader.ratings.load().data.len(), 1);
    }
}
