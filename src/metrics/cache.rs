use crate::error::{MonitorError, Result};
use crate::process::GroupedSnapshot;
use log::{error, warn};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Where the snapshot handed out by [`SnapshotCache::get_snapshot`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// Newly aggregated; already stored in the cache.
    Fresh,
    /// Cached value still within the max age; no aggregation ran.
    Cached,
    /// Aggregation failed; the last good snapshot was served instead.
    Stale,
    /// Aggregation failed and nothing was ever cached.
    Empty,
}

#[derive(Debug)]
pub struct SnapshotRead {
    pub snapshot: Arc<GroupedSnapshot>,
    pub origin: SnapshotOrigin,
    pub error: Option<MonitorError>,
}

#[derive(Debug, Clone)]
struct CachedSnapshot {
    snapshot: Arc<GroupedSnapshot>,
    stored_at: Instant,
}

/// Holds the last good snapshot.
///
/// A stale entry is never evicted; it stays until a successful refresh
/// replaces it. Snapshot and timestamp are swapped in one assignment, so
/// readers see either the old pair or the new one.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    slot: RwLock<Option<CachedSnapshot>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached snapshot if it is non-empty and younger than `max_age`.
    pub fn fresh(&self, max_age: Duration) -> Option<Arc<GroupedSnapshot>> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|c| !c.snapshot.is_empty() && c.stored_at.elapsed() < max_age)
            .map(|c| Arc::clone(&c.snapshot))
    }

    /// Last stored snapshot regardless of age.
    pub fn last_good(&self) -> Option<Arc<GroupedSnapshot>> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().map(|c| Arc::clone(&c.snapshot))
    }

    pub fn store(&self, snapshot: GroupedSnapshot) -> Arc<GroupedSnapshot> {
        let snapshot = Arc::new(snapshot);
        let entry = CachedSnapshot {
            snapshot: Arc::clone(&snapshot),
            stored_at: Instant::now(),
        };
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(entry);
        snapshot
    }

    /// Serves a young cached snapshot, otherwise runs `refresh`.
    ///
    /// On failure the last good snapshot is returned even if stale; an empty
    /// snapshot only comes back when nothing was ever cached.
    pub fn get_snapshot<F>(&self, max_age: Duration, refresh: F) -> SnapshotRead
    where
        F: FnOnce() -> Result<GroupedSnapshot>,
    {
        if let Some(snapshot) = self.fresh(max_age) {
            return SnapshotRead {
                snapshot,
                origin: SnapshotOrigin::Cached,
                error: None,
            };
        }

        match refresh() {
            Ok(snapshot) => SnapshotRead {
                snapshot: self.store(snapshot),
                origin: SnapshotOrigin::Fresh,
                error: None,
            },
            Err(e) => match self.last_good() {
                Some(snapshot) => {
                    warn!("Error getting processes: {}; serving cached snapshot", e);
                    SnapshotRead {
                        snapshot,
                        origin: SnapshotOrigin::Stale,
                        error: Some(e),
                    }
                }
                None => {
                    error!("Error getting processes: {}; no cached snapshot", e);
                    SnapshotRead {
                        snapshot: Arc::new(GroupedSnapshot::empty()),
                        origin: SnapshotOrigin::Empty,
                        error: Some(e),
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::GroupedProcess;
    use chrono::Local;

    const MAX_AGE: Duration = Duration::from_millis(2000);

    fn snapshot(name: &str) -> GroupedSnapshot {
        GroupedSnapshot::new(
            vec![GroupedProcess {
                name: name.to_string(),
                pids: vec![1],
                count: 1,
                cpu_percent: 0.0,
                memory_percent: 0.0,
            }],
            Local::now(),
        )
    }

    fn unavailable() -> Result<GroupedSnapshot> {
        Err(MonitorError::SourceUnavailable("ps failed".into()))
    }

    #[test]
    fn young_snapshot_is_served_without_refresh() {
        let cache = SnapshotCache::new();
        cache.store(snapshot("a"));
        let read = cache.get_snapshot(MAX_AGE, || panic!("should not refresh"));
        assert_eq!(read.origin, SnapshotOrigin::Cached);
        assert!(read.snapshot.contains("a"));
    }

    #[test]
    fn expired_snapshot_triggers_refresh_and_replacement() {
        let cache = SnapshotCache::new();
        cache.store(snapshot("a"));
        let read = cache.get_snapshot(Duration::ZERO, || Ok(snapshot("b")));
        assert_eq!(read.origin, SnapshotOrigin::Fresh);
        assert!(cache.last_good().unwrap().contains("b"));
    }

    #[test]
    fn empty_cached_snapshot_is_never_served_as_fresh() {
        let cache = SnapshotCache::new();
        cache.store(GroupedSnapshot::empty());
        assert!(cache.fresh(MAX_AGE).is_none());
    }

    #[test]
    fn failure_falls_back_to_stale_snapshot() {
        let cache = SnapshotCache::new();
        cache.store(snapshot("a"));
        let read = cache.get_snapshot(Duration::ZERO, unavailable);
        assert_eq!(read.origin, SnapshotOrigin::Stale);
        assert!(read.snapshot.contains("a"));
        assert!(matches!(read.error, Some(MonitorError::SourceUnavailable(_))));
        // The stale entry stays until a success replaces it.
        assert!(cache.last_good().unwrap().contains("a"));
    }

    #[test]
    fn failure_without_cache_yields_empty_snapshot() {
        let cache = SnapshotCache::new();
        let read = cache.get_snapshot(MAX_AGE, unavailable);
        assert_eq!(read.origin, SnapshotOrigin::Empty);
        assert!(read.snapshot.is_empty());
        assert!(read.error.is_some());
        assert!(cache.last_good().is_none());
    }
}
