mod aggregator;
mod cache;
mod circular_buffer;
mod history;
mod reconciler;
mod refresher;

pub use aggregator::*;
pub use cache::*;
pub use circular_buffer::*;
pub use history::*;
pub use reconciler::*;
pub use refresher::*;

use crate::config::MonitorConfig;
use crate::process::{GroupedSnapshot, ProcessSource};
use log::debug;
use std::sync::Arc;
use std::time::Duration;

/// Result of one refresh, handed to the renderer as plain data.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub snapshot: Arc<GroupedSnapshot>,
    pub reconcile: ReconcileResult,
    pub origin: SnapshotOrigin,
    /// Set only when no snapshot at all could be produced.
    pub error: Option<String>,
    /// Incremented on every applied refresh.
    pub generation: u64,
}

/// Aggregator, cache, history and reconciler threaded through one context.
///
/// `previous` is the snapshot the renderer last received; the reconciler
/// diffs against it rather than anything read back from the screen.
#[derive(Debug)]
pub struct MonitorEngine {
    config: MonitorConfig,
    aggregator: Aggregator,
    cache: SnapshotCache,
    reconciler: Reconciler,
    history: HistoryTracker,
    previous: Arc<GroupedSnapshot>,
    last_outcome: Option<RefreshOutcome>,
    generation: u64,
}

impl Default for MonitorEngine {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

impl MonitorEngine {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            aggregator: Aggregator::from_config(&config),
            reconciler: Reconciler::from_config(&config),
            history: HistoryTracker::new(config.history_len),
            cache: SnapshotCache::new(),
            previous: Arc::new(GroupedSnapshot::empty()),
            last_outcome: None,
            generation: 0,
            config,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryTracker {
        &self.history
    }

    pub fn last_outcome(&self) -> Option<&RefreshOutcome> {
        self.last_outcome.as_ref()
    }

    fn max_age(&self) -> Duration {
        Duration::from_millis(self.config.cache_max_age_ms)
    }

    /// Slow half of a refresh: serve the cache or aggregate from `source`.
    /// Needs only `&self`, so a shared lock suffices while it runs.
    pub fn fetch(&self, source: &mut dyn ProcessSource) -> SnapshotRead {
        self.cache
            .get_snapshot(self.max_age(), || self.aggregator.collect(source))
    }

    /// Fast half: record history, reconcile against the last delivered
    /// snapshot and publish the outcome.
    pub fn apply(&mut self, read: SnapshotRead) -> RefreshOutcome {
        let SnapshotRead {
            snapshot,
            origin,
            error,
        } = read;

        // Cached and stale reads carry no new sample.
        if origin == SnapshotOrigin::Fresh {
            self.history.record(&snapshot, snapshot.captured_at());
        }

        let reconcile = self.reconciler.reconcile(&self.previous, &snapshot);
        debug!(
            "Refresh: {} groups ({:?}), {:?} with {} patches",
            snapshot.len(),
            origin,
            reconcile.mode,
            reconcile.patches.len()
        );

        self.generation += 1;
        self.previous = Arc::clone(&snapshot);
        let outcome = RefreshOutcome {
            snapshot,
            reconcile,
            origin,
            error: match origin {
                SnapshotOrigin::Empty => error.map(|e| e.to_string()),
                _ => None,
            },
            generation: self.generation,
        };
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    pub fn refresh(&mut self, source: &mut dyn ProcessSource) -> RefreshOutcome {
        let read = self.fetch(source);
        self.apply(read)
    }
}
