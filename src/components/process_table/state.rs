use crate::metrics::RefreshOutcome;
use crate::process::GroupedSnapshot;
use crate::view::{RowTable, SortField, ViewState};
use std::sync::Arc;

/// Table state: the persisted view settings plus the rows on screen.
#[derive(serde::Deserialize, serde::Serialize, Default)]
#[serde(default)]
pub struct ProcessTable {
    pub view: ViewState,
    #[serde(skip)]
    pub search: String,
    #[serde(skip)]
    pub rows: RowTable,
    #[serde(skip)]
    snapshot: Arc<GroupedSnapshot>,
    #[serde(skip)]
    seen_generation: u64,
}

impl ProcessTable {
    pub fn snapshot(&self) -> &GroupedSnapshot {
        &self.snapshot
    }

    /// Takes in a refresh outcome. The reconcile result only describes the
    /// step from the previous generation, so a skipped generation rebuilds.
    pub fn sync(&mut self, outcome: &RefreshOutcome) {
        if outcome.generation == self.seen_generation {
            return;
        }
        let consecutive = outcome.generation == self.seen_generation + 1;
        self.seen_generation = outcome.generation;
        self.snapshot = Arc::clone(&outcome.snapshot);
        if consecutive {
            self.rows.apply(&outcome.reconcile, &self.snapshot, &mut self.view);
        } else {
            self.rows.rebuild(&self.snapshot, &mut self.view);
        }
    }

    /// Brings skipped state back in line with the persisted view after a
    /// load: the search box shows the active filter, paging starts over.
    pub fn restore(&mut self) {
        self.search = self.view.search_term().to_string();
        self.view.current_page = 0;
    }

    pub fn rederive(&mut self) {
        self.rows.rebuild(&self.snapshot, &mut self.view);
    }

    /// Pushes the search box into the view; rebuilds when the term changed.
    pub fn apply_search(&mut self) {
        if self.search != self.view.search_term() {
            self.view.set_search_term(self.search.clone());
            self.rederive();
        }
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.apply_search();
    }

    pub fn toggle_sort(&mut self, field: SortField) {
        self.view.toggle_sort(field);
        self.rederive();
    }

    pub fn prev_page(&mut self) {
        if self.view.has_prev() {
            self.view.prev_page();
            self.rederive();
        }
    }

    pub fn next_page(&mut self) {
        if self.view.has_next(self.rows.total_pages()) {
            self.view.next_page(self.rows.total_pages());
            self.rederive();
        }
    }
}
