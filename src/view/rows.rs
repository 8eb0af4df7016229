use super::{derive_view, ViewState};
use crate::metrics::{PatchKind, ReconcileResult};
use crate::process::{GroupedProcess, GroupedSnapshot};
use std::collections::HashSet;

/// Rows currently on screen, kept between refreshes.
///
/// A rebuild re-derives the page from scratch. A patch keeps row positions,
/// refreshes every row's values from the new snapshot and appends added
/// names while the page has room.
#[derive(Debug, Clone, Default)]
pub struct RowTable {
    rows: Vec<GroupedProcess>,
    total_pages: usize,
    total_count: usize,
    selected_pid: Option<u32>,
    changed: HashSet<String>,
}

impl RowTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[GroupedProcess] {
        &self.rows
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Page count as shown to the user, never below 1.
    pub fn displayed_total_pages(&self) -> usize {
        self.total_pages.max(1)
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Names whose values moved significantly in the last patch.
    pub fn is_changed(&self, name: &str) -> bool {
        self.changed.contains(name)
    }

    pub fn rebuild(&mut self, snapshot: &GroupedSnapshot, state: &mut ViewState) {
        let mut view = derive_view(snapshot, state);
        if state.current_page > 0 && state.current_page >= view.total_pages {
            state.clamp_page(view.total_pages);
            view = derive_view(snapshot, state);
        }
        self.rows = view.page;
        self.total_pages = view.total_pages;
        self.total_count = view.total_count;
        self.changed.clear();
        if let Some(pid) = self.selected_pid {
            if !self.rows.iter().any(|r| r.pids.contains(&pid)) {
                self.selected_pid = None;
            }
        }
    }

    /// Applies a reconcile result computed against the snapshot these rows
    /// were derived from.
    pub fn apply(
        &mut self,
        result: &ReconcileResult,
        snapshot: &GroupedSnapshot,
        state: &mut ViewState,
    ) {
        if result.is_rebuild() || self.rows.is_empty() {
            self.rebuild(snapshot, state);
            return;
        }

        for row in &mut self.rows {
            if let Some(fresh) = snapshot.get(&row.name) {
                *row = fresh.clone();
            }
        }

        self.changed.clear();
        for patch in &result.patches {
            match &patch.kind {
                PatchKind::Added(group) => {
                    if state.matches(group) && self.rows.len() < state.page_size {
                        self.rows.push(group.clone());
                    }
                }
                _ => {
                    self.changed.insert(patch.name.clone());
                }
            }
        }

        self.total_count = snapshot.iter().filter(|g| state.matches(g)).count();
        self.total_pages = self.total_count.div_ceil(state.page_size.max(1));
    }

    pub fn select(&mut self, pid: u32) {
        self.selected_pid = Some(pid);
    }

    pub fn selected_pid(&self) -> Option<u32> {
        self.selected_pid
    }

    pub fn selected_row(&self) -> Option<&GroupedProcess> {
        let pid = self.selected_pid?;
        self.rows.iter().find(|r| r.pids.contains(&pid))
    }
}
