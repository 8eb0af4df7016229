mod rows;

pub use rows::*;

use crate::config::DEFAULT_PAGE_SIZE;
use crate::process::{GroupedProcess, GroupedSnapshot};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    Name,
    Cpu,
    Memory,
    Pid,
}

impl SortField {
    pub fn label(&self) -> &'static str {
        match self {
            SortField::Name => "Name",
            SortField::Cpu => "CPU",
            SortField::Memory => "Memory",
            SortField::Pid => "PID",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Asc => "⏶",
            SortDirection::Desc => "⏷",
        }
    }
}

/// Presentation state driving [`derive_view`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    search_term: String,
    pub current_page: usize,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            sort_field: SortField::Cpu,
            sort_direction: SortDirection::Desc,
            search_term: String::new(),
            current_page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ViewState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            ..Self::default()
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Changing the term sends the view back to the first page.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term != self.search_term {
            self.search_term = term;
            self.current_page = 0;
        }
    }

    pub fn set_sort(&mut self, field: SortField, direction: SortDirection) {
        if field != self.sort_field || direction != self.sort_direction {
            self.sort_field = field;
            self.sort_direction = direction;
            self.current_page = 0;
        }
    }

    /// Header click: the same field flips direction, a new one starts descending.
    pub fn toggle_sort(&mut self, field: SortField) {
        let direction = if field == self.sort_field {
            self.sort_direction.flipped()
        } else {
            SortDirection::Desc
        };
        self.set_sort(field, direction);
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 0
    }

    pub fn has_next(&self, total_pages: usize) -> bool {
        self.current_page + 1 < total_pages
    }

    pub fn prev_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        if self.has_next(total_pages) {
            self.current_page += 1;
        }
    }

    /// Pulls `current_page` back after the data shrank under it.
    pub fn clamp_page(&mut self, total_pages: usize) {
        self.current_page = self.current_page.min(total_pages.saturating_sub(1));
    }

    pub fn matches(&self, group: &GroupedProcess) -> bool {
        let term = self.search_term.trim().to_lowercase();
        term.is_empty()
            || group.name.to_lowercase().contains(&term)
            || group.pids.iter().any(|pid| pid.to_string().contains(&term))
    }

    fn compare(&self, a: &GroupedProcess, b: &GroupedProcess) -> Ordering {
        let ordering = match self.sort_field {
            SortField::Name => compare_names(&a.name, &b.name),
            SortField::Cpu => a.cpu_percent.total_cmp(&b.cpu_percent),
            SortField::Memory => a.memory_percent.total_cmp(&b.memory_percent),
            SortField::Pid => a.first_pid().unwrap_or(0).cmp(&b.first_pid().unwrap_or(0)),
        };
        match self.sort_direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Case-folded comparison; folded ties fall back to snapshot order.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewPage {
    pub page: Vec<GroupedProcess>,
    /// `ceil(total_count / page_size)`; 0 when nothing matched.
    pub total_pages: usize,
    pub total_count: usize,
}

impl ViewPage {
    /// Page count as shown to the user, never below 1.
    pub fn displayed_total_pages(&self) -> usize {
        self.total_pages.max(1)
    }
}

/// Filtered, sorted entries in snapshot order for ties.
pub fn filtered_sorted(snapshot: &GroupedSnapshot, state: &ViewState) -> Vec<GroupedProcess> {
    let mut entries: Vec<GroupedProcess> = snapshot
        .iter()
        .filter(|g| state.matches(g))
        .cloned()
        .collect();
    // `sort_by` is stable, so equal keys keep snapshot order.
    entries.sort_by(|a, b| state.compare(a, b));
    entries
}

pub fn derive_view(snapshot: &GroupedSnapshot, state: &ViewState) -> ViewPage {
    let entries = filtered_sorted(snapshot, state);
    let page_size = state.page_size.max(1);
    let total_count = entries.len();
    let total_pages = total_count.div_ceil(page_size);

    let start = state.current_page.saturating_mul(page_size).min(total_count);
    let end = start.saturating_add(page_size).min(total_count);

    ViewPage {
        page: entries[start..end].to_vec(),
        total_pages,
        total_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn group(name: &str, pid: u32, cpu: f64, memory: f64) -> GroupedProcess {
        GroupedProcess {
            name: name.to_string(),
            pids: vec![pid],
            count: 1,
            cpu_percent: cpu,
            memory_percent: memory,
        }
    }

    fn snapshot(groups: Vec<GroupedProcess>) -> GroupedSnapshot {
        GroupedSnapshot::new(groups, Local::now())
    }

    fn names(page: &ViewPage) -> Vec<&str> {
        page.page.iter().map(|g| g.name.as_str()).collect()
    }

    #[test]
    fn pages_of_fifteen() {
        let snap = snapshot(
            (0..31)
                .map(|i| group(&format!("p{:02}", i), i + 100, i as f64, 0.0))
                .collect(),
        );
        let mut state = ViewState::default();
        let view = derive_view(&snap, &state);
        assert_eq!(view.total_pages, 3);
        assert_eq!(view.total_count, 31);
        assert_eq!(view.page.len(), 15);
        assert_eq!(view.page[0].name, "p30");

        state.current_page = 2;
        let last = derive_view(&snap, &state);
        assert_eq!(last.page.len(), 1);
        assert_eq!(last.page[0].name, "p00");
    }

    #[test]
    fn empty_view_still_displays_one_page() {
        let view = derive_view(&GroupedSnapshot::empty(), &ViewState::default());
        assert_eq!(view.total_pages, 0);
        assert_eq!(view.displayed_total_pages(), 1);
        assert!(view.page.is_empty());
    }

    #[test]
    fn search_matches_name_or_pid() {
        let snap = snapshot(vec![
            group("Chrome", 1200, 1.0, 1.0),
            group("bash", 4512, 2.0, 1.0),
            group("sshd", 77, 3.0, 1.0),
        ]);
        let mut state = ViewState::default();
        state.set_search_term("  chr ");
        assert_eq!(names(&derive_view(&snap, &state)), vec!["Chrome"]);

        state.set_search_term("45");
        assert_eq!(names(&derive_view(&snap, &state)), vec!["bash"]);

        state.set_search_term("zzz");
        let view = derive_view(&snap, &state);
        assert_eq!(view.total_count, 0);
    }

    #[test]
    fn sorting_by_each_field() {
        let snap = snapshot(vec![
            group("beta", 30, 5.0, 9.0),
            group("Alpha", 10, 50.0, 1.0),
            group("gamma", 20, 20.0, 4.0),
        ]);
        let mut state = ViewState::default();

        state.set_sort(SortField::Name, SortDirection::Asc);
        assert_eq!(names(&derive_view(&snap, &state)), vec!["Alpha", "beta", "gamma"]);

        state.set_sort(SortField::Cpu, SortDirection::Desc);
        assert_eq!(names(&derive_view(&snap, &state)), vec!["Alpha", "gamma", "beta"]);

        state.set_sort(SortField::Memory, SortDirection::Asc);
        assert_eq!(names(&derive_view(&snap, &state)), vec!["Alpha", "gamma", "beta"]);

        state.set_sort(SortField::Pid, SortDirection::Desc);
        assert_eq!(names(&derive_view(&snap, &state)), vec!["beta", "gamma", "Alpha"]);
    }

    #[test]
    fn ties_keep_snapshot_order_in_both_directions() {
        let snap = snapshot(vec![
            group("first", 1, 5.0, 0.0),
            group("second", 2, 5.0, 0.0),
            group("third", 3, 9.0, 0.0),
        ]);
        let mut state = ViewState::default();
        assert_eq!(names(&derive_view(&snap, &state)), vec!["third", "first", "second"]);

        state.set_sort(SortField::Cpu, SortDirection::Asc);
        assert_eq!(names(&derive_view(&snap, &state)), vec!["first", "second", "third"]);
    }

    #[test]
    fn search_and_sort_changes_reset_page() {
        let mut state = ViewState::default();
        state.current_page = 2;
        state.set_search_term("x");
        assert_eq!(state.current_page, 0);

        state.current_page = 2;
        state.set_search_term("x");
        assert_eq!(state.current_page, 2, "unchanged term keeps the page");

        state.toggle_sort(SortField::Cpu);
        assert_eq!(state.sort_direction, SortDirection::Asc);
        assert_eq!(state.current_page, 0);

        state.current_page = 1;
        state.toggle_sort(SortField::Name);
        assert_eq!(state.sort_field, SortField::Name);
        assert_eq!(state.sort_direction, SortDirection::Desc);
        assert_eq!(state.current_page, 0);
    }

    #[test]
    fn paging_controls_clamp() {
        let mut state = ViewState::default();
        state.prev_page();
        assert_eq!(state.current_page, 0);
        state.next_page(2);
        state.next_page(2);
        assert_eq!(state.current_page, 1);
        assert!(!state.has_next(2));
        assert!(state.has_prev());

        state.current_page = 5;
        state.clamp_page(2);
        assert_eq!(state.current_page, 1);
        state.clamp_page(0);
        assert_eq!(state.current_page, 0);
    }
}
