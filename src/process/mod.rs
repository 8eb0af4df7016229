mod actions;
mod filter;
mod source;

pub use actions::*;
pub use filter::*;
pub use source::*;

use chrono::{DateTime, Local};
use std::collections::HashMap;

/// Name used for processes the OS reports without one.
pub const UNKNOWN_PROCESS_NAME: &str = "unknown";

/// One row of the OS process table, valid for a single sampling pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProcess {
    pub pid: u32,
    pub name: String,
    pub command_line: String,
    pub owner: String,
}

impl RawProcess {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
            command_line: String::new(),
            owner: String::new(),
        }
    }

    /// Grouping key: the executable name, or `unknown` when the OS gave none.
    pub fn group_name(&self) -> &str {
        if self.name.is_empty() {
            UNKNOWN_PROCESS_NAME
        } else {
            &self.name
        }
    }
}

/// CPU/memory usage for one pid. `cpu_percent` may exceed 100 on multi-core hosts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResourceSample {
    pub pid: u32,
    pub cpu_percent: f64,
    pub memory_bytes: u64,
    pub elapsed_ms: u64,
}

/// Processes sharing an executable name, with usage averaged over the members.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedProcess {
    pub name: String,
    /// Member pids in first-seen order.
    pub pids: Vec<u32>,
    pub count: usize,
    /// Mean cpu over all members, uncapped.
    pub cpu_percent: f64,
    /// Mean share of total system memory over all members.
    pub memory_percent: f64,
}

impl GroupedProcess {
    pub fn first_pid(&self) -> Option<u32> {
        self.pids.first().copied()
    }

    /// Cpu clamped to 100 for display and tiering.
    pub fn display_cpu(&self) -> f64 {
        capped_cpu(self.cpu_percent)
    }

    pub fn status(&self) -> StatusTier {
        StatusTier::from_usage(self.cpu_percent, self.memory_percent)
    }
}

pub fn capped_cpu(cpu_percent: f64) -> f64 {
    if cpu_percent.is_finite() {
        cpu_percent.min(100.0)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusTier {
    Normal,
    HighCpu,
    HighMemory,
    CriticalCpu,
    CriticalMemory,
}

impl StatusTier {
    /// Cpu is checked before memory at each level, even when memory is the worse signal.
    pub fn from_usage(cpu_percent: f64, memory_percent: f64) -> Self {
        let cpu = capped_cpu(cpu_percent);
        let memory = if memory_percent.is_finite() {
            memory_percent
        } else {
            0.0
        };
        if cpu > 80.0 {
            StatusTier::CriticalCpu
        } else if memory > 80.0 {
            StatusTier::CriticalMemory
        } else if cpu > 50.0 {
            StatusTier::HighCpu
        } else if memory > 50.0 {
            StatusTier::HighMemory
        } else {
            StatusTier::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusTier::Normal => "",
            StatusTier::HighCpu => "High CPU",
            StatusTier::HighMemory => "High Memory",
            StatusTier::CriticalCpu => "Critical CPU",
            StatusTier::CriticalMemory => "Critical Memory",
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, StatusTier::CriticalCpu | StatusTier::CriticalMemory)
    }
}

/// Point-in-time aggregation of the process table by name.
///
/// Groups keep the order in which their names were first seen; lookups by
/// name go through an index so both iteration order and `get` are cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSnapshot {
    groups: Vec<GroupedProcess>,
    index: HashMap<String, usize>,
    captured_at: DateTime<Local>,
}

impl GroupedSnapshot {
    pub fn new(groups: Vec<GroupedProcess>, captured_at: DateTime<Local>) -> Self {
        let index = groups
            .iter()
            .enumerate()
            .map(|(i, group)| (group.name.clone(), i))
            .collect();
        Self {
            groups,
            index,
            captured_at,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Local::now())
    }

    pub fn get(&self, name: &str) -> Option<&GroupedProcess> {
        self.index.get(name).map(|&i| &self.groups[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupedProcess> {
        self.groups.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn groups(&self) -> &[GroupedProcess] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of raw processes folded into this snapshot.
    pub fn process_count(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }

    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }
}

impl Default for GroupedSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Extended information for a single pid, shown in the details window.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessDetails {
    pub name: String,
    pub pid: u32,
    pub cpu_percent: f64,
    pub memory_mb: f64,
    pub user: String,
    pub path: String,
    pub start_time: Option<DateTime<Local>>,
}

/// Host-wide usage, both values within [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SystemStats {
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

impl SystemStats {
    pub fn clamped(cpu_percent: f64, memory_percent: f64) -> Self {
        let clamp = |v: f64| if v.is_finite() { v.clamp(0.0, 100.0) } else { 0.0 };
        Self {
            cpu_percent: clamp(cpu_percent),
            memory_percent: clamp(memory_percent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, cpu: f64, memory: f64) -> GroupedProcess {
        GroupedProcess {
            name: name.to_string(),
            pids: vec![1],
            count: 1,
            cpu_percent: cpu,
            memory_percent: memory,
        }
    }

    #[test]
    fn cpu_tier_wins_over_memory() {
        assert_eq!(StatusTier::from_usage(85.0, 40.0), StatusTier::CriticalCpu);
        assert_eq!(StatusTier::from_usage(85.0, 95.0), StatusTier::CriticalCpu);
        assert_eq!(StatusTier::from_usage(60.0, 90.0), StatusTier::CriticalMemory);
        assert_eq!(StatusTier::from_usage(60.0, 10.0), StatusTier::HighCpu);
        assert_eq!(StatusTier::from_usage(10.0, 60.0), StatusTier::HighMemory);
        assert_eq!(StatusTier::from_usage(50.0, 50.0), StatusTier::Normal);
    }

    #[test]
    fn cpu_is_capped_only_for_display() {
        let g = group("render", 340.0, 1.0);
        assert_eq!(g.display_cpu(), 100.0);
        assert_eq!(g.cpu_percent, 340.0);
        assert_eq!(g.status(), StatusTier::CriticalCpu);
        assert_eq!(capped_cpu(f64::NAN), 0.0);
    }

    #[test]
    fn empty_name_groups_as_unknown() {
        assert_eq!(RawProcess::new(9, "").group_name(), "unknown");
        assert_eq!(RawProcess::new(9, "sh").group_name(), "sh");
    }

    #[test]
    fn snapshot_lookup_preserves_insertion_order() {
        let snapshot = GroupedSnapshot::new(
            vec![group("b", 1.0, 1.0), group("a", 2.0, 2.0)],
            Local::now(),
        );
        assert_eq!(snapshot.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(snapshot.get("a").map(|g| g.cpu_percent), Some(2.0));
        assert!(snapshot.get("c").is_none());
        assert_eq!(snapshot.process_count(), 2);
    }

    #[test]
    fn system_stats_are_clamped() {
        let stats = SystemStats::clamped(130.0, -4.0);
        assert_eq!(stats.cpu_percent, 100.0);
        assert_eq!(stats.memory_percent, 0.0);
    }
}
