use crate::config::MonitorConfig;
use crate::process::{capped_cpu, GroupedProcess, GroupedSnapshot, StatusTier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Update the rendered rows in place.
    Patch,
    /// Throw the rendered rows away and derive them again.
    Rebuild,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatchKind {
    Cpu { old: f64, new: f64 },
    Memory { old: f64, new: f64 },
    Status { old: StatusTier, new: StatusTier },
    /// Name not rendered before; the renderer creates a row for it.
    Added(GroupedProcess),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldPatch {
    pub name: String,
    pub kind: PatchKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileResult {
    pub mode: ReconcileMode,
    /// Only populated in `Patch` mode.
    pub patches: Vec<FieldPatch>,
    pub significant_changes: usize,
    pub removed: Vec<String>,
}

impl ReconcileResult {
    fn rebuild(significant_changes: usize, removed: Vec<String>) -> Self {
        Self {
            mode: ReconcileMode::Rebuild,
            patches: Vec::new(),
            significant_changes,
            removed,
        }
    }

    pub fn is_rebuild(&self) -> bool {
        self.mode == ReconcileMode::Rebuild
    }
}

/// Decides between patching rendered rows in place and a full rebuild.
///
/// Rows are aligned by position, so any removal forces a rebuild: deleting a
/// row would shift every row after it.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    value_change_threshold: f64,
    rebuild_ratio: f64,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default())
    }
}

impl Reconciler {
    pub fn new(value_change_threshold: f64, rebuild_ratio: f64) -> Self {
        Self {
            value_change_threshold,
            rebuild_ratio,
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.value_change_threshold, config.rebuild_ratio)
    }

    pub fn reconcile(&self, previous: &GroupedSnapshot, next: &GroupedSnapshot) -> ReconcileResult {
        if previous.is_empty() {
            return ReconcileResult::rebuild(next.len(), Vec::new());
        }

        let removed: Vec<String> = previous
            .names()
            .filter(|name| !next.contains(name))
            .map(str::to_string)
            .collect();

        let mut patches = Vec::new();
        let mut significant_changes = 0;

        for group in next.iter() {
            match previous.get(&group.name) {
                Some(old) => significant_changes += self.diff(old, group, &mut patches),
                None => {
                    patches.push(FieldPatch {
                        name: group.name.clone(),
                        kind: PatchKind::Added(group.clone()),
                    });
                    significant_changes += 1;
                }
            }
        }

        if !removed.is_empty() {
            return ReconcileResult::rebuild(significant_changes, removed);
        }

        let ratio = significant_changes as f64 / previous.len().max(1) as f64;
        if ratio > self.rebuild_ratio {
            return ReconcileResult::rebuild(significant_changes, removed);
        }

        ReconcileResult {
            mode: ReconcileMode::Patch,
            patches,
            significant_changes,
            removed,
        }
    }

    /// Pushes a patch per significant field and returns how many there were.
    fn diff(&self, old: &GroupedProcess, new: &GroupedProcess, patches: &mut Vec<FieldPatch>) -> usize {
        let before = patches.len();

        let (old_cpu, new_cpu) = (capped_cpu(old.cpu_percent), capped_cpu(new.cpu_percent));
        if (new_cpu - old_cpu).abs() > self.value_change_threshold {
            patches.push(FieldPatch {
                name: new.name.clone(),
                kind: PatchKind::Cpu {
                    old: old_cpu,
                    new: new_cpu,
                },
            });
        }

        let (old_memory, new_memory) = (finite(old.memory_percent), finite(new.memory_percent));
        if (new_memory - old_memory).abs() > self.value_change_threshold {
            patches.push(FieldPatch {
                name: new.name.clone(),
                kind: PatchKind::Memory {
                    old: old_memory,
                    new: new_memory,
                },
            });
        }

        let (old_status, new_status) = (old.status(), new.status());
        if old_status != new_status {
            patches.push(FieldPatch {
                name: new.name.clone(),
                kind: PatchKind::Status {
                    old: old_status,
                    new: new_status,
                },
            });
        }

        patches.len() - before
    }
}

fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
