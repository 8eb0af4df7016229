use super::CircularBuffer;
use crate::process::GroupedSnapshot;
use chrono::{DateTime, Local};
use std::collections::HashMap;

/// Bounded cpu/memory time series for one process name.
///
/// The three buffers are always pushed together, so they stay index-aligned.
#[derive(Debug, Clone)]
pub struct HistorySeries {
    timestamps: CircularBuffer<DateTime<Local>>,
    cpu: CircularBuffer<f64>,
    memory: CircularBuffer<f64>,
}

impl HistorySeries {
    fn new(capacity: usize) -> Self {
        Self {
            timestamps: CircularBuffer::new(capacity),
            cpu: CircularBuffer::new(capacity),
            memory: CircularBuffer::new(capacity),
        }
    }

    fn push(&mut self, timestamp: DateTime<Local>, cpu: f64, memory: f64) {
        self.timestamps.push(timestamp);
        self.cpu.push(cpu);
        self.memory.push(memory);
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Local>> {
        self.timestamps.to_vec()
    }

    /// Uncapped cpu values, oldest first.
    pub fn cpu(&self) -> Vec<f64> {
        self.cpu.to_vec()
    }

    pub fn memory(&self) -> Vec<f64> {
        self.memory.to_vec()
    }

    pub fn last_cpu(&self) -> Option<f64> {
        self.cpu.last().copied()
    }

    pub fn last_memory(&self) -> Option<f64> {
        self.memory.last().copied()
    }

    pub fn peak_cpu(&self) -> f64 {
        self.cpu.iter().copied().fold(0.0, f64::max)
    }

    pub fn peak_memory(&self) -> f64 {
        self.memory.iter().copied().fold(0.0, f64::max)
    }

    pub fn avg_cpu(&self) -> f64 {
        if self.cpu.is_empty() {
            return 0.0;
        }
        self.cpu.iter().sum::<f64>() / self.cpu.len() as f64
    }
}

/// Trend data for every name in the current snapshot.
#[derive(Debug, Clone)]
pub struct HistoryTracker {
    series: HashMap<String, HistorySeries>,
    history_len: usize,
}

impl Default for HistoryTracker {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_HISTORY_LEN)
    }
}

impl HistoryTracker {
    pub fn new(history_len: usize) -> Self {
        Self {
            series: HashMap::new(),
            history_len,
        }
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }

    /// Appends one point per name in `snapshot` and drops every series whose
    /// name is absent. Calling it twice with the same snapshot appends twice.
    pub fn record(&mut self, snapshot: &GroupedSnapshot, timestamp: DateTime<Local>) {
        for group in snapshot.iter() {
            let history_len = self.history_len;
            self.series
                .entry(group.name.clone())
                .or_insert_with(|| HistorySeries::new(history_len))
                .push(timestamp, group.cpu_percent, group.memory_percent);
        }
        self.series.retain(|name, _| snapshot.contains(name));
    }

    pub fn get(&self, name: &str) -> Option<&HistorySeries> {
        self.series.get(name)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
