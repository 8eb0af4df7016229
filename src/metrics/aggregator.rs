use crate::config::MonitorConfig;
use crate::error::Result;
use crate::process::{
    GroupedProcess, GroupedSnapshot, ProcessSource, RawProcess, ResourceSample,
    TemporaryProcessFilter,
};
use chrono::{DateTime, Local};
use log::{debug, warn};
use std::collections::HashMap;

/// Groups the process table by executable name.
#[derive(Debug, Clone)]
pub struct Aggregator {
    filter: TemporaryProcessFilter,
    batch_size: usize,
}

impl Aggregator {
    pub fn new(filter: TemporaryProcessFilter, batch_size: usize) -> Self {
        Self {
            filter,
            batch_size: batch_size.max(1),
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            TemporaryProcessFilter::new(&config.excluded_names),
            config.sample_batch_size,
        )
    }

    /// Lists, samples and groups in one pass.
    ///
    /// Only a listing failure is returned as an error. Sampling failures leave
    /// the affected pids without a sample.
    pub fn collect(&self, source: &mut dyn ProcessSource) -> Result<GroupedSnapshot> {
        let raw = source.list_processes()?;
        let samples = self.sample(source, &raw);
        let total_memory = source.total_memory_bytes();
        Ok(self.aggregate(&raw, &samples, total_memory, Local::now()))
    }

    /// Pids worth sampling, in listing order.
    pub fn sampled_pids(&self, raw: &[RawProcess]) -> Vec<u32> {
        raw.iter()
            .filter(|p| !self.filter.is_excluded(p.group_name()))
            .map(|p| p.pid)
            .collect()
    }

    /// Samples in batches of `batch_size`; a failing batch is logged and skipped.
    pub fn sample(
        &self,
        source: &mut dyn ProcessSource,
        raw: &[RawProcess],
    ) -> HashMap<u32, ResourceSample> {
        let pids = self.sampled_pids(raw);
        let mut samples = HashMap::with_capacity(pids.len());
        for (i, batch) in pids.chunks(self.batch_size).enumerate() {
            match source.sample_usage(batch) {
                Ok(batch_samples) => samples.extend(batch_samples),
                Err(e) => warn!("Error sampling batch {} ({} pids): {}", i, batch.len(), e),
            }
        }
        debug!("Sampled {} of {} pids", samples.len(), pids.len());
        samples
    }

    /// Pure grouping step: same input, same snapshot.
    ///
    /// Means divide by the full member count, so members without a sample
    /// (missing, excluded, or in a failed batch) pull the average down.
    pub fn aggregate(
        &self,
        raw: &[RawProcess],
        samples: &HashMap<u32, ResourceSample>,
        total_memory_bytes: u64,
        captured_at: DateTime<Local>,
    ) -> GroupedSnapshot {
        let mut groups: Vec<GroupedProcess> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for process in raw {
            let name = process.group_name();
            let slot = *index.entry(name).or_insert_with(|| {
                groups.push(GroupedProcess {
                    name: name.to_string(),
                    pids: Vec::new(),
                    count: 0,
                    cpu_percent: 0.0,
                    memory_percent: 0.0,
                });
                groups.len() - 1
            });
            let group = &mut groups[slot];
            group.pids.push(process.pid);
            group.count += 1;
        }

        for group in &mut groups {
            if self.filter.is_excluded(&group.name) {
                continue;
            }
            let (cpu_sum, memory_sum) = group
                .pids
                .iter()
                .filter_map(|pid| samples.get(pid))
                .fold((0.0, 0.0), |(cpu, memory), sample| {
                    (
                        cpu + finite_or_zero(sample.cpu_percent),
                        memory + memory_percent(sample.memory_bytes, total_memory_bytes),
                    )
                });
            group.cpu_percent = cpu_sum / group.count as f64;
            group.memory_percent = memory_sum / group.count as f64;
        }

        GroupedSnapshot::new(groups, captured_at)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default())
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn memory_percent(memory_bytes: u64, total_memory_bytes: u64) -> f64 {
    if total_memory_bytes == 0 {
        return 0.0;
    }
    memory_bytes as f64 / total_memory_bytes as f64 * 100.0
}
