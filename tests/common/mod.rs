#![allow(dead_code)]

use chrono::Local;
use procsight::process::{
    ActionOutcome, ProcessActions, ProcessDetails, ProcessSource, RawProcess, ResourceSample, SystemStats,
};
use procsight::{MonitorConfig, MonitorError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const TOTAL_MEMORY: u64 = 1_000;

/// Process table driven by the test instead of the OS.
#[derive(Debug, Default, Clone)]
pub struct FakeSource {
    pub processes: Vec<(u32, String, f64, u64)>,
    pub fail_listing: bool,
    /// Any batch containing one of these pids fails as a whole.
    pub failing_pids: HashSet<u32>,
    pub sampled_batches: Vec<Vec<u32>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, pid: u32, name: &str, cpu: f64, memory: u64) -> Self {
        self.processes.push((pid, name.to_string(), cpu, memory));
        self
    }

    pub fn set_cpu(&mut self, pid: u32, cpu: f64) {
        if let Some(p) = self.processes.iter_mut().find(|p| p.0 == pid) {
            p.2 = cpu;
        }
    }

    pub fn remove(&mut self, pid: u32) {
        self.processes.retain(|p| p.0 != pid);
    }
}

impl ProcessSource for FakeSource {
    fn list_processes(&mut self) -> Result<Vec<RawProcess>> {
        if self.fail_listing {
            return Err(MonitorError::SourceUnavailable("listing failed".into()));
        }
        Ok(self
            .processes
            .iter()
            .map(|(pid, name, _, _)| RawProcess::new(*pid, name.as_str()))
            .collect())
    }

    fn sample_usage(&mut self, pids: &[u32]) -> Result<HashMap<u32, ResourceSample>> {
        self.sampled_batches.push(pids.to_vec());
        if pids.iter().any(|pid| self.failing_pids.contains(pid)) {
            return Err(MonitorError::SamplingFailed {
                pids: pids.len(),
                reason: "batch failed".into(),
            });
        }
        Ok(self
            .processes
            .iter()
            .filter(|p| pids.contains(&p.0))
            .map(|(pid, _, cpu, memory)| {
                (
                    *pid,
                    ResourceSample {
                        pid: *pid,
                        cpu_percent: *cpu,
                        memory_bytes: *memory,
                        elapsed_ms: 100,
                    },
                )
            })
            .collect())
    }

    fn total_memory_bytes(&mut self) -> u64 {
        TOTAL_MEMORY
    }

    fn process_details(&mut self, pid: u32) -> Result<ProcessDetails> {
        let (pid, name, cpu, memory) = self
            .processes
            .iter()
            .find(|p| p.0 == pid)
            .cloned()
            .ok_or(MonitorError::NotFound { pid })?;
        Ok(ProcessDetails {
            name,
            pid,
            cpu_percent: cpu,
            memory_mb: memory as f64 / (1024.0 * 1024.0),
            user: "tester".into(),
            path: String::new(),
            start_time: Some(Local::now()),
        })
    }

    fn system_stats(&mut self) -> SystemStats {
        SystemStats::clamped(12.0, 40.0)
    }
}

/// Records every action; pids in `denied` fail with a permission error.
#[derive(Debug, Default, Clone)]
pub struct FakeActions {
    pub denied: HashSet<u32>,
    pub calls: Arc<Mutex<Vec<(&'static str, u32)>>>,
}

impl FakeActions {
    fn record(&self, verb: &'static str, pid: u32) -> Result<()> {
        self.calls.lock().unwrap().push((verb, pid));
        if self.denied.contains(&pid) {
            Err(MonitorError::PermissionDenied { pid })
        } else {
            Ok(())
        }
    }
}

impl ProcessActions for FakeActions {
    fn lower_priority(&self, pid: u32) -> Result<()> {
        self.record("lower_priority", pid)
    }

    fn terminate(&self, pid: u32) -> Result<()> {
        self.record("terminate", pid)
    }
}

/// Config that never serves from the cache, so every refresh aggregates.
pub fn uncached_config() -> MonitorConfig {
    MonitorConfig {
        cache_max_age_ms: 0,
        ..MonitorConfig::default()
    }
}

pub fn browser_scenario() -> FakeSource {
    FakeSource::new()
        .with(1, "chrome.exe", 10.0, 100)
        .with(2, "chrome.exe", 20.0, 200)
        .with(3, "chrome.exe", 30.0, 300)
        .with(4, "notepad.exe", 5.0, 50)
}

pub fn assert_outcome_ok(outcome: &ActionOutcome) {
    assert!(outcome.success, "unexpected failure: {:?}", outcome.error);
}
