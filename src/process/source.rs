use super::{ProcessDetails, RawProcess, ResourceSample, SystemStats};
use crate::error::{MonitorError, Result};
use chrono::{DateTime, Local};
use log::debug;
use std::collections::HashMap;
use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind, Users};

/// Everything the core needs from the operating system's process table.
pub trait ProcessSource: Send {
    /// Point-in-time listing of the process table.
    fn list_processes(&mut self) -> Result<Vec<RawProcess>>;

    /// Usage for the given pids. Pids the sampler could not see are simply
    /// missing from the map; an `Err` means the whole batch failed.
    fn sample_usage(&mut self, pids: &[u32]) -> Result<HashMap<u32, ResourceSample>>;

    fn total_memory_bytes(&mut self) -> u64;

    fn process_details(&mut self, pid: u32) -> Result<ProcessDetails>;

    fn system_stats(&mut self) -> SystemStats;
}

/// `ProcessSource` backed by `sysinfo`.
///
/// The `System` is kept between calls: cpu usage is computed from the delta
/// against the previous refresh of the same pid, so the first pass reads 0.
pub struct SysinfoSource {
    system: System,
    users: Users,
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoSource {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        Self {
            system,
            users: Users::new_with_refreshed_list(),
        }
    }

    fn owner_of(&self, process: &Process) -> String {
        process
            .user_id()
            .and_then(|uid| self.users.get_user_by_id(uid))
            .map(|user| user.name().to_string())
            .unwrap_or_default()
    }

    fn command_line_of(process: &Process) -> String {
        process
            .cmd()
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_raw(&self, process: &Process) -> RawProcess {
        RawProcess {
            pid: process.pid().as_u32(),
            name: process.name().to_string_lossy().into_owned(),
            command_line: Self::command_line_of(process),
            owner: self.owner_of(process),
        }
    }

    fn to_sample(process: &Process) -> ResourceSample {
        ResourceSample {
            pid: process.pid().as_u32(),
            cpu_percent: process.cpu_usage() as f64,
            memory_bytes: process.memory(),
            elapsed_ms: process.run_time().saturating_mul(1000),
        }
    }
}

fn local_time(epoch_secs: u64) -> Option<DateTime<Local>> {
    DateTime::from_timestamp(i64::try_from(epoch_secs).ok()?, 0).map(|dt| dt.with_timezone(&Local))
}

impl ProcessSource for SysinfoSource {
    fn list_processes(&mut self) -> Result<Vec<RawProcess>> {
        let refreshed = self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_cmd(UpdateKind::OnlyIfNotSet)
                .with_exe(UpdateKind::OnlyIfNotSet)
                .with_user(UpdateKind::OnlyIfNotSet),
        );
        if refreshed == 0 || self.system.processes().is_empty() {
            return Err(MonitorError::SourceUnavailable(
                "no processes visible in the process table".to_string(),
            ));
        }

        let mut processes: Vec<_> = self
            .system
            .processes()
            .values()
            .map(|p| self.to_raw(p))
            .collect();
        processes.sort_by_key(|p| p.pid);
        debug!("Listed {} processes", processes.len());
        Ok(processes)
    }

    fn sample_usage(&mut self, pids: &[u32]) -> Result<HashMap<u32, ResourceSample>> {
        let targets: Vec<Pid> = pids.iter().map(|&pid| Pid::from_u32(pid)).collect();
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&targets),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );

        Ok(targets
            .iter()
            .filter_map(|pid| self.system.process(*pid))
            .map(|p| (p.pid().as_u32(), Self::to_sample(p)))
            .collect())
    }

    fn total_memory_bytes(&mut self) -> u64 {
        self.system.refresh_memory();
        self.system.total_memory()
    }

    fn process_details(&mut self, pid: u32) -> Result<ProcessDetails> {
        let target = Pid::from_u32(pid);
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[target]),
            true,
            ProcessRefreshKind::everything(),
        );
        let process = self
            .system
            .process(target)
            .ok_or(MonitorError::NotFound { pid })?;

        let path = process
            .exe()
            .map(|exe| exe.display().to_string())
            .unwrap_or_else(|| Self::command_line_of(process));
        let user = self.owner_of(process);

        Ok(ProcessDetails {
            name: process.name().to_string_lossy().into_owned(),
            pid,
            cpu_percent: process.cpu_usage() as f64,
            memory_mb: process.memory() as f64 / (1024.0 * 1024.0),
            user: if user.is_empty() {
                "Unknown".to_string()
            } else {
                user
            },
            path,
            start_time: local_time(process.start_time()),
        })
    }

    fn system_stats(&mut self) -> SystemStats {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        let total = self.system.total_memory();
        let memory_percent = if total == 0 {
            0.0
        } else {
            self.system.used_memory() as f64 / total as f64 * 100.0
        };
        SystemStats::clamped(self.system.global_cpu_usage() as f64, memory_percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_the_current_process() {
        let mut source = SysinfoSource::new();
        let processes = source.list_processes().unwrap();
        let current = std::process::id();
        assert!(processes.iter().any(|p| p.pid == current));
        assert!(processes.windows(2).all(|w| w[0].pid <= w[1].pid));
    }

    #[test]
    fn samples_only_known_pids() {
        let mut source = SysinfoSource::new();
        let current = std::process::id();
        let samples = source.sample_usage(&[current, 999_999_999]).unwrap();
        assert!(samples.contains_key(&current));
        assert!(!samples.contains_key(&999_999_999));
    }

    #[test]
    fn details_for_missing_pid_is_not_found() {
        let mut source = SysinfoSource::new();
        assert!(matches!(
            source.process_details(999_999_999),
            Err(MonitorError::NotFound { pid: 999_999_999 })
        ));
    }

    #[test]
    fn system_stats_stay_in_range() {
        let mut source = SysinfoSource::new();
        let stats = source.system_stats();
        assert!((0.0..=100.0).contains(&stats.cpu_percent));
        assert!((0.0..=100.0).contains(&stats.memory_percent));
    }
}
