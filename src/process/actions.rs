//! Process actions (lower priority, terminate)

use crate::error::{MonitorError, Result};
use log::{info, warn};

/// Nice value treated as "below normal".
pub const BELOW_NORMAL_NICE: i32 = 10;

/// Result of an action as handed to the renderer. `code` is the short
/// machine code of [`MonitorError::code`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub code: Option<String>,
}

impl ActionOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            code: None,
        }
    }

    pub fn failed(err: &MonitorError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            code: Some(err.code().to_string()),
        }
    }

    pub fn from_result(result: Result<()>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(e) => Self::failed(&e),
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        self.code.as_deref() == Some("EPERM")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessAction {
    LowerPriority,
    Terminate,
}

impl ProcessAction {
    pub fn verb(&self) -> &'static str {
        match self {
            ProcessAction::LowerPriority => "lower priority of",
            ProcessAction::Terminate => "terminate",
        }
    }
}

/// Opaque OS actions the core invokes on a single pid.
pub trait ProcessActions: Send + Sync {
    fn lower_priority(&self, pid: u32) -> Result<()>;
    fn terminate(&self, pid: u32) -> Result<()>;

    fn run(&self, action: ProcessAction, pid: u32) -> ActionOutcome {
        let result = match action {
            ProcessAction::LowerPriority => self.lower_priority(pid),
            ProcessAction::Terminate => self.terminate(pid),
        };
        match &result {
            Ok(()) => info!("Done: {} pid {}", action.verb(), pid),
            Err(e) => warn!("Failed to {} pid {}: {}", action.verb(), pid, e),
        }
        ActionOutcome::from_result(result)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemActions;

#[cfg(unix)]
fn last_os_error(pid: u32) -> MonitorError {
    let err = std::io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::EPERM) | Some(libc::EACCES) => MonitorError::PermissionDenied { pid },
        Some(libc::ESRCH) => MonitorError::NotFound { pid },
        _ => MonitorError::from_os_error(pid, err),
    }
}

#[cfg(unix)]
fn checked_pid(pid: u32) -> Result<libc::pid_t> {
    // 0 and negative values address process groups rather than one process.
    match libc::pid_t::try_from(pid) {
        Ok(p) if p > 0 => Ok(p),
        _ => Err(MonitorError::NotFound { pid }),
    }
}

#[cfg(unix)]
impl ProcessActions for SystemActions {
    fn lower_priority(&self, pid: u32) -> Result<()> {
        let target = checked_pid(pid)? as libc::id_t;
        // SAFETY: plain integer arguments, no pointers involved.
        let current = unsafe { libc::getpriority(libc::PRIO_PROCESS, target) };
        let nice = current.max(BELOW_NORMAL_NICE);
        // SAFETY: plain integer arguments, no pointers involved.
        if unsafe { libc::setpriority(libc::PRIO_PROCESS, target, nice) } != 0 {
            return Err(last_os_error(pid));
        }
        Ok(())
    }

    fn terminate(&self, pid: u32) -> Result<()> {
        let target = checked_pid(pid)?;
        // SAFETY: plain integer arguments, no pointers involved.
        if unsafe { libc::kill(target, libc::SIGTERM) } != 0 {
            return Err(last_os_error(pid));
        }
        Ok(())
    }
}

#[cfg(not(unix))]
impl ProcessActions for SystemActions {
    fn lower_priority(&self, _pid: u32) -> Result<()> {
        Err(MonitorError::Unsupported("changing process priority"))
    }

    fn terminate(&self, pid: u32) -> Result<()> {
        use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

        let target = Pid::from_u32(pid);
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[target]),
            true,
            ProcessRefreshKind::nothing(),
        );
        let process = system.process(target).ok_or(MonitorError::NotFound { pid })?;
        if process.kill() {
            Ok(())
        } else {
            Err(MonitorError::PermissionDenied { pid })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_carries_code_for_permission_errors() {
        let outcome = ActionOutcome::from_result(Err(MonitorError::PermissionDenied { pid: 1 }));
        assert!(!outcome.success);
        assert!(outcome.is_permission_denied());
        assert_eq!(outcome.code.as_deref(), Some("EPERM"));

        let outcome = ActionOutcome::from_result(Err(MonitorError::NotFound { pid: 1 }));
        assert!(!outcome.is_permission_denied());
        assert_eq!(outcome.code.as_deref(), Some("ESRCH"));

        assert_eq!(ActionOutcome::from_result(Ok(())), ActionOutcome::ok());
    }

    #[cfg(unix)]
    #[test]
    fn actions_on_missing_pid_report_not_found() {
        let actions = SystemActions;
        let outcome = actions.run(ProcessAction::Terminate, 0);
        assert_eq!(outcome.code.as_deref(), Some("ESRCH"));

        let outcome = actions.run(ProcessAction::LowerPriority, u32::MAX);
        assert_eq!(outcome.code.as_deref(), Some("ESRCH"));
    }

    #[cfg(unix)]
    #[test]
    fn lowering_priority_of_child_sets_below_normal() {
        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();

        let actions = SystemActions;
        assert!(actions.lower_priority(pid).is_ok());
        // SAFETY: plain integer arguments, no pointers involved.
        let nice = unsafe { libc::getpriority(libc::PRIO_PROCESS, pid as libc::id_t) };
        assert!(nice >= BELOW_NORMAL_NICE);

        assert_outcome_ok(&actions.run(ProcessAction::Terminate, pid));
        child.wait().unwrap();
    }

    #[cfg(unix)]
    fn assert_outcome_ok(outcome: &ActionOutcome) {
        assert!(outcome.success, "unexpected failure: {:?}", outcome.error);
    }
}
