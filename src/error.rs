use thiserror::Error;

pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// The OS process table could not be read.
    #[error("process table unavailable: {0}")]
    SourceUnavailable(String),

    /// A sampling batch failed as a whole.
    #[error("sampling failed for {pids} pids: {reason}")]
    SamplingFailed { pids: usize, reason: String },

    #[error("permission denied for pid {pid}")]
    PermissionDenied { pid: u32 },

    #[error("no process with pid {pid}")]
    NotFound { pid: u32 },

    #[error("unsupported on this platform: {0}")]
    Unsupported(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MonitorError {
    /// Short machine code handed to the presentation layer.
    pub fn code(&self) -> &'static str {
        match self {
            MonitorError::PermissionDenied { .. } => "EPERM",
            MonitorError::NotFound { .. } => "ESRCH",
            _ => "UNKNOWN",
        }
    }

    /// Maps an OS error raised while acting on `pid` to the action taxonomy.
    pub fn from_os_error(pid: u32, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => MonitorError::PermissionDenied { pid },
            std::io::ErrorKind::NotFound => MonitorError::NotFound { pid },
            _ => MonitorError::Io(err),
        }
    }
}
