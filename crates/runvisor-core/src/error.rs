use std::io;

use thiserror::Error;

/// The process could not be started.
///
/// Reported before any job semantics apply: it points at the environment or the
/// configuration, never at the job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("invalid process spec: {0}")]
    InvalidSpec(String),

    #[error("executable not found: {command}")]
    NotFound { command: String },

    #[error("permission denied executing {command}")]
    PermissionDenied { command: String },

    #[error("invalid working directory {path}: {reason}")]
    InvalidWorkingDir { path: String, reason: String },

    #[error("failed to start {command}: {reason}")]
    Io { command: String, reason: String },
}

impl LaunchError {
    /// Map a spawn failure of `command` onto the launch taxonomy.
    pub fn from_io(command: &str, err: &io::Error) -> Self {
        let command = command.to_string();
        match err.kind() {
            io::ErrorKind::NotFound => LaunchError::NotFound { command },
            io::ErrorKind::PermissionDenied => LaunchError::PermissionDenied { command },
            _ => LaunchError::Io {
                command,
                reason: err.to_string(),
            },
        }
    }
}

/// Cancellation was requested but termination could not be confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KillError {
    #[error("process {pid} still running {waited_ms}ms after graceful and forced termination")]
    Timeout { pid: u32, waited_ms: u64 },

    #[error("failed to send {signal} to process {pid}: {reason}")]
    Signal {
        pid: u32,
        signal: &'static str,
        reason: String,
    },

    #[error("process termination is not supported on this platform")]
    Unsupported,
}
