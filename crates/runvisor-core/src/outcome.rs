use std::fmt;

use crate::{KillError, LaunchError};

/// Terminal result of one supervised run.
///
/// `JobFailure`, `InfrastructureFailure`, `UnclassifiedFailure` and `Terminated` are
/// successful reports about a failed process. `LaunchError`, `KillError` and
/// `WaitError` mean the supervisor itself could not do its job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Exit code 0.
    Success,
    /// The reserved build-failure code: the job failed on its own.
    JobFailure { exit_code: i32 },
    /// The reserved system-failure code: the environment failed the job.
    InfrastructureFailure { exit_code: i32 },
    /// Any other non-zero exit code.
    UnclassifiedFailure { exit_code: i32 },
    /// The process did not exit normally (killed by a signal).
    Terminated { signal: Option<i32> },
    /// Waiting on the process failed, its exit was never observed.
    WaitError(String),
    LaunchError(LaunchError),
    KillError(KillError),
}

/// Who a [`RunOutcome`] should be reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureOwner {
    /// Nothing failed.
    None,
    Job,
    Infrastructure,
    /// The supervisor could not start, observe or stop the process.
    Supervisor,
    /// The process failed in a way no reserved code describes.
    Unknown,
}

impl RunOutcome {
    /// Outcome for a wait handoff that closed without a value.
    pub fn wait_task_lost() -> Self {
        RunOutcome::WaitError("wait task ended without reporting an exit".into())
    }

    /// `true` when the supervisor failed rather than the process.
    pub fn is_supervisor_error(&self) -> bool {
        self.owner() == FailureOwner::Supervisor
    }

    pub fn owner(&self) -> FailureOwner {
        match self {
            RunOutcome::Success => FailureOwner::None,
            RunOutcome::JobFailure { .. } => FailureOwner::Job,
            RunOutcome::InfrastructureFailure { .. } => FailureOwner::Infrastructure,
            RunOutcome::UnclassifiedFailure { .. } | RunOutcome::Terminated { .. } => {
                FailureOwner::Unknown
            }
            RunOutcome::WaitError(_) | RunOutcome::LaunchError(_) | RunOutcome::KillError(_) => {
                FailureOwner::Supervisor
            }
        }
    }

    /// Exit code of the process, when it exited with one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RunOutcome::Success => Some(0),
            RunOutcome::JobFailure { exit_code }
            | RunOutcome::InfrastructureFailure { exit_code }
            | RunOutcome::UnclassifiedFailure { exit_code } => Some(*exit_code),
            _ => None,
        }
    }

    /// Short stable label, used as a log field.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunOutcome::Success => "success",
            RunOutcome::JobFailure { .. } => "job_failure",
            RunOutcome::InfrastructureFailure { .. } => "infrastructure_failure",
            RunOutcome::UnclassifiedFailure { .. } => "unclassified_failure",
            RunOutcome::Terminated { .. } => "terminated",
            RunOutcome::WaitError(_) => "wait_error",
            RunOutcome::LaunchError(_) => "launch_error",
            RunOutcome::KillError(_) => "kill_error",
        }
    }
}

impl From<LaunchError> for RunOutcome {
    fn from(e: LaunchError) -> Self {
        RunOutcome::LaunchError(e)
    }
}

impl From<KillError> for RunOutcome {
    fn from(e: KillError) -> Self {
        RunOutcome::KillError(e)
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Success => f.write_str("process exited successfully"),
            RunOutcome::JobFailure { exit_code } => {
                write!(f, "job failed: exit code {exit_code}")
            }
            RunOutcome::InfrastructureFailure { exit_code } => {
                write!(f, "system failure: exit code {exit_code}")
            }
            RunOutcome::UnclassifiedFailure { exit_code } => {
                write!(f, "unknown failure: exit code {exit_code}")
            }
            RunOutcome::Terminated { signal: Some(sig) } => {
                write!(f, "process terminated by signal {sig}")
            }
            RunOutcome::Terminated { signal: None } => f.write_str("process terminated abnormally"),
            RunOutcome::WaitError(reason) => write!(f, "failed to wait for process: {reason}"),
            RunOutcome::LaunchError(e) => write!(f, "failed to start command: {e}"),
            RunOutcome::KillError(e) => write!(f, "failed to kill process: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_separates_job_infrastructure_and_supervisor() {
        assert_eq!(RunOutcome::Success.owner(), FailureOwner::None);
        assert_eq!(RunOutcome::JobFailure { exit_code: 1 }.owner(), FailureOwner::Job);
        assert_eq!(
            RunOutcome::InfrastructureFailure { exit_code: 2 }.owner(),
            FailureOwner::Infrastructure
        );
        assert_eq!(
            RunOutcome::UnclassifiedFailure { exit_code: 3 }.owner(),
            FailureOwner::Unknown
        );
        assert_eq!(RunOutcome::Terminated { signal: Some(9) }.owner(), FailureOwner::Unknown);

        let launch = RunOutcome::from(LaunchError::InvalidSpec("empty".into()));
        let kill = RunOutcome::from(KillError::Unsupported);
        assert!(launch.is_supervisor_error());
        assert!(kill.is_supervisor_error());
        assert!(RunOutcome::WaitError("gone".into()).is_supervisor_error());
        assert!(!RunOutcome::JobFailure { exit_code: 1 }.is_supervisor_error());
    }

    #[test]
    fn exit_code_only_for_exited_processes() {
        assert_eq!(RunOutcome::Success.exit_code(), Some(0));
        assert_eq!(RunOutcome::UnclassifiedFailure { exit_code: 42 }.exit_code(), Some(42));
        assert_eq!(RunOutcome::Terminated { signal: Some(15) }.exit_code(), None);
        assert_eq!(RunOutcome::from(KillError::Unsupported).exit_code(), None);
    }

    #[test]
    fn display_is_one_line() {
        assert_eq!(
            RunOutcome::JobFailure { exit_code: 1 }.to_string(),
            "job failed: exit code 1"
        );
        assert_eq!(
            RunOutcome::Terminated { signal: Some(9) }.to_string(),
            "process terminated by signal 9"
        );
        assert_eq!(
            RunOutcome::from(LaunchError::NotFound { command: "nope".into() }).to_string(),
            "failed to start command: executable not found: nope"
        );
    }
}
