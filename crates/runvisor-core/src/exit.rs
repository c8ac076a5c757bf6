//! Raw process termination and its classification.
use std::process::ExitStatus;

use runvisor_model::{BUILD_FAILURE_EXIT_CODE, SYSTEM_FAILURE_EXIT_CODE};

use crate::RunOutcome;

/// How a process ended, as observed by [`crate::ProcessHandle::wait`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitSignal {
    /// Normal termination with an exit code.
    Exited(i32),
    /// Terminated without an exit code, usually by a signal (number when known).
    Signaled(Option<i32>),
    /// The wait primitive itself failed; the process state is unknown.
    WaitFailed(String),
}

impl From<ExitStatus> for ExitSignal {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitSignal::Exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            ExitSignal::Signaled(status.signal())
        }

        #[cfg(not(unix))]
        {
            ExitSignal::Signaled(None)
        }
    }
}

/// Map a raw termination onto a [`RunOutcome`].
///
/// Exit codes are bucketed by the reserved-code contract; anything without an
/// exit code is passed through without bucketing.
pub fn classify(signal: ExitSignal) -> RunOutcome {
    match signal {
        ExitSignal::Exited(0) => RunOutcome::Success,
        ExitSignal::Exited(BUILD_FAILURE_EXIT_CODE) => RunOutcome::JobFailure {
            exit_code: BUILD_FAILURE_EXIT_CODE,
        },
        ExitSignal::Exited(SYSTEM_FAILURE_EXIT_CODE) => RunOutcome::InfrastructureFailure {
            exit_code: SYSTEM_FAILURE_EXIT_CODE,
        },
        ExitSignal::Exited(exit_code) => RunOutcome::UnclassifiedFailure { exit_code },
        ExitSignal::Signaled(signal) => RunOutcome::Terminated { signal },
        ExitSignal::WaitFailed(reason) => RunOutcome::WaitError(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_codes_map_to_their_buckets() {
        assert_eq!(classify(ExitSignal::Exited(0)), RunOutcome::Success);
        assert_eq!(
            classify(ExitSignal::Exited(1)),
            RunOutcome::JobFailure { exit_code: 1 }
        );
        assert_eq!(
            classify(ExitSignal::Exited(2)),
            RunOutcome::InfrastructureFailure { exit_code: 2 }
        );
        assert_eq!(
            classify(ExitSignal::Exited(42)),
            RunOutcome::UnclassifiedFailure { exit_code: 42 }
        );
    }

    #[test]
    fn every_code_lands_in_exactly_one_bucket() {
        let samples = [i32::MIN, -1, 0, 1, 2, 3, 126, 127, 128, 255, 256, i32::MAX];

        for code in samples {
            let outcome = classify(ExitSignal::Exited(code));
            let buckets = [
                outcome == RunOutcome::Success,
                matches!(outcome, RunOutcome::JobFailure { .. }),
                matches!(outcome, RunOutcome::InfrastructureFailure { .. }),
                matches!(outcome, RunOutcome::UnclassifiedFailure { exit_code } if exit_code == code),
            ];
            assert_eq!(
                buckets.iter().filter(|b| **b).count(),
                1,
                "code {code} classified as {outcome:?}"
            );
            assert_eq!(outcome.exit_code(), Some(code));
        }
    }

    #[test]
    fn signal_termination_is_not_bucketed() {
        assert_eq!(
            classify(ExitSignal::Signaled(Some(9))),
            RunOutcome::Terminated { signal: Some(9) }
        );
        assert_eq!(
            classify(ExitSignal::Signaled(None)),
            RunOutcome::Terminated { signal: None }
        );
    }

    #[test]
    fn wait_failure_passes_reason_through() {
        assert_eq!(
            classify(ExitSignal::WaitFailed("ECHILD".into())),
            RunOutcome::WaitError("ECHILD".into())
        );
    }

    #[cfg(unix)]
    #[test]
    fn from_exit_status_reads_code_or_signal() {
        use std::os::unix::process::ExitStatusExt;

        // Raw wait statuses: exit code lives in the high byte, signal in the low bits.
        assert_eq!(ExitSignal::from(ExitStatus::from_raw(3 << 8)), ExitSignal::Exited(3));
        assert_eq!(ExitSignal::from(ExitStatus::from_raw(9)), ExitSignal::Signaled(Some(9)));
    }
}
