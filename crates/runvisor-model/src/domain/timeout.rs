use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ModelError, TimeoutMs};

const DEFAULT_GRACEFUL_KILL_MS: TimeoutMs = 10 * 60 * 1_000;
const DEFAULT_FORCE_KILL_MS: TimeoutMs = 10 * 1_000;

/// Bounds of the two-stage termination sequence.
///
/// - `graceful_kill_ms`: how long the process may take to exit after the graceful signal.
/// - `force_kill_ms`: how long to wait for the exit after the forced signal.
///
/// The supervisor trusts the policy as given. Callers loading it from user input
/// should run [`TimeoutPolicy::validate`] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutPolicy {
    pub graceful_kill_ms: TimeoutMs,
    pub force_kill_ms: TimeoutMs,
}

impl TimeoutPolicy {
    pub const fn new(graceful_kill_ms: TimeoutMs, force_kill_ms: TimeoutMs) -> Self {
        Self {
            graceful_kill_ms,
            force_kill_ms,
        }
    }

    /// Convenience constructor from [`Duration`]s, truncated to milliseconds.
    ///
    /// Durations beyond `TimeoutMs::MAX` milliseconds saturate.
    pub fn from_durations(graceful: Duration, forced: Duration) -> Self {
        Self::new(millis(graceful), millis(forced))
    }

    pub fn graceful(&self) -> Duration {
        Duration::from_millis(self.graceful_kill_ms)
    }

    pub fn forced(&self) -> Duration {
        Duration::from_millis(self.force_kill_ms)
    }

    /// Upper bound on how long a kill sequence can take.
    pub fn total(&self) -> Duration {
        self.graceful() + self.forced()
    }

    /// Reject zero timeouts.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.graceful_kill_ms == 0 {
            return Err(ModelError::InvalidTimeout(
                "graceful_kill_ms cannot be zero".into(),
            ));
        }
        if self.force_kill_ms == 0 {
            return Err(ModelError::InvalidTimeout(
                "force_kill_ms cannot be zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_GRACEFUL_KILL_MS, DEFAULT_FORCE_KILL_MS)
    }
}

fn millis(d: Duration) -> TimeoutMs {
    TimeoutMs::try_from(d.as_millis()).unwrap_or(TimeoutMs::MAX)
}
