//! Graceful-then-forced termination via OS signals.
//!
//! On Unix the graceful stage sends `SIGTERM` and the forced stage `SIGKILL`.
//! Group leaders are signaled as a group (`kill(-pgid, ..)`), so helpers spawned
//! by the job go down with it.
//!
//! On other platforms termination is not available and every kill request
//! reports [`KillError::Unsupported`].
use std::io;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, warn};

use runvisor_core::{KillError, Killer, ProcessIdentity, RunOutcome, WaitReceiver};
use runvisor_model::TimeoutPolicy;

/// Stage of the termination sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillSignal {
    /// May be intercepted by the process to clean up.
    Graceful,
    /// Cannot be intercepted.
    Forced,
}

impl KillSignal {
    pub fn name(&self) -> &'static str {
        match self {
            KillSignal::Graceful => "SIGTERM",
            KillSignal::Forced => "SIGKILL",
        }
    }

    #[cfg(unix)]
    fn as_raw(&self) -> libc::c_int {
        match self {
            KillSignal::Graceful => libc::SIGTERM,
            KillSignal::Forced => libc::SIGKILL,
        }
    }

    /// Deliver the signal to `identity`.
    #[cfg(unix)]
    pub fn send(&self, identity: ProcessIdentity) -> io::Result<()> {
        let pid = libc::pid_t::try_from(identity.pid())
            .ok()
            .filter(|pid| *pid > 0)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("refusing to signal {identity}"),
                )
            })?;
        let target = if identity.is_group_leader() { -pid } else { pid };

        // SAFETY: kill(2) has no memory-safety preconditions.
        let rc = unsafe { libc::kill(target, self.as_raw()) };
        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    #[cfg(not(unix))]
    pub fn send(&self, _identity: ProcessIdentity) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "signals are not supported on this platform",
        ))
    }
}

/// `true` when the error only says the target is already gone.
fn is_gone(err: &io::Error) -> bool {
    #[cfg(unix)]
    {
        err.raw_os_error() == Some(libc::ESRCH)
    }

    #[cfg(not(unix))]
    {
        let _ = err;
        false
    }
}

/// [`Killer`] delivering real OS signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalKiller;

impl SignalKiller {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Killer for SignalKiller {
    async fn kill_and_wait(
        &self,
        identity: ProcessIdentity,
        mut natural: WaitReceiver,
        timeouts: TimeoutPolicy,
    ) -> RunOutcome {
        if cfg!(not(unix)) {
            return RunOutcome::KillError(KillError::Unsupported);
        }

        match KillSignal::Graceful.send(identity) {
            Ok(()) => debug!(%identity, signal = "SIGTERM", "graceful termination requested"),
            Err(e) if is_gone(&e) => debug!(%identity, "process already gone before SIGTERM"),
            Err(e) => warn!(%identity, error = %e, "failed to send SIGTERM"),
        }

        if let Ok(res) = timeout(timeouts.graceful(), &mut natural).await {
            return res.unwrap_or_else(|_| RunOutcome::wait_task_lost());
        }

        debug!(
            %identity,
            graceful_ms = timeouts.graceful_kill_ms,
            "process ignored graceful termination; forcing",
        );
        match KillSignal::Forced.send(identity) {
            Ok(()) => {}
            Err(e) if is_gone(&e) => debug!(%identity, "process already gone before SIGKILL"),
            Err(e) => {
                warn!(%identity, error = %e, "failed to send SIGKILL");
                return RunOutcome::KillError(KillError::Signal {
                    pid: identity.pid(),
                    signal: KillSignal::Forced.name(),
                    reason: e.to_string(),
                });
            }
        }

        match timeout(timeouts.forced(), natural).await {
            Ok(res) => res.unwrap_or_else(|_| RunOutcome::wait_task_lost()),
            Err(_) => {
                warn!(%identity, "process survived forced termination");
                RunOutcome::KillError(KillError::Timeout {
                    pid: identity.pid(),
                    waited_ms: timeouts.graceful_kill_ms.saturating_add(timeouts.force_kill_ms),
                })
            }
        }
    }
}
