//! Capability surface over a started OS process.
//!
//! The supervisor only sees these traits; OS primitives stay behind the launcher.
use std::fmt;

use async_trait::async_trait;
use runvisor_model::ProcessSpec;
use tokio::sync::oneshot;

use crate::{ExitSignal, LaunchError, RunOutcome};

/// Sending half of the single-slot handoff carrying the natural exit.
pub type WaitSender = oneshot::Sender<RunOutcome>;

/// Receiving half of the single-slot handoff carrying the natural exit.
///
/// Whoever reads it first consumes the value: the supervisor's race, or the
/// [`crate::Killer`] once cancellation has won.
pub type WaitReceiver = oneshot::Receiver<RunOutcome>;

/// Stable reference to a running process, usable for signaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessIdentity {
    pid: u32,
    group_leader: bool,
}

impl ProcessIdentity {
    /// A plain process; signals reach only this pid.
    pub const fn new(pid: u32) -> Self {
        Self {
            pid,
            group_leader: false,
        }
    }

    /// A process leading its own process group; signals reach the whole group.
    pub const fn group_leader(pid: u32) -> Self {
        Self {
            pid,
            group_leader: true,
        }
    }

    pub const fn pid(&self) -> u32 {
        self.pid
    }

    pub const fn is_group_leader(&self) -> bool {
        self.group_leader
    }
}

impl fmt::Display for ProcessIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group_leader {
            write!(f, "pgid {}", self.pid)
        } else {
            write!(f, "pid {}", self.pid)
        }
    }
}

/// Starts processes.
pub trait Launcher: Send + Sync {
    type Handle: ProcessHandle;

    /// Spawn the process described by `spec`.
    ///
    /// The spec is consumed: its output sinks move into the child.
    fn start(&self, spec: ProcessSpec) -> Result<Self::Handle, LaunchError>;
}

/// A started process, owned until it has been waited on.
///
/// [`ProcessHandle::wait`] takes `self`, so a handle can be waited on at most once
/// and only after a successful [`Launcher::start`].
#[async_trait]
pub trait ProcessHandle: Send + Sized + 'static {
    fn identity(&self) -> ProcessIdentity;

    /// Resolve once the process has terminated.
    async fn wait(self) -> ExitSignal;
}
