use async_trait::async_trait;
use tokio::{process::Child, task::JoinHandle};
use tracing::warn;

use runvisor_core::{ExitSignal, ProcessHandle, ProcessIdentity};

/// A child started by [`crate::subprocess::OsLauncher`].
#[derive(Debug)]
pub struct OsProcess {
    child: Child,
    identity: ProcessIdentity,
    pumps: Vec<(&'static str, JoinHandle<std::io::Result<u64>>)>,
}

impl OsProcess {
    pub(crate) fn new(
        child: Child,
        identity: ProcessIdentity,
        pumps: Vec<(&'static str, JoinHandle<std::io::Result<u64>>)>,
    ) -> Self {
        Self {
            child,
            identity,
            pumps,
        }
    }
}

#[async_trait]
impl ProcessHandle for OsProcess {
    fn identity(&self) -> ProcessIdentity {
        self.identity
    }

    /// Wait for the exit, then for the output pumps to drain.
    ///
    /// Pump failures are logged but never change the exit: output is not part of
    /// the outcome.
    async fn wait(mut self) -> ExitSignal {
        let signal = match self.child.wait().await {
            Ok(status) => ExitSignal::from(status),
            Err(e) => ExitSignal::WaitFailed(e.to_string()),
        };

        for (stream, pump) in self.pumps {
            match pump.await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!(identity = %self.identity, stream, error = %e, "output forwarding failed"),
                Err(e) => warn!(identity = %self.identity, stream, error = %e, "output pump aborted"),
            }
        }
        signal
    }
}
