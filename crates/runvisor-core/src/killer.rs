use std::sync::Arc;

use async_trait::async_trait;
use runvisor_model::TimeoutPolicy;

use crate::{ProcessIdentity, RunOutcome, WaitReceiver};

/// Two-stage termination of a running process.
///
/// Expected behavior:
/// 1. send the graceful signal to `identity`;
/// 2. wait up to `timeouts.graceful()` for `natural`;
/// 3. send the forced signal and wait up to `timeouts.forced()` for `natural`;
/// 4. still running: return [`crate::KillError::Timeout`].
///
/// Whenever `natural` yields during steps 2 or 3 its outcome is returned unchanged.
/// A closed `natural` (the wait task vanished) is reported as
/// [`RunOutcome::WaitError`].
#[async_trait]
pub trait Killer: Send + Sync {
    async fn kill_and_wait(
        &self,
        identity: ProcessIdentity,
        natural: WaitReceiver,
        timeouts: TimeoutPolicy,
    ) -> RunOutcome;
}

#[async_trait]
impl<K: Killer + ?Sized> Killer for Arc<K> {
    async fn kill_and_wait(
        &self,
        identity: ProcessIdentity,
        natural: WaitReceiver,
        timeouts: TimeoutPolicy,
    ) -> RunOutcome {
        (**self).kill_and_wait(identity, natural, timeouts).await
    }
}
