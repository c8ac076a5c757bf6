//! Single-process supervisor.
//! - Starts the process through the injected [`Launcher`].
//! - Moves the handle into a background task that waits for the exit and
//!   publishes the classified result once.
//! - Races that result against the caller's cancellation; on cancellation the
//!   pending result is handed to the injected [`Killer`].
use runvisor_model::{ProcessSpec, TimeoutPolicy};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

use crate::{Killer, Launcher, ProcessHandle, RunOutcome, WaitReceiver, WaitSender, classify};

/// Supervises exactly one launch of one process.
///
/// [`Supervisor::run`] consumes the supervisor, so each instance runs at most once.
pub struct Supervisor<L, K> {
    spec: ProcessSpec,
    timeouts: TimeoutPolicy,
    launcher: L,
    killer: K,
}

impl<L, K> Supervisor<L, K>
where
    L: Launcher,
    K: Killer,
{
    /// `spec`: what to run
    /// `timeouts`: bounds for the kill sequence, trusted as given
    /// `launcher`: starts the process
    /// `killer`: terminates it on cancellation
    pub fn new(spec: ProcessSpec, timeouts: TimeoutPolicy, launcher: L, killer: K) -> Self {
        Self {
            spec,
            timeouts,
            launcher,
            killer,
        }
    }

    pub fn spec(&self) -> &ProcessSpec {
        &self.spec
    }

    pub fn timeouts(&self) -> TimeoutPolicy {
        self.timeouts
    }

    /// Run the process to completion or until `cancel` fires.
    ///
    /// Returns exactly one [`RunOutcome`]:
    /// - `LaunchError` when the process could not be started (no wait, no kill);
    /// - the classified exit when the process finished before cancellation;
    /// - whatever the killer reports once cancellation has been observed.
    #[instrument(level = "debug", skip_all, fields(command = %self.spec.command))]
    pub async fn run(self, cancel: CancellationToken) -> RunOutcome {
        let Self {
            spec,
            timeouts,
            launcher,
            killer,
        } = self;

        let handle = match launcher.start(spec) {
            Ok(handle) => handle,
            Err(e) => {
                debug!(error = %e, "process failed to start");
                return RunOutcome::LaunchError(e);
            }
        };
        let identity = handle.identity();
        debug!(%identity, "process started");

        let mut natural = spawn_wait(handle);
        // An exit that is already published wins a tie with cancellation.
        let outcome = tokio::select! {
            biased;
            res = &mut natural => res.unwrap_or_else(|_| RunOutcome::wait_task_lost()),
            _ = cancel.cancelled() => {
                debug!(
                    %identity,
                    graceful_ms = timeouts.graceful_kill_ms,
                    force_ms = timeouts.force_kill_ms,
                    "cancellation requested; terminating process",
                );
                killer.kill_and_wait(identity, natural, timeouts).await
            }
        };

        debug!(%identity, outcome = outcome.as_label(), "process supervision finished");
        outcome
    }
}

/// Move `handle` into its own task and return the handoff its exit arrives on.
///
/// The task owns the handle, so the process is reaped even when nobody is
/// listening anymore.
fn spawn_wait<H: ProcessHandle>(handle: H) -> WaitReceiver {
    let (tx, rx): (WaitSender, WaitReceiver) = oneshot::channel();
    tokio::spawn(async move {
        let identity = handle.identity();
        let outcome = classify(handle.wait().await);
        trace!(%identity, outcome = outcome.as_label(), "process exited");
        if tx.send(outcome).is_err() {
            trace!(%identity, "exit observed after supervision ended");
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use runvisor_model::{ProcessSpec, TimeoutPolicy};
    use tokio::sync::oneshot;
    use tokio_util::sync::CancellationToken;

    use super::Supervisor;
    use crate::{
        ExitSignal, KillError, Killer, LaunchError, Launcher, ProcessHandle, ProcessIdentity,
        RunOutcome, WaitReceiver,
    };

    /// Handle whose exit is driven by the test through a oneshot.
    struct FakeHandle {
        pid: u32,
        exit: oneshot::Receiver<ExitSignal>,
        panic_on_wait: bool,
        /// Cancelled in the same poll that reports the exit.
        cancel_on_exit: Option<CancellationToken>,
    }

    #[async_trait]
    impl ProcessHandle for FakeHandle {
        fn identity(&self) -> ProcessIdentity {
            ProcessIdentity::new(self.pid)
        }

        async fn wait(self) -> ExitSignal {
            if self.panic_on_wait {
                panic!("wait blew up");
            }
            let signal = self
                .exit
                .await
                .unwrap_or_else(|_| ExitSignal::WaitFailed("exit trigger dropped".into()));
            if let Some(cancel) = self.cancel_on_exit {
                cancel.cancel();
            }
            signal
        }
    }

    struct FakeLauncher {
        handle: Mutex<Option<Result<FakeHandle, LaunchError>>>,
        starts: Arc<AtomicUsize>,
    }

    impl FakeLauncher {
        fn ok(handle: FakeHandle) -> Self {
            Self {
                handle: Mutex::new(Some(Ok(handle))),
                starts: Arc::default(),
            }
        }

        fn failing(err: LaunchError) -> Self {
            Self {
                handle: Mutex::new(Some(Err(err))),
                starts: Arc::default(),
            }
        }
    }

    impl Launcher for FakeLauncher {
        type Handle = FakeHandle;

        fn start(&self, _spec: ProcessSpec) -> Result<FakeHandle, LaunchError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            self.handle
                .lock()
                .unwrap()
                .take()
                .expect("launcher started twice")
        }
    }

    /// Killer that optionally makes the process exit when "signaled",
    /// then waits for the natural exit bounded by the policy.
    #[derive(Default)]
    struct FakeKiller {
        calls: AtomicUsize,
        on_signal: Mutex<Option<(oneshot::Sender<ExitSignal>, ExitSignal)>>,
    }

    impl FakeKiller {
        fn exiting_with(trigger: oneshot::Sender<ExitSignal>, signal: ExitSignal) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                on_signal: Mutex::new(Some((trigger, signal))),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Killer for FakeKiller {
        async fn kill_and_wait(
            &self,
            identity: ProcessIdentity,
            natural: WaitReceiver,
            timeouts: TimeoutPolicy,
        ) -> RunOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reaction = self.on_signal.lock().unwrap().take();
            if let Some((trigger, signal)) = reaction {
                let _ = trigger.send(signal);
            }
            match tokio::time::timeout(timeouts.total(), natural).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => RunOutcome::wait_task_lost(),
                Err(_) => RunOutcome::KillError(KillError::Timeout {
                    pid: identity.pid(),
                    waited_ms: timeouts.total().as_millis() as u64,
                }),
            }
        }
    }

    fn handle(pid: u32) -> (FakeHandle, oneshot::Sender<ExitSignal>) {
        let (tx, rx) = oneshot::channel();
        (
            FakeHandle {
                pid,
                exit: rx,
                panic_on_wait: false,
                cancel_on_exit: None,
            },
            tx,
        )
    }

    fn policy() -> TimeoutPolicy {
        TimeoutPolicy::from_durations(Duration::from_secs(1), Duration::from_secs(1))
    }

    fn supervisor<K: Killer>(launcher: FakeLauncher, killer: K) -> Supervisor<FakeLauncher, K> {
        Supervisor::new(ProcessSpec::new("job"), policy(), launcher, killer)
    }

    #[tokio::test]
    async fn natural_exit_is_classified_and_killer_is_not_used() {
        for (code, expected) in [
            (0, RunOutcome::Success),
            (1, RunOutcome::JobFailure { exit_code: 1 }),
            (2, RunOutcome::InfrastructureFailure { exit_code: 2 }),
            (42, RunOutcome::UnclassifiedFailure { exit_code: 42 }),
        ] {
            let (h, exit) = handle(10);
            exit.send(ExitSignal::Exited(code)).unwrap();
            let killer = Arc::new(FakeKiller::default());

            let outcome = supervisor(FakeLauncher::ok(h), Arc::clone(&killer))
                .run(CancellationToken::new())
                .await;

            assert_eq!(outcome, expected, "exit code {code}");
            assert_eq!(killer.calls(), 0);
        }
    }

    #[tokio::test]
    async fn launch_error_short_circuits_even_when_cancelled() {
        let err = LaunchError::NotFound {
            command: "job".into(),
        };
        let launcher = FakeLauncher::failing(err.clone());
        let starts = Arc::clone(&launcher.starts);
        let killer = Arc::new(FakeKiller::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = supervisor(launcher, Arc::clone(&killer)).run(cancel).await;

        assert_eq!(outcome, RunOutcome::LaunchError(err));
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert_eq!(killer.calls(), 0);
    }

    #[tokio::test]
    async fn cancellation_hands_natural_exit_to_killer() {
        let (h, exit) = handle(11);
        let killer = Arc::new(FakeKiller::exiting_with(exit, ExitSignal::Exited(0)));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = supervisor(FakeLauncher::ok(h), Arc::clone(&killer))
            .run(cancel)
            .await;

        assert_eq!(outcome, RunOutcome::Success);
        assert_eq!(killer.calls(), 1);
    }

    #[tokio::test]
    async fn late_exit_after_cancellation_keeps_its_classification() {
        let (h, exit) = handle(12);
        let killer = Arc::new(FakeKiller::exiting_with(exit, ExitSignal::Exited(2)));
        let cancel = CancellationToken::new();

        let run = tokio::spawn(
            supervisor(FakeLauncher::ok(h), Arc::clone(&killer)).run(cancel.clone()),
        );
        tokio::task::yield_now().await;
        cancel.cancel();

        let outcome = run.await.unwrap();
        assert_eq!(outcome, RunOutcome::InfrastructureFailure { exit_code: 2 });
        assert_eq!(killer.calls(), 1);
    }

    #[tokio::test]
    async fn killed_process_outcome_is_returned_unmodified() {
        let (h, exit) = handle(13);
        let killer = FakeKiller::exiting_with(exit, ExitSignal::Signaled(Some(9)));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = supervisor(FakeLauncher::ok(h), killer).run(cancel).await;

        assert_eq!(outcome, RunOutcome::Terminated { signal: Some(9) });
    }

    #[tokio::test(start_paused = true)]
    async fn surviving_process_yields_kill_error() {
        let (h, _exit) = handle(14);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = supervisor(FakeLauncher::ok(h), FakeKiller::default())
            .run(cancel)
            .await;

        assert_eq!(
            outcome,
            RunOutcome::KillError(KillError::Timeout {
                pid: 14,
                waited_ms: 2_000
            })
        );
    }

    #[tokio::test]
    async fn vanished_wait_task_is_reported_not_awaited_forever() {
        let (mut h, _exit) = handle(15);
        h.panic_on_wait = true;

        let outcome = supervisor(FakeLauncher::ok(h), FakeKiller::default())
            .run(CancellationToken::new())
            .await;

        assert_eq!(outcome, RunOutcome::wait_task_lost());
    }

    #[tokio::test]
    async fn simultaneous_exit_and_cancel_yield_exactly_the_exit() {
        for _ in 0..32 {
            let (h, exit) = handle(16);
            exit.send(ExitSignal::Exited(1)).unwrap();
            let cancel = CancellationToken::new();
            cancel.cancel();

            let outcome = supervisor(FakeLauncher::ok(h), FakeKiller::default())
                .run(cancel)
                .await;

            assert_eq!(outcome, RunOutcome::JobFailure { exit_code: 1 });
        }
    }

    #[tokio::test]
    async fn published_exit_wins_a_tie_with_cancellation() {
        let (mut h, exit) = handle(17);
        let cancel = CancellationToken::new();
        h.cancel_on_exit = Some(cancel.clone());
        exit.send(ExitSignal::Exited(2)).unwrap();
        let killer = Arc::new(FakeKiller::default());

        let outcome = supervisor(FakeLauncher::ok(h), Arc::clone(&killer))
            .run(cancel)
            .await;

        assert_eq!(outcome, RunOutcome::InfrastructureFailure { exit_code: 2 });
        assert_eq!(killer.calls(), 0, "a reaped process must not be signaled");
    }
}
