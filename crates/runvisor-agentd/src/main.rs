use std::{env::VarError, path::PathBuf, time::Duration};

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use runvisor_core::{FailureOwner, RunOutcome, Supervisor};
use runvisor_exec::{SignalKiller, subprocess::OsLauncher};
use runvisor_model::{ProcessSpec, SYSTEM_FAILURE_EXIT_CODE, TimeoutMs, TimeoutPolicy};
use runvisor_observe::{LoggerConfig, init_logger};

const USAGE: &str = "usage: runvisor-agentd <command> [args...]";

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // 1) logger
    let cfg = LoggerConfig::default().with_env_overrides()?;
    init_logger(&cfg)?;

    // 2) what to run
    let mut argv = std::env::args().skip(1);
    let command = argv.next().context(USAGE)?;
    let cwd: PathBuf = match std::env::var_os("RUNVISOR_WORKDIR") {
        Some(dir) => dir.into(),
        None => std::env::current_dir().context("reading current directory")?,
    };
    let spec = ProcessSpec::new(command).with_args(argv).with_cwd(cwd);

    // 3) kill-sequence bounds
    let defaults = TimeoutPolicy::default();
    let timeouts = TimeoutPolicy::new(
        env_ms("RUNVISOR_GRACEFUL_KILL_MS")?.unwrap_or(defaults.graceful_kill_ms),
        env_ms("RUNVISOR_FORCE_KILL_MS")?.unwrap_or(defaults.force_kill_ms),
    );
    timeouts.validate()?;

    // 4) cancellation: Ctrl-C or an optional deadline
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received; stopping job");
                cancel.cancel();
            }
        }
    });
    if let Some(deadline) = env_ms("RUNVISOR_DEADLINE_MS")? {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(deadline)).await;
            warn!(deadline_ms = deadline, "deadline reached; stopping job");
            cancel.cancel();
        });
    }

    // 5) supervise
    info!(%spec, graceful_ms = timeouts.graceful_kill_ms, force_ms = timeouts.force_kill_ms, "starting job");
    let outcome = Supervisor::new(spec, timeouts, OsLauncher::new(), SignalKiller)
        .run(cancel)
        .await;

    match outcome.owner() {
        FailureOwner::None => info!(%outcome, "job finished"),
        FailureOwner::Job => warn!(%outcome, "job failed"),
        FailureOwner::Unknown => warn!(%outcome, "job failed with an unknown failure"),
        FailureOwner::Infrastructure | FailureOwner::Supervisor => {
            error!(%outcome, "job failed because of a runner problem")
        }
    }
    std::process::exit(exit_status(&outcome));
}

/// Exit status of this binary, following the same reserved-code contract.
fn exit_status(outcome: &RunOutcome) -> i32 {
    match outcome {
        RunOutcome::Terminated { signal: Some(sig) } => 128 + sig,
        RunOutcome::Terminated { signal: None } => SYSTEM_FAILURE_EXIT_CODE,
        other if other.is_supervisor_error() => SYSTEM_FAILURE_EXIT_CODE,
        other => other.exit_code().unwrap_or(SYSTEM_FAILURE_EXIT_CODE),
    }
}

fn env_ms(name: &str) -> anyhow::Result<Option<TimeoutMs>> {
    parse_ms(name, std::env::var(name))
}

fn parse_ms(name: &str, value: Result<String, VarError>) -> anyhow::Result<Option<TimeoutMs>> {
    match value {
        Ok(raw) => raw
            .trim()
            .parse::<TimeoutMs>()
            .map(Some)
            .with_context(|| format!("{name} must be a number of milliseconds, got {raw:?}")),
        Err(VarError::NotPresent) => Ok(None),
        Err(e @ VarError::NotUnicode(_)) => Err(e).with_context(|| format!("reading {name}")),
    }
}
