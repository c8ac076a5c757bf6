use std::{path::Path, process::Stdio};

use tokio::process::Command;
use tracing::{debug, trace};

use runvisor_core::{LaunchError, Launcher, ProcessIdentity};
use runvisor_model::ProcessSpec;

use crate::subprocess::{
    output::{into_stdio, spawn_pump},
    process::OsProcess,
};

/// [`Launcher`] spawning real OS processes via `tokio::process::Command`.
///
/// The child:
/// - inherits the supervisor's environment, overlaid with the reserved variables
///   and the spec's own entries;
/// - gets `/dev/null` as stdin;
/// - leads its own process group on Unix (unless disabled), so the kill sequence
///   reaches everything it spawned.
#[derive(Debug, Clone, Copy)]
pub struct OsLauncher {
    process_group: bool,
}

impl OsLauncher {
    pub fn new() -> Self {
        Self {
            process_group: cfg!(unix),
        }
    }

    /// Keep the child in the supervisor's process group; signals then reach only the child.
    pub fn without_process_group(mut self) -> Self {
        self.process_group = false;
        self
    }
}

impl Default for OsLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher for OsLauncher {
    type Handle = OsProcess;

    fn start(&self, spec: ProcessSpec) -> Result<OsProcess, LaunchError> {
        spec.validate()
            .map_err(|e| LaunchError::InvalidSpec(e.to_string()))?;
        if let Some(cwd) = &spec.cwd {
            check_working_dir(cwd)?;
        }

        trace!(
            command = %spec.command,
            args = ?spec.args,
            cwd = ?spec.cwd,
            env_len = spec.env.len(),
            stdout = spec.stdout.kind(),
            stderr = spec.stderr.kind(),
            "spawning process",
        );

        let mut cmd = Command::new(&spec.command);
        cmd.args(&spec.args)
            .envs(spec.launch_env())
            .stdin(Stdio::null())
            .kill_on_drop(false);
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }
        #[cfg(unix)]
        if self.process_group {
            use std::os::unix::process::CommandExt;
            cmd.as_std_mut().process_group(0);
        }

        let ProcessSpec {
            command,
            stdout,
            stderr,
            ..
        } = spec;
        let (stdout, stdout_writer) = into_stdio(stdout);
        let (stderr, stderr_writer) = into_stdio(stderr);
        cmd.stdout(stdout).stderr(stderr);

        let mut child = cmd.spawn().map_err(|e| LaunchError::from_io(&command, &e))?;
        let pid = child.id().ok_or_else(|| LaunchError::Io {
            command: command.clone(),
            reason: "process was reaped before its pid could be read".into(),
        })?;
        let identity = if self.process_group {
            ProcessIdentity::group_leader(pid)
        } else {
            ProcessIdentity::new(pid)
        };

        let mut pumps = Vec::new();
        if let (Some(writer), Some(pipe)) = (stdout_writer, child.stdout.take()) {
            pumps.push(("stdout", spawn_pump("stdout", pipe, writer)));
        }
        if let (Some(writer), Some(pipe)) = (stderr_writer, child.stderr.take()) {
            pumps.push(("stderr", spawn_pump("stderr", pipe, writer)));
        }

        debug!(%identity, command = %command, "process spawned");
        Ok(OsProcess::new(child, identity, pumps))
    }
}

fn check_working_dir(cwd: &Path) -> Result<(), LaunchError> {
    let invalid = |reason: String| LaunchError::InvalidWorkingDir {
        path: cwd.display().to_string(),
        reason,
    };
    match std::fs::metadata(cwd) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(invalid("not a directory".into())),
        Err(e) => Err(invalid(e.to_string())),
    }
}
