use std::{collections::BTreeMap, fmt, path::PathBuf};

use crate::{
    BUILD_FAILURE_EXIT_CODE, BUILD_FAILURE_EXIT_CODE_VARIABLE, Env, ModelError, OutputSink,
    SYSTEM_FAILURE_EXIT_CODE, SYSTEM_FAILURE_EXIT_CODE_VARIABLE, WORKDIR_HINT_VARIABLE,
};

/// Everything needed to launch one supervised process.
///
/// Built once by the caller and consumed by the launcher.
#[derive(Debug, Default)]
pub struct ProcessSpec {
    /// Executable to run (e.g. `"sh"`, `"/usr/bin/python"`).
    pub command: String,
    /// Arguments passed to the executable.
    pub args: Vec<String>,
    /// Working directory. `None` inherits the supervisor's one.
    pub cwd: Option<PathBuf>,
    /// Caller-supplied environment, applied last (see [`ProcessSpec::resolved_env`]).
    pub env: Env,
    pub stdout: OutputSink,
    pub stderr: OutputSink,
}

impl ProcessSpec {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    pub fn with_stdout(mut self, sink: OutputSink) -> Self {
        self.stdout = sink;
        self
    }

    pub fn with_stderr(mut self, sink: OutputSink) -> Self {
        self.stderr = sink;
        self
    }

    /// Rules:
    /// - `command` is not empty or whitespace-only.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.command.trim().is_empty() {
            return Err(ModelError::InvalidSpec("command is empty".into()));
        }
        Ok(())
    }

    /// Variables every launched process receives.
    pub fn reserved_env(&self) -> Env {
        let mut env = Env::new();
        if let Some(cwd) = &self.cwd {
            env.push(WORKDIR_HINT_VARIABLE, cwd.to_string_lossy());
        }
        env.push(
            BUILD_FAILURE_EXIT_CODE_VARIABLE,
            BUILD_FAILURE_EXIT_CODE.to_string(),
        );
        env.push(
            SYSTEM_FAILURE_EXIT_CODE_VARIABLE,
            SYSTEM_FAILURE_EXIT_CODE.to_string(),
        );
        env
    }

    /// Variables set on top of the inherited environment: reserved first, caller last.
    pub fn launch_env(&self) -> BTreeMap<String, String> {
        self.reserved_env().merged(&self.env).resolved()
    }

    /// Final environment of the child.
    ///
    /// Layers, later wins: `ambient`, then [`ProcessSpec::reserved_env`], then `self.env`.
    pub fn resolved_env<I, K, V>(&self, ambient: I) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut env: BTreeMap<String, String> = ambient
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        env.extend(self.launch_env());
        env
    }
}

impl fmt::Display for ProcessSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProcessSpec(cmd='{}', args={}, env={}, cwd={:?})",
            self.command,
            self.args.len(),
            self.env.len(),
            self.cwd,
        )
    }
}
