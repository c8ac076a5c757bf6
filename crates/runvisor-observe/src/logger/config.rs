use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::{LoggerError, LoggerFormat, LoggerLevel, LoggerTimeZone};

/// Variable overriding [`LoggerConfig::level`].
pub const LOG_ENV: &str = "RUNVISOR_LOG";

/// Variable overriding [`LoggerConfig::format`].
pub const LOG_FORMAT_ENV: &str = "RUNVISOR_LOG_FORMAT";

/// Logger configuration; missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// Filter expression (e.g. `"info"`, `"runvisor_core=debug,info"`).
    pub level: LoggerLevel,
    pub tz: LoggerTimeZone,
    /// Include the target module in each record.
    pub with_targets: bool,
    /// Color text output; only honored when stdout is a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Overlay [`LOG_ENV`] and [`LOG_FORMAT_ENV`] from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, LoggerError> {
        self.with_overrides(
            std::env::var(LOG_ENV).ok().as_deref(),
            std::env::var(LOG_FORMAT_ENV).ok().as_deref(),
        )
    }

    fn with_overrides(
        mut self,
        level: Option<&str>,
        format: Option<&str>,
    ) -> Result<Self, LoggerError> {
        if let Some(level) = level.filter(|s| !s.trim().is_empty()) {
            self.level = level.parse()?;
        }
        if let Some(format) = format.filter(|s| !s.trim().is_empty()) {
            self.format = format.parse()?;
        }
        Ok(self)
    }

    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}
