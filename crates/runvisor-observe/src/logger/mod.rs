mod config;
mod error;
mod format;
mod init;
mod level;
mod timer;

pub use config::{LOG_ENV, LOG_FORMAT_ENV, LoggerConfig};
pub use error::{LoggerError, LoggerResult};
pub use format::LoggerFormat;
pub use level::LoggerLevel;
pub use timer::LoggerTimeZone;

/// Install the global tracing subscriber described by `cfg`.
///
/// Call once, early in `main`. With [`LoggerTimeZone::Local`] the offset is read
/// here, so call it before the async runtime spawns worker threads.
///
/// ```rust
/// use runvisor_observe::{LoggerConfig, init_logger};
///
/// init_logger(&LoggerConfig::default()).expect("logger");
/// tracing::info!("ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => init::text(cfg),
        LoggerFormat::Json => init::json(cfg),
        LoggerFormat::Journald => init::journald(cfg),
    }
}
