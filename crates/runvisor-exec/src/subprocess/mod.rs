//! OS-backed process handle.
//!
//! Launches a [`runvisor_model::ProcessSpec`] through `tokio::process::Command` and
//! exposes it through the `runvisor_core` handle traits.
mod launcher;
mod output;
mod process;

pub use launcher::OsLauncher;
pub use process::OsProcess;
