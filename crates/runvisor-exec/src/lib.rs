mod signal;
pub use signal::{KillSignal, SignalKiller};

#[cfg(feature = "subprocess")]
pub mod subprocess;
