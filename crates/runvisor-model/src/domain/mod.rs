mod env;
pub use env::{Env, KeyValue};

mod timeout;
pub use timeout::TimeoutPolicy;

mod constants;
pub use constants::{BUILD_FAILURE_EXIT_CODE, SYSTEM_FAILURE_EXIT_CODE};
pub use constants::{
    BUILD_FAILURE_EXIT_CODE_VARIABLE, SYSTEM_FAILURE_EXIT_CODE_VARIABLE, WORKDIR_HINT_VARIABLE,
};

/// Timeout value in milliseconds.
///
/// Used by [`TimeoutPolicy`] so policies can be loaded from plain config values.
pub type TimeoutMs = u64;
