mod domain;
pub use domain::{BUILD_FAILURE_EXIT_CODE, SYSTEM_FAILURE_EXIT_CODE};
pub use domain::{BUILD_FAILURE_EXIT_CODE_VARIABLE, SYSTEM_FAILURE_EXIT_CODE_VARIABLE, WORKDIR_HINT_VARIABLE};
pub use domain::{Env, KeyValue, TimeoutMs, TimeoutPolicy};

mod error;
pub use error::ModelError;

mod spec;
pub use spec::{OutputSink, ProcessSpec};
