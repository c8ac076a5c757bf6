//! Exit-code contract shared between the supervisor and the processes it launches.
//!
//! A launched process that wants to say which failure bucket applies exits with one of
//! the reserved codes below. The same values are exported to it through the
//! `*_EXIT_CODE` variables, so scripts never have to hardcode them.
//! Changing any of these values is a breaking change for every cooperating script.

/// Exit code meaning "the job itself failed" (tests red, build broken, ...).
pub const BUILD_FAILURE_EXIT_CODE: i32 = 1;

/// Exit code meaning "the execution environment failed" (provisioning, network, disk, ...).
pub const SYSTEM_FAILURE_EXIT_CODE: i32 = 2;

/// Variable carrying [`BUILD_FAILURE_EXIT_CODE`] to the child.
pub const BUILD_FAILURE_EXIT_CODE_VARIABLE: &str = "BUILD_FAILURE_EXIT_CODE";

/// Variable carrying [`SYSTEM_FAILURE_EXIT_CODE`] to the child.
pub const SYSTEM_FAILURE_EXIT_CODE_VARIABLE: &str = "SYSTEM_FAILURE_EXIT_CODE";

/// Variable pointing the child at its working directory for scratch files.
pub const WORKDIR_HINT_VARIABLE: &str = "TMPDIR";
