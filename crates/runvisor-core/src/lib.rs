pub mod error;
pub mod exit;
pub mod killer;
pub mod outcome;
pub mod process;
pub mod supervisor;

pub use error::{KillError, LaunchError};
pub use exit::{ExitSignal, classify};
pub use killer::Killer;
pub use outcome::{FailureOwner, RunOutcome};
pub use process::{Launcher, ProcessHandle, ProcessIdentity, WaitReceiver, WaitSender};
pub use supervisor::Supervisor;

pub mod prelude {
    pub use crate::error::{KillError, LaunchError};
    pub use crate::killer::Killer;
    pub use crate::outcome::{FailureOwner, RunOutcome};
    pub use crate::process::{Launcher, ProcessHandle, ProcessIdentity};
    pub use crate::supervisor::Supervisor;
}
