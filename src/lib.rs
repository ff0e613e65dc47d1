// Tree Reaper - recursive, fail-safe process tree termination

pub mod config;
pub mod error;
pub mod killer;
pub mod process;
pub mod report;

// Re-export commonly used types
pub use config::Config;
pub use error::{ControlError, KillError};
pub use killer::{kill_all, KillOutcome, KillRequest, KillStatus};
pub use process::{LiveTable, ProcessHandle, ProcessTable};
