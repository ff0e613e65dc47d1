// Process handle abstraction over the OS process table

#[cfg(test)]
pub(crate) mod fake;
mod live;

pub use live::{LiveProcess, LiveTable};

use crate::error::ControlError;
use std::time::Duration;

/// Identity fields of a process, read in one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub parent_pid: i32,
    pub pid: i32,
    pub name: String,
}

/// A reference to an OS process that may exit at any time
pub trait ProcessHandle: Sized {
    /// Process id
    fn pid(&self) -> i32;

    /// True while the process still exists and has not exited
    fn is_running(&self) -> bool;

    /// Parent pid, pid and name taken from a single read
    fn identity(&self) -> Result<Identity, ControlError>;

    /// All direct and transitive descendants at the time of the call
    fn children(&self) -> Result<Vec<Self>, ControlError>;

    /// Ask the process to terminate (SIGTERM). Does not wait.
    fn graceful_stop(&self) -> Result<(), ControlError>;

    /// Terminate the process unconditionally (SIGKILL). Does not wait.
    fn forced_stop(&self) -> Result<(), ControlError>;

    /// Block until the process exits or `timeout` elapses.
    /// Returns false on timeout.
    fn await_exit(&self, timeout: Duration) -> Result<bool, ControlError>;
}

/// Source of process handles
pub trait ProcessTable {
    type Handle: ProcessHandle;

    /// Every process currently in the table
    fn processes(&self) -> Result<Vec<Self::Handle>, ControlError>;

    /// Look up a process by id, `None` if there is no such process
    fn get(&self, pid: i32) -> Result<Option<Self::Handle>, ControlError>;

    /// Pid of the calling process, which a sweep never targets
    fn current_pid(&self) -> Option<i32> {
        i32::try_from(std::process::id()).ok()
    }
}
