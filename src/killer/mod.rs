// Process tree killer module

mod selector;
pub mod signals;
mod tree;

pub use selector::{kill_all, KillRequest, Selector};
pub use signals::{kill, KillStrategy, DEFAULT_TIMEOUT};
pub use tree::{rkill, rkill_tree, Sweep};

use crate::process::Identity;

/// What happened to one process during a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KillStatus {
    /// Dry run, no termination attempted
    Skipped,
    /// The process is gone
    Killed,
    /// The process survived every stop attempt
    Failed,
}

impl KillStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skipped => "SKIPPED",
            Self::Killed => "KILLED",
            Self::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for KillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome record for a process touched by a sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillOutcome {
    pub parent_pid: i32,
    pub pid: i32,
    pub name: String,
    pub status: KillStatus,
}

impl KillOutcome {
    pub fn new(identity: Identity, status: KillStatus) -> Self {
        Self {
            parent_pid: identity.parent_pid,
            pid: identity.pid,
            name: identity.name,
            status,
        }
    }
}

impl std::fmt::Display for KillOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PID {} ({}), parent {}: {}",
            self.pid, self.name, self.parent_pid, self.status
        )
    }
}
