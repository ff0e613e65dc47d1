// Error types for process control and kill requests

use crate::killer::KillOutcome;
use nix::errno::Errno;
use thiserror::Error;

/// Faults reported by the process control layer
#[derive(Debug, Error)]
pub enum ControlError {
    /// The process exited, was reaped, or its pid now belongs to another process
    #[error("process {0} does not exist")]
    NoSuchProcess(i32),

    /// Not allowed to inspect or signal the process
    #[error("permission denied for process {0}")]
    PermissionDenied(i32),

    /// Signal delivery failed for a reason other than the two above
    #[error("failed to signal process {pid}: {errno}")]
    Signal { pid: i32, errno: Errno },

    /// Reading the process table failed
    #[error("failed to read process table: {0}")]
    Table(String),
}

impl ControlError {
    /// Whether the fault is a race with the process lifecycle or a privilege
    /// issue, both of which the escalation logic absorbs
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::NoSuchProcess(_) | Self::PermissionDenied(_))
    }

    /// Map a `kill(2)` failure for `pid`
    pub const fn from_errno(pid: i32, errno: Errno) -> Self {
        match errno {
            Errno::ESRCH => Self::NoSuchProcess(pid),
            Errno::EPERM => Self::PermissionDenied(pid),
            errno => Self::Signal { pid, errno },
        }
    }

    /// Map a procfs failure while reading `pid`
    pub fn from_proc(pid: i32, err: procfs::ProcError) -> Self {
        match err {
            procfs::ProcError::NotFound(_) => Self::NoSuchProcess(pid),
            procfs::ProcError::PermissionDenied(_) => Self::PermissionDenied(pid),
            other => Self::Table(other.to_string()),
        }
    }
}

/// Errors surfaced to callers of `kill_all`
#[derive(Debug, Error)]
pub enum KillError {
    /// Selector input was rejected before any process was touched
    #[error("invalid selector: {0}")]
    Validation(String),

    /// A pid selector named no live process.
    ///
    /// `outcomes` holds what the name and pattern selectors of the same
    /// request already did.
    #[error("no process with pid {pid}")]
    NotFound { pid: i32, outcomes: Vec<KillOutcome> },

    /// A process control fault that is not a lifecycle race.
    ///
    /// `outcomes` holds what the sweep did before the fault.
    #[error("{source}")]
    Control {
        source: ControlError,
        outcomes: Vec<KillOutcome>,
    },
}

impl KillError {
    /// Outcomes recorded before the error, if any
    pub fn partial_outcomes(&self) -> &[KillOutcome] {
        match self {
            Self::NotFound { outcomes, .. } | Self::Control { outcomes, .. } => outcomes,
            Self::Validation(_) => &[],
        }
    }
}
