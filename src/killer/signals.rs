// Staged termination of a single process

use crate::error::ControlError;
use crate::process::ProcessHandle;
use std::time::Duration;

/// How long to wait for an exit after each stop request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Escalation stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillStrategy {
    /// Send SIGTERM (graceful shutdown)
    Graceful,
    /// Send SIGKILL (forceful termination)
    Forceful,
}

impl KillStrategy {
    /// Stages in the order they are tried
    pub const ESCALATION: [Self; 2] = [Self::Graceful, Self::Forceful];

    fn deliver<H: ProcessHandle>(self, handle: &H) -> Result<(), ControlError> {
        match self {
            Self::Graceful => handle.graceful_stop(),
            Self::Forceful => handle.forced_stop(),
        }
    }
}

impl std::fmt::Display for KillStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Graceful => f.write_str("SIGTERM"),
            Self::Forceful => f.write_str("SIGKILL"),
        }
    }
}

/// Send one stop request and wait for the process to go away
fn stage<H: ProcessHandle>(
    handle: &H,
    strategy: KillStrategy,
    timeout: Duration,
) -> Result<bool, ControlError> {
    strategy.deliver(handle)?;
    handle.await_exit(timeout)
}

/// Kill a single process, escalating from SIGTERM to SIGKILL.
///
/// A process that is already gone counts as killed and receives no signal.
/// Lifecycle races and permission faults at any stage move on to the next
/// stage; the final answer comes from a liveness check once both stages are
/// exhausted. Any other collaborator fault is returned.
///
/// # Arguments
/// * `handle` - Process to kill
/// * `timeout` - Wait bound after each stop request
pub fn kill<H: ProcessHandle>(handle: &H, timeout: Duration) -> Result<bool, ControlError> {
    let pid = handle.pid();

    if !handle.is_running() {
        log::debug!("Process {} is already dead", pid);
        return Ok(true);
    }

    for strategy in KillStrategy::ESCALATION {
        match stage(handle, strategy, timeout) {
            Ok(true) => {
                log::info!("Process {} terminated after {}", pid, strategy);
                return Ok(true);
            }
            Ok(false) => log::warn!(
                "Process {} did not exit within {:?} after {}",
                pid,
                timeout,
                strategy
            ),
            Err(e) if e.is_transient() => {
                log::debug!("{} for process {} failed: {}", strategy, pid, e);
            }
            Err(e) => return Err(e),
        }
    }

    let gone = !handle.is_running();
    if !gone {
        log::error!("Process {} survived SIGTERM and SIGKILL", pid);
    }
    Ok(gone)
}
