// Recursive, children-first subtree termination

use super::signals::kill;
use super::{KillOutcome, KillStatus};
use crate::error::ControlError;
use crate::process::ProcessHandle;
use std::collections::HashSet;
use std::time::Duration;

/// Accumulator for one kill sweep.
///
/// Outcomes are appended in post-order. A pid is visited at most once per
/// sweep, so a descendant reached again through a transitive child listing
/// or through a second selector is not reported twice.
#[derive(Debug)]
pub struct Sweep {
    outcomes: Vec<KillOutcome>,
    visited: HashSet<i32>,
    spared: HashSet<i32>,
    timeout: Duration,
}

impl Sweep {
    /// Create an empty sweep waiting up to `timeout` after each stop request
    pub fn new(timeout: Duration) -> Self {
        Self {
            outcomes: Vec::new(),
            visited: HashSet::new(),
            spared: HashSet::new(),
            timeout,
        }
    }

    /// Never target `pids`, neither as roots nor as descendants
    #[must_use]
    pub fn sparing(mut self, pids: impl IntoIterator<Item = i32>) -> Self {
        self.spared.extend(pids);
        self
    }

    pub fn outcomes(&self) -> &[KillOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<KillOutcome> {
        self.outcomes
    }

    /// Claim `pid` for this sweep, false if it must be left alone
    fn claim(&mut self, pid: i32) -> bool {
        if self.spared.contains(&pid) {
            log::debug!("Sparing process {} (caller or its ancestor)", pid);
            return false;
        }
        self.visited.insert(pid)
    }
}

/// Recursively kill a process, its descendants first.
///
/// A process that is no longer running produces no outcome. Its identity is
/// read before the descendants are touched, so the record survives the
/// process exiting mid-recursion. With `dry` set nothing is signalled and
/// every outcome is `SKIPPED`.
pub fn rkill<H: ProcessHandle>(
    handle: &H,
    dry: bool,
    sweep: &mut Sweep,
) -> Result<(), ControlError> {
    let pid = handle.pid();

    if !handle.is_running() || !sweep.claim(pid) {
        return Ok(());
    }

    let identity = match handle.identity() {
        Ok(identity) => identity,
        Err(e) if e.is_transient() => {
            log::debug!("Process {} vanished before inspection: {}", pid, e);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let children = match handle.children() {
        Ok(children) => children,
        Err(e) if e.is_transient() => {
            log::debug!("Could not list children of process {}: {}", pid, e);
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    for child in &children {
        rkill(child, dry, sweep)?;
    }

    let status = if dry {
        KillStatus::Skipped
    } else if kill(handle, sweep.timeout)? {
        KillStatus::Killed
    } else {
        KillStatus::Failed
    };

    let outcome = KillOutcome::new(identity, status);
    match status {
        KillStatus::Failed => log::warn!("{}", outcome),
        _ => log::info!("{}", outcome),
    }
    sweep.outcomes.push(outcome);

    Ok(())
}

/// Recursively kill one process tree with a fresh sweep and return its outcomes.
///
/// Nothing is spared, not even the calling process.
pub fn rkill_tree<H: ProcessHandle>(
    handle: &H,
    dry: bool,
    timeout: Duration,
) -> Result<Vec<KillOutcome>, ControlError> {
    let mut sweep = Sweep::new(timeout);
    rkill(handle, dry, &mut sweep)?;
    Ok(sweep.into_outcomes())
}
