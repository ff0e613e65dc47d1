// Live process handles backed by /proc and POSIX signals

use super::{Identity, ProcessHandle, ProcessTable};
use crate::error::ControlError;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use procfs::process::{all_processes, Process, Stat};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// Length at which the kernel truncates `comm`
const COMM_LEN: usize = 15;

/// Interval between liveness checks while waiting for an exit
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Handle to a process in /proc.
///
/// The start time is captured on discovery so that a recycled pid is seen
/// as a different process instead of being signalled by mistake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveProcess {
    pid: i32,
    start_time: u64,
}

impl LiveProcess {
    /// Open a handle for `pid`, `None` if there is no such process
    pub fn open(pid: i32) -> Result<Option<Self>, ControlError> {
        let process = match Process::new(pid) {
            Ok(process) => process,
            Err(procfs::ProcError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(ControlError::from_proc(pid, e)),
        };

        match Self::from_process(&process) {
            Ok(handle) => Ok(Some(handle)),
            Err(ControlError::NoSuchProcess(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn from_process(process: &Process) -> Result<Self, ControlError> {
        let pid = process.pid();
        let stat = process
            .stat()
            .map_err(|e| ControlError::from_proc(pid, e))?;

        Ok(Self {
            pid,
            start_time: stat.starttime,
        })
    }

    /// Read the current stat, failing if the pid was recycled
    fn read(&self) -> Result<(Process, Stat), ControlError> {
        let process = Process::new(self.pid).map_err(|e| ControlError::from_proc(self.pid, e))?;
        let stat = process
            .stat()
            .map_err(|e| ControlError::from_proc(self.pid, e))?;

        if stat.starttime != self.start_time {
            log::trace!(
                "PID {} was reused (start time {} != {})",
                self.pid,
                stat.starttime,
                self.start_time
            );
            return Err(ControlError::NoSuchProcess(self.pid));
        }

        Ok((process, stat))
    }

    fn signal(&self, signal: Signal) -> Result<(), ControlError> {
        // Re-validate right before delivery
        self.read()?;

        log::debug!("Sending {} to process {}", signal, self.pid);
        signal::kill(Pid::from_raw(self.pid), signal)
            .map_err(|errno| ControlError::from_errno(self.pid, errno))
    }
}

impl ProcessHandle for LiveProcess {
    fn pid(&self) -> i32 {
        self.pid
    }

    fn is_running(&self) -> bool {
        // Zombies have exited and only wait to be reaped
        matches!(self.read(), Ok((_, stat)) if stat.state != 'Z' && stat.state != 'X')
    }

    fn identity(&self) -> Result<Identity, ControlError> {
        let (process, stat) = self.read()?;
        let cmdline = process.cmdline().unwrap_or_default();

        Ok(Identity {
            parent_pid: stat.ppid,
            pid: self.pid,
            name: full_name(&stat.comm, &cmdline),
        })
    }

    fn children(&self) -> Result<Vec<Self>, ControlError> {
        match self.read() {
            Ok(_) => {}
            Err(ControlError::NoSuchProcess(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        }

        let mut entries = Vec::new();
        let mut start_times = HashMap::new();
        for process in all_processes().map_err(|e| ControlError::Table(e.to_string()))? {
            // Processes that vanish while iterating are simply not listed
            let Ok(process) = process else { continue };
            let Ok(stat) = process.stat() else { continue };
            entries.push((stat.pid, stat.ppid));
            start_times.insert(stat.pid, stat.starttime);
        }

        Ok(descendants(self.pid, &entries)
            .into_iter()
            .filter_map(|pid| {
                start_times
                    .get(&pid)
                    .map(|&start_time| Self { pid, start_time })
            })
            .collect())
    }

    fn graceful_stop(&self) -> Result<(), ControlError> {
        self.signal(Signal::SIGTERM)
    }

    fn forced_stop(&self) -> Result<(), ControlError> {
        self.signal(Signal::SIGKILL)
    }

    fn await_exit(&self, timeout: Duration) -> Result<bool, ControlError> {
        // A timeout too large for an Instant means no deadline at all
        let deadline = Instant::now().checked_add(timeout);

        loop {
            if !self.is_running() {
                return Ok(true);
            }

            let pause = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(false);
                    }
                    POLL_INTERVAL.min(deadline - now)
                }
                None => POLL_INTERVAL,
            };
            thread::sleep(pause);
        }
    }
}

/// The system process table under /proc
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveTable;

impl ProcessTable for LiveTable {
    type Handle = LiveProcess;

    fn processes(&self) -> Result<Vec<LiveProcess>, ControlError> {
        let mut processes = Vec::new();

        for process in all_processes().map_err(|e| ControlError::Table(e.to_string()))? {
            let Ok(process) = process else { continue };
            match LiveProcess::from_process(&process) {
                Ok(handle) => processes.push(handle),
                Err(e) => log::trace!("Skipping process {}: {}", process.pid(), e),
            }
        }

        Ok(processes)
    }

    fn get(&self, pid: i32) -> Result<Option<LiveProcess>, ControlError> {
        LiveProcess::open(pid)
    }
}

/// Breadth-first list of every pid below `root` in a (pid, ppid) table
fn descendants(root: i32, entries: &[(i32, i32)]) -> Vec<i32> {
    let mut by_parent: HashMap<i32, Vec<i32>> = HashMap::new();
    for &(pid, ppid) in entries {
        by_parent.entry(ppid).or_default().push(pid);
    }

    let mut found = Vec::new();
    let mut seen = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);

    while let Some(parent) = queue.pop_front() {
        for &child in by_parent.get(&parent).map(Vec::as_slice).unwrap_or_default() {
            if seen.insert(child) {
                found.push(child);
                queue.push_back(child);
            }
        }
    }

    found
}

/// Complete a truncated `comm` from argv[0] when it is clearly the same name
fn full_name(comm: &str, cmdline: &[String]) -> String {
    if comm.len() >= COMM_LEN {
        let base = cmdline
            .first()
            .and_then(|arg0| Path::new(arg0).file_name())
            .and_then(|name| name.to_str());

        if let Some(base) = base {
            if base.len() > comm.len() && base.starts_with(comm) {
                return base.to_string();
            }
        }
    }

    comm.to_string()
}
