// In-memory process table that records every call made against it

use super::{Identity, ProcessHandle, ProcessTable};
use crate::error::ControlError;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::rc::Rc;
use std::time::Duration;

/// How a fake process reacts to a stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Exits before the next wait
    Exit,
    /// Keeps running
    Ignore,
    /// Signal delivery fails with a lifecycle race
    Race,
    /// Signal delivery fails with a non-transient fault
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Processes,
    Get(i32),
    Children(i32),
    Graceful(i32),
    Forced(i32),
    Await(i32),
}

#[derive(Debug)]
struct Entry {
    parent_pid: i32,
    name: String,
    alive: bool,
    on_graceful: Reaction,
    on_forced: Reaction,
}

#[derive(Debug, Default)]
struct State {
    entries: BTreeMap<i32, Entry>,
    calls: Vec<Call>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeTable {
    state: Rc<RefCell<State>>,
    current_pid: Option<i32>,
}

impl FakeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a live process that exits on the first graceful stop
    pub fn spawn(&self, pid: i32, parent_pid: i32, name: &str) -> &Self {
        self.spawn_with(pid, parent_pid, name, Reaction::Exit, Reaction::Exit)
    }

    pub fn spawn_with(
        &self,
        pid: i32,
        parent_pid: i32,
        name: &str,
        on_graceful: Reaction,
        on_forced: Reaction,
    ) -> &Self {
        self.state.borrow_mut().entries.insert(
            pid,
            Entry {
                parent_pid,
                name: name.to_string(),
                alive: true,
                on_graceful,
                on_forced,
            },
        );
        self
    }

    /// Mark a process as exited without touching it through a handle
    pub fn exit(&self, pid: i32) {
        if let Some(entry) = self.state.borrow_mut().entries.get_mut(&pid) {
            entry.alive = false;
        }
    }

    pub fn with_current_pid(mut self, pid: i32) -> Self {
        self.current_pid = Some(pid);
        self
    }

    pub fn is_alive(&self, pid: i32) -> bool {
        self.state
            .borrow()
            .entries
            .get(&pid)
            .is_some_and(|entry| entry.alive)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.state.borrow().calls.iter().filter(|&&c| c == call).count()
    }

    /// Handle for `pid` without recording a lookup
    pub fn handle(&self, pid: i32) -> FakeProcess {
        FakeProcess {
            pid,
            state: Rc::clone(&self.state),
        }
    }
}

impl ProcessTable for FakeTable {
    type Handle = FakeProcess;

    fn processes(&self) -> Result<Vec<FakeProcess>, ControlError> {
        let pids: Vec<i32> = {
            let mut state = self.state.borrow_mut();
            state.calls.push(Call::Processes);
            state
                .entries
                .iter()
                .filter(|(_, entry)| entry.alive)
                .map(|(&pid, _)| pid)
                .collect()
        };
        Ok(pids.into_iter().map(|pid| self.handle(pid)).collect())
    }

    fn get(&self, pid: i32) -> Result<Option<FakeProcess>, ControlError> {
        let alive = {
            let mut state = self.state.borrow_mut();
            state.calls.push(Call::Get(pid));
            state.entries.get(&pid).is_some_and(|entry| entry.alive)
        };
        Ok(alive.then(|| self.handle(pid)))
    }

    fn current_pid(&self) -> Option<i32> {
        self.current_pid
    }
}

#[derive(Debug, Clone)]
pub struct FakeProcess {
    pid: i32,
    state: Rc<RefCell<State>>,
}

impl FakeProcess {
    fn stop(&self, call: Call, pick: fn(&Entry) -> Reaction) -> Result<(), ControlError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);

        let Some(entry) = state.entries.get_mut(&self.pid).filter(|e| e.alive) else {
            return Err(ControlError::NoSuchProcess(self.pid));
        };

        match pick(entry) {
            Reaction::Exit => {
                entry.alive = false;
                Ok(())
            }
            Reaction::Ignore => Ok(()),
            Reaction::Race => Err(ControlError::PermissionDenied(self.pid)),
            Reaction::Break => Err(ControlError::Table("injected fault".to_string())),
        }
    }
}

impl ProcessHandle for FakeProcess {
    fn pid(&self) -> i32 {
        self.pid
    }

    fn is_running(&self) -> bool {
        self.state
            .borrow()
            .entries
            .get(&self.pid)
            .is_some_and(|entry| entry.alive)
    }

    fn identity(&self) -> Result<Identity, ControlError> {
        let state = self.state.borrow();
        let entry = state
            .entries
            .get(&self.pid)
            .filter(|entry| entry.alive)
            .ok_or(ControlError::NoSuchProcess(self.pid))?;

        Ok(Identity {
            parent_pid: entry.parent_pid,
            pid: self.pid,
            name: entry.name.clone(),
        })
    }

    fn children(&self) -> Result<Vec<Self>, ControlError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Children(self.pid));

        let mut found = Vec::new();
        let mut seen = HashSet::from([self.pid]);
        let mut queue = VecDeque::from([self.pid]);
        while let Some(parent) = queue.pop_front() {
            for (&pid, entry) in &state.entries {
                if entry.alive && entry.parent_pid == parent && seen.insert(pid) {
                    found.push(pid);
                    queue.push_back(pid);
                }
            }
        }

        Ok(found
            .into_iter()
            .map(|pid| Self {
                pid,
                state: Rc::clone(&self.state),
            })
            .collect())
    }

    fn graceful_stop(&self) -> Result<(), ControlError> {
        self.stop(Call::Graceful(self.pid), |entry| entry.on_graceful)
    }

    fn forced_stop(&self) -> Result<(), ControlError> {
        self.stop(Call::Forced(self.pid), |entry| entry.on_forced)
    }

    fn await_exit(&self, _timeout: Duration) -> Result<bool, ControlError> {
        self.state.borrow_mut().calls.push(Call::Await(self.pid));
        Ok(!self.is_running())
    }
}
