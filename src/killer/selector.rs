// Target selection and kill orchestration

use super::signals::DEFAULT_TIMEOUT;
use super::tree::{rkill, Sweep};
use super::KillOutcome;
use crate::error::{ControlError, KillError};
use crate::process::{ProcessHandle, ProcessTable};
use regex::{Regex, RegexBuilder};
use std::time::Duration;

/// Maximum allowed length for regex patterns to prevent ReDoS attacks
const MAX_REGEX_PATTERN_LENGTH: usize = 256;

/// Maximum compiled regex size in bytes (10MB) to prevent memory exhaustion
const REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Compile a name pattern with safety limits.
///
/// The pattern is searched anywhere in a process name, it is not anchored.
fn compile_pattern(pattern: &str, ignore_case: bool) -> Result<Regex, KillError> {
    if pattern.len() > MAX_REGEX_PATTERN_LENGTH {
        return Err(KillError::Validation(format!(
            "pattern too long (max {} chars): {}...",
            MAX_REGEX_PATTERN_LENGTH,
            pattern.chars().take(50).collect::<String>()
        )));
    }

    RegexBuilder::new(pattern)
        .case_insensitive(ignore_case)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| KillError::Validation(format!("invalid pattern {pattern:?}: {e}")))
}

/// A predicate choosing root processes to kill
#[derive(Debug, Clone)]
pub enum Selector {
    /// Exact process name, `name` already case-folded when `ignore_case`
    ByName { name: String, ignore_case: bool },
    /// Regex searched within the process name
    ByPattern(Regex),
    /// A single process id
    ByPid(i32),
}

impl Selector {
    pub fn by_name(name: &str, ignore_case: bool) -> Result<Self, KillError> {
        if name.is_empty() {
            return Err(KillError::Validation("name must not be empty".to_string()));
        }

        let name = if ignore_case {
            name.to_lowercase()
        } else {
            name.to_string()
        };
        Ok(Self::ByName { name, ignore_case })
    }

    pub fn by_pattern(pattern: &str, ignore_case: bool) -> Result<Self, KillError> {
        if pattern.is_empty() {
            return Err(KillError::Validation(
                "pattern must not be empty".to_string(),
            ));
        }
        compile_pattern(pattern, ignore_case).map(Self::ByPattern)
    }

    pub fn by_pid(pid: i32) -> Result<Self, KillError> {
        if pid <= 0 {
            return Err(KillError::Validation(format!(
                "pid must be a positive integer, got {pid}"
            )));
        }
        Ok(Self::ByPid(pid))
    }

    /// Whether a process called `process_name` is selected.
    /// Always false for pid selectors, which are resolved by lookup.
    pub fn matches(&self, process_name: &str) -> bool {
        match self {
            Self::ByName {
                name,
                ignore_case: true,
            } => process_name.to_lowercase() == *name,
            Self::ByName { name, .. } => process_name == name,
            Self::ByPattern(regex) => regex.is_match(process_name),
            Self::ByPid(_) => false,
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByName { name, .. } => write!(f, "name {name:?}"),
            Self::ByPattern(regex) => write!(f, "pattern /{}/", regex.as_str()),
            Self::ByPid(pid) => write!(f, "pid {pid}"),
        }
    }
}

/// Everything `kill_all` needs to know about a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillRequest {
    pub name: Option<String>,
    pub pattern: Option<String>,
    pub pid: Option<i32>,
    pub ignore_case: bool,
    pub dry: bool,
    pub timeout: Duration,
}

impl Default for KillRequest {
    fn default() -> Self {
        Self {
            name: None,
            pattern: None,
            pid: None,
            ignore_case: false,
            dry: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl KillRequest {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn pid(mut self, pid: i32) -> Self {
        self.pid = Some(pid);
        self
    }

    #[must_use]
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    #[must_use]
    pub fn dry(mut self, dry: bool) -> Self {
        self.dry = dry;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate and build the selectors, in name, pattern, pid order
    pub fn selectors(&self) -> Result<Vec<Selector>, KillError> {
        let mut selectors = Vec::new();

        if let Some(name) = &self.name {
            selectors.push(Selector::by_name(name, self.ignore_case)?);
        }
        if let Some(pattern) = &self.pattern {
            selectors.push(Selector::by_pattern(pattern, self.ignore_case)?);
        }
        if let Some(pid) = self.pid {
            selectors.push(Selector::by_pid(pid)?);
        }

        Ok(selectors)
    }
}

/// Live processes whose name satisfies a name or pattern selector
fn matching_processes<T: ProcessTable>(
    table: &T,
    selector: &Selector,
) -> Result<Vec<T::Handle>, ControlError> {
    let mut targets = Vec::new();

    for process in table.processes()? {
        match process.identity() {
            Ok(identity) if selector.matches(&identity.name) => targets.push(process),
            Ok(_) => {}
            Err(e) if e.is_transient() => {
                log::trace!("Skipping process {}: {}", process.pid(), e);
            }
            Err(e) => return Err(e),
        }
    }

    log::debug!("Selector {} matched {} process(es)", selector, targets.len());
    Ok(targets)
}

/// The calling process followed by its ancestors up to the root.
///
/// Best effort: the walk stops at the first pid that cannot be read.
fn caller_lineage<T: ProcessTable>(table: &T) -> Vec<i32> {
    let mut lineage = Vec::new();
    let mut next = table.current_pid();

    while let Some(pid) = next.filter(|&pid| pid > 0 && !lineage.contains(&pid)) {
        lineage.push(pid);
        next = match table.get(pid) {
            Ok(Some(process)) => process.identity().ok().map(|identity| identity.parent_pid),
            Ok(None) => None,
            Err(e) => {
                log::trace!("Stopped ancestor walk at {}: {}", pid, e);
                None
            }
        };
    }

    lineage
}

/// Stable sort by parent pid, siblings end up next to each other
fn sort_by_parent(outcomes: &mut [KillOutcome]) {
    outcomes.sort_by_key(|outcome| outcome.parent_pid);
}

/// Why a sweep stopped before running every selector
enum Interrupted {
    NotFound(i32),
    Control(ControlError),
}

impl From<ControlError> for Interrupted {
    fn from(err: ControlError) -> Self {
        Self::Control(err)
    }
}

fn run_selectors<T: ProcessTable>(
    table: &T,
    selectors: &[Selector],
    dry: bool,
    sweep: &mut Sweep,
) -> Result<(), Interrupted> {
    for selector in selectors {
        match selector {
            Selector::ByPid(pid) => match table.get(*pid)? {
                Some(target) => rkill(&target, dry, sweep)?,
                None => {
                    log::warn!("No process with pid {}", pid);
                    return Err(Interrupted::NotFound(*pid));
                }
            },
            _ => {
                for target in matching_processes(table, selector)? {
                    rkill(&target, dry, sweep)?;
                }
            }
        }
    }

    Ok(())
}

/// Kill every process tree selected by `request`.
///
/// All selectors are validated before the table is consulted. Name matches,
/// pattern matches and the pid target are swept in that order, each root
/// children-first. The combined outcomes are stably sorted by parent pid.
/// The calling process and its ancestors are never targeted.
///
/// A pid that names no process fails with `KillError::NotFound`, and a
/// non-transient control fault with `KillError::Control`. Both carry the
/// sorted outcomes recorded before the failure.
pub fn kill_all<T: ProcessTable>(
    table: &T,
    request: &KillRequest,
) -> Result<Vec<KillOutcome>, KillError> {
    let selectors = request.selectors()?;
    if selectors.is_empty() {
        return Ok(Vec::new());
    }

    if request.dry {
        log::info!("Dry run: no process will be signalled");
    }

    let mut sweep = Sweep::new(request.timeout).sparing(caller_lineage(table));
    let result = run_selectors(table, &selectors, request.dry, &mut sweep);

    let mut outcomes = sweep.into_outcomes();
    sort_by_parent(&mut outcomes);

    match result {
        Ok(()) => Ok(outcomes),
        Err(Interrupted::NotFound(pid)) => Err(KillError::NotFound { pid, outcomes }),
        Err(Interrupted::Control(source)) => {
            log::error!("Sweep aborted after {} outcome(s): {}", outcomes.len(), source);
            Err(KillError::Control { source, outcomes })
        }
    }
}
