// Tabular rendering of kill outcomes

use crate::killer::{KillOutcome, KillStatus};
use std::fmt;

const HEADERS: [&str; 4] = ["PPID", "PID", "NAME", "STATUS"];

/// Renders outcomes as an aligned `PPID PID NAME STATUS` table
pub struct OutcomeTable<'a>(pub &'a [KillOutcome]);

impl fmt::Display for OutcomeTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<[String; 4]> = self
            .0
            .iter()
            .map(|o| {
                [
                    o.parent_pid.to_string(),
                    o.pid.to_string(),
                    o.name.clone(),
                    o.status.to_string(),
                ]
            })
            .collect();

        // Padding counts chars, so widths must too
        let mut widths = HEADERS.map(|header| header.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        // Numbers right-aligned, text left-aligned
        let [ppid_w, pid_w, name_w, _] = widths;
        writeln!(
            f,
            "{:>ppid_w$}  {:>pid_w$}  {:<name_w$}  {}",
            HEADERS[0], HEADERS[1], HEADERS[2], HEADERS[3]
        )?;
        for [ppid, pid, name, status] in &rows {
            writeln!(f, "{ppid:>ppid_w$}  {pid:>pid_w$}  {name:<name_w$}  {status}")?;
        }

        Ok(())
    }
}

/// Per-status counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub killed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn of(outcomes: &[KillOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut summary, o| {
            match o.status {
                KillStatus::Killed => summary.killed += 1,
                KillStatus::Failed => summary.failed += 1,
                KillStatus::Skipped => summary.skipped += 1,
            }
            summary
        })
    }

    pub const fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} killed, {} failed, {} skipped",
            self.killed, self.failed, self.skipped
        )
    }
}
