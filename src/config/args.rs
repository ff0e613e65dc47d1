// Command-line argument parsing

use clap::{ArgAction, Parser};

/// Tree Reaper - kill processes together with all of their descendants
///
/// Matching processes are stopped children-first. Each one gets SIGTERM,
/// then SIGKILL if it is still alive after the timeout.
#[derive(Parser, Debug)]
#[command(name = "tree-reaper")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Kill process trees by exact name, regex or pid", long_about = None)]
pub struct Args {
    /// Exact name of the processes to kill
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    pub name: Option<String>,

    /// Regex searched anywhere in the process name
    #[arg(short = 'p', long = "pattern", value_name = "PATTERN")]
    pub pattern: Option<String>,

    /// Id of a single process to kill
    #[arg(long = "pid", value_name = "PID", allow_negative_numbers = true)]
    pub pid: Option<i32>,

    /// Compare names and patterns case-insensitively
    #[arg(short = 'i', long = "ignore-case")]
    pub ignore_case: bool,

    /// Dry run - don't kill anything, just report what would be killed
    #[arg(short = 'd', long = "dry", visible_alias = "dryrun")]
    pub dry_run: bool,

    /// Seconds to wait for an exit after SIGTERM and after SIGKILL (default: 5)
    #[arg(short = 't', long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Parse arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
