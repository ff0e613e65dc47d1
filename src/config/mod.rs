// Configuration module

mod args;
mod env;

pub use args::Args;
use crate::killer::{KillRequest, DEFAULT_TIMEOUT};
use anyhow::{bail, Result};
use std::time::Duration;

/// Main configuration struct for Tree Reaper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // Selectors
    pub name: Option<String>,    // Exact process name
    pub pattern: Option<String>, // Regex searched in process names
    pub pid: Option<i32>,        // Single process id

    // Matching and behavior flags
    pub ignore_case: bool, // Case-insensitive name and pattern matching
    pub dry_run: bool,     // Don't actually kill processes

    pub timeout: Duration, // Wait after each stop request
    pub verbosity: u8,     // 0 warn, 1 info, 2 debug, 3+ trace
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Result<Self> {
        let mut config = Self {
            name: args.name,
            pattern: args.pattern,
            pid: args.pid,
            ignore_case: args.ignore_case,
            dry_run: args.dry_run,
            verbosity: args.verbose,
            ..Self::default()
        };

        if let Some(secs) = args.timeout {
            config.timeout = Duration::from_secs(secs);
        }

        // Apply environment variable overrides
        config = env::apply_env_overrides(config)?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    /// Selector contents are checked by the killer itself.
    fn validate(&self) -> Result<()> {
        if self.name.is_none() && self.pattern.is_none() && self.pid.is_none() {
            bail!("at least one of --name, --pattern or --pid is required");
        }

        if self.timeout.is_zero() {
            bail!("timeout must be at least 1 second");
        }

        Ok(())
    }

    /// Log filter matching the verbosity
    pub const fn log_level(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// The kill request described by this configuration
    pub fn request(&self) -> KillRequest {
        KillRequest {
            name: self.name.clone(),
            pattern: self.pattern.clone(),
            pid: self.pid,
            ignore_case: self.ignore_case,
            dry: self.dry_run,
            timeout: self.timeout,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: None,
            pattern: None,
            pid: None,
            ignore_case: false,
            dry_run: false,
            timeout: DEFAULT_TIMEOUT, // 5 seconds per stage
            verbosity: 0,
        }
    }
}
