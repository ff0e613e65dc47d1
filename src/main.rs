// Tree Reaper - Main entry point

use std::process;
use tree_reaper::config::{Args, Config};
use tree_reaper::process::LiveTable;
use tree_reaper::report::{OutcomeTable, Summary};
use tree_reaper::{kill_all, KillError, KillOutcome};

/// Setup logging at the given default level, RUST_LOG still wins
fn setup_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Print the outcome table and summary, returning whether anything failed
fn print_report(outcomes: &[KillOutcome]) -> bool {
    if outcomes.is_empty() {
        println!("No matching processes");
        return false;
    }

    let summary = Summary::of(outcomes);
    print!("{}", OutcomeTable(outcomes));
    println!("{summary}");
    summary.has_failures()
}

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Create configuration from arguments
    let config = match Config::from_args(args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            eprintln!("Use --help for usage information");
            process::exit(1);
        }
    };

    setup_logging(config.log_level());

    match kill_all(&LiveTable, &config.request()) {
        Ok(outcomes) => {
            if print_report(&outcomes) {
                process::exit(1);
            }
        }
        Err(e) => {
            if !e.partial_outcomes().is_empty() {
                print_report(e.partial_outcomes());
            }
            match e {
                KillError::NotFound { .. } => eprintln!("Error: {e}"),
                _ => eprintln!("Fatal error: {e}"),
            }
            process::exit(1);
        }
    }
}
