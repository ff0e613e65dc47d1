// Environment variable configuration support

use super::Config;
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Apply environment variable overrides to configuration
pub fn apply_env_overrides(config: Config) -> Result<Config> {
    apply_overrides(config, |key| env::var(key).ok())
}

fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Result<Config> {
    if let Some(val) = var("TREE_REAPER_TIMEOUT") {
        let secs: u64 = val
            .parse()
            .with_context(|| format!("Invalid TREE_REAPER_TIMEOUT: {val}"))?;
        config.timeout = Duration::from_secs(secs);
    }

    // Behavior flags
    if let Some(val) = var("TREE_REAPER_DRY_RUN") {
        config.dry_run = parse_bool(&val)?;
    }
    if let Some(val) = var("TREE_REAPER_IGNORE_CASE") {
        config.ignore_case = parse_bool(&val)?;
    }
    if let Some(val) = var("TREE_REAPER_DEBUG") {
        if parse_bool(&val)? {
            config.verbosity = config.verbosity.max(2);
        }
    }

    Ok(config)
}

/// Parse boolean value from string
/// Accepts: true/false, 1/0, yes/no, on/off (case-insensitive)
fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("Invalid boolean value: {}", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true").unwrap(), true);
        assert_eq!(parse_bool("TRUE").unwrap(), true);
        assert_eq!(parse_bool("1").unwrap(), true);
        assert_eq!(parse_bool("yes").unwrap(), true);
        assert_eq!(parse_bool("on").unwrap(), true);

        assert_eq!(parse_bool("false").unwrap(), false);
        assert_eq!(parse_bool("FALSE").unwrap(), false);
        assert_eq!(parse_bool("0").unwrap(), false);
        assert_eq!(parse_bool("no").unwrap(), false);
        assert_eq!(parse_bool("off").unwrap(), false);

        assert!(parse_bool("invalid").is_err());
    }

    #[test]
    fn test_overrides_applied() {
        let config = apply_overrides(
            Config::default(),
            lookup(&[
                ("TREE_REAPER_TIMEOUT", "12"),
                ("TREE_REAPER_DRY_RUN", "yes"),
                ("TREE_REAPER_IGNORE_CASE", "on"),
                ("TREE_REAPER_DEBUG", "1"),
            ]),
        )
        .unwrap();

        assert_eq!(config.timeout, Duration::from_secs(12));
        assert!(config.dry_run);
        assert!(config.ignore_case);
        assert_eq!(config.verbosity, 2);
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut base = Config::default();
        base.verbosity = 3;
        let config = apply_overrides(base, lookup(&[("TREE_REAPER_DEBUG", "1")])).unwrap();
        assert_eq!(config.verbosity, 3);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let result = apply_overrides(Config::default(), lookup(&[("TREE_REAPER_TIMEOUT", "soon")]));
        assert!(result.unwrap_err().to_string().contains("TREE_REAPER_TIMEOUT"));
    }
}
