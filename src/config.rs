use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

use crate::model::Severity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for the append-only report log.
    pub log_dir: PathBuf,
    /// Pretty-print report JSON on stdout.
    pub pretty_output: bool,
    /// Exit non-zero when the overall severity reaches this tier. Lets an
    /// agent pipeline gate on the score without parsing the report.
    pub fail_on_severity: Option<Severity>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("./logs"),
            pretty_output: false,
            fail_on_severity: None,
        }
    }
}

pub fn load_config() -> Result<Config> {
    let mut config = Config::default();

    // Override defaults with environment variables
    if let Ok(log_dir) = env::var("RISKSEER_LOG_DIR") {
        config.log_dir = PathBuf::from(log_dir);
    }

    if let Ok(pretty) = env::var("RISKSEER_PRETTY") {
        config.pretty_output = matches!(pretty.as_str(), "1" | "true" | "yes");
    }

    if let Ok(raw) = env::var("RISKSEER_FAIL_ON") {
        match parse_severity(&raw) {
            Some(severity) => config.fail_on_severity = Some(severity),
            None => warn!("Unknown severity '{}' in RISKSEER_FAIL_ON, ignoring", raw),
        }
    }

    Ok(config)
}

fn parse_severity(raw: &str) -> Option<Severity> {
    match raw.to_lowercase().as_str() {
        "low" => Some(Severity::Low),
        "medium" => Some(Severity::Medium),
        "high" => Some(Severity::High),
        "critical" => Some(Severity::Critical),
        _ => None,
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_severity(s).ok_or_else(|| format!("unknown severity: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!(parse_severity("HIGH"), Some(Severity::High));
        assert_eq!(parse_severity("critical"), Some(Severity::Critical));
        assert_eq!(parse_severity("bogus"), None);
    }

    #[test]
    fn defaults_are_quiet() {
        let config = Config::default();
        assert_eq!(config.log_dir, PathBuf::from("./logs"));
        assert!(!config.pretty_output);
        assert!(config.fail_on_severity.is_none());
    }
}
