use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::model::ProtocolRiskReport;

/// One line of the scoring history log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLogEntry {
    pub timestamp: DateTime<Utc>,
    pub protocol: String,
    pub address: String,
    pub overall_score: f64,
    pub overall_severity: String,
    pub finding_count: usize,
}

impl ReportLogEntry {
    pub fn from_report(report: &ProtocolRiskReport) -> Self {
        Self {
            timestamp: report.timestamp,
            protocol: report.protocol.clone(),
            address: report.address.clone(),
            overall_score: report.overall_score,
            overall_severity: report.overall_severity.to_string(),
            finding_count: report
                .categories
                .iter()
                .map(|c| c.findings.len())
                .sum(),
        }
    }
}

/// Append-only JSONL log of scored protocols, one entry per line.
pub struct ReportLogger {
    log_path: PathBuf,
}

impl ReportLogger {
    pub fn new(log_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("creating log directory {}", log_dir.display()))?;

        Ok(Self {
            log_path: log_dir.join("reports.jsonl"),
        })
    }

    pub async fn log_report(&self, report: &ProtocolRiskReport) -> Result<()> {
        let entry = ReportLogEntry::from_report(report);
        let json = serde_json::to_string(&entry)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("opening report log {}", self.log_path.display()))?;

        writeln!(file, "{json}")?;
        debug!(path = %self.log_path.display(), protocol = %entry.protocol, "report logged");

        Ok(())
    }
}
