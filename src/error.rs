use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum RiskSeerError {
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Input parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Report log error: {0}")]
    ReportLog(String),
}

impl RiskSeerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn report_log_error(msg: impl Into<String>) -> Self {
        Self::ReportLog(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, RiskSeerError>;
