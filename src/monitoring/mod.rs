pub mod logger;

pub use logger::{ReportLogEntry, ReportLogger};
