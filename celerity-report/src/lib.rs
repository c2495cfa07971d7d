#![warn(missing_docs)]
//! Celerity Report - Result Export
//!
//! Turns run records into a serializable [`Report`] and exports it:
//! - JSON (machine-readable, round-trips through serde)
//! - CSV (one row per benchmark, spreadsheet-compatible)
//!
//! Human-readable terminal output is produced by the CLI.

mod csv;
mod json;
mod meta;
#[allow(missing_docs)]
mod report;

pub use csv::generate_csv_report;
pub use json::{generate_json_report, parse_json_report};
pub use meta::{build_report_meta, system_info};
pub use report::{
    BenchmarkMetrics, BenchmarkReportResult, BenchmarkStatus, FailureInfo, Report, ReportMeta,
    ReportSummary, SCHEMA_VERSION, SystemInfo, build_report,
};

use std::fmt;
use thiserror::Error;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable terminal table
    #[default]
    Human,
    /// JSON with full schema
    Json,
    /// CSV for spreadsheets
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Human => "human",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        })
    }
}

/// Export failures
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON serialization failed
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
    /// The format has no file representation
    #[error("{0} output is rendered by the console, not exported")]
    NotExportable(OutputFormat),
}

/// Render `report` in a machine-readable `format`
pub fn export(report: &Report, format: OutputFormat) -> Result<String, ReportError> {
    match format {
        OutputFormat::Json => Ok(generate_json_report(report)?),
        OutputFormat::Csv => Ok(generate_csv_report(report)),
        OutputFormat::Human => Err(ReportError::NotExportable(format)),
    }
}
