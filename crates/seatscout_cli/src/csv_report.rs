//! CSV export of an audit, one row per reported seat
//!
//! Columns: Name, Email, Status, Confidence, Category, Reason, Monthly Cost,
//! Annual Cost. Confidence is written as a percentage and costs carry the
//! currency symbol, so the file reads correctly when opened in a
//! spreadsheet without further formatting.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use seatscout_core::{AuditError, AuditReport, SeatCostEstimate};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvSeatRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Confidence")]
    pub confidence: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Reason")]
    pub reason: String,
    #[serde(rename = "Monthly Cost")]
    pub monthly_cost: String,
    #[serde(rename = "Annual Cost")]
    pub annual_cost: String,
}

impl CsvSeatRecord {
    pub fn new(entry: &SeatCostEstimate, report: &AuditReport) -> Self {
        Self {
            name: entry.user.display_name(),
            email: entry.user.email.clone().unwrap_or_default(),
            status: report.state_of(entry).to_string(),
            confidence: format!("{}%", entry.verdict.score),
            category: entry.verdict.tier.label().to_string(),
            reason: entry.verdict.reason.clone(),
            monthly_cost: format!("{}{}", report.currency, entry.monthly_cost),
            annual_cost: format!("{}{}", report.currency, entry.annual_cost),
        }
    }
}

/// Write every report entry, in report order
pub fn write_csv<W: Write>(report: &AuditReport, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for entry in &report.entries {
        wtr.serialize(CsvSeatRecord::new(entry, report))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv_file(report: &AuditReport, path: &Path) -> seatscout_core::Result<()> {
    let file = File::create(path)
        .map_err(|e| AuditError::report_write(path.display().to_string(), e))?;
    write_csv(report, BufWriter::new(file))
        .map_err(|e| AuditError::report_write(path.display().to_string(), e))
}
