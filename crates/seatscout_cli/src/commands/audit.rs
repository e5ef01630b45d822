use std::path::{Path, PathBuf};

use chrono::Utc;
use miette::{IntoDiagnostic, Result};
use seatscout_core::{AuditConfig, AuditSources, Auditor};
use seatscout_hubspot::HubSpotClient;
use tracing::info;

use crate::console;
use crate::csv_report::write_csv_file;
use crate::output::Output;

/// Per-run overrides given on the command line
#[derive(Debug, Clone, Default)]
pub struct AuditOverrides {
    pub csv: Option<PathBuf>,
    pub no_csv: bool,
    pub top: Option<usize>,
    pub seat_price: Option<u64>,
}

impl AuditOverrides {
    pub fn apply(&self, config: &mut AuditConfig) {
        if let Some(csv) = &self.csv {
            config.report.csv_path = csv.clone();
        }
        if let Some(top) = self.top {
            config.report.top_n = top;
        }
        if let Some(price) = self.seat_price {
            info!(seat_price = price, "overriding seat price");
            config.cost.seat_price = price;
        }
    }

    /// Where the CSV goes, if anywhere
    pub fn csv_path<'a>(&self, config: &'a AuditConfig) -> Option<&'a Path> {
        (!self.no_csv).then_some(config.report.csv_path.as_path())
    }
}

pub async fn run(
    config: &AuditConfig,
    token: &str,
    csv_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let output = Output::new();
    let client = HubSpotClient::new(token, &config.hubspot)?;
    let auditor = Auditor::new(config.clone())?;

    if !json {
        output.banner("SEATSCOUT - HUBSPOT SEAT AUDIT");
        output.status(&format!(
            "Login inactivity {} days, engagement window {} days, CRM window {} days",
            config.thresholds.login_inactive_days,
            config.thresholds.engagement_window_days,
            config.thresholds.crm_activity_window_days
        ));
        output.status("Fetching users and activity...");
    }

    let report = auditor.run(AuditSources::from(&client), Utc::now()).await?;

    if let Some(path) = csv_path {
        write_csv_file(&report, path)?;
        info!(path = %path.display(), rows = report.entries.len(), "CSV report written");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        return Ok(());
    }

    console::render(&report, &config.cost, config.report.top_n, csv_path);
    if let Some(path) = csv_path {
        output.success(&format!("CSV report saved to {}", path.display()));
    }
    Ok(())
}
