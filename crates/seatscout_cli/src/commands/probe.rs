use chrono::Utc;
use miette::Result;
use seatscout_core::activity::window_start;
use seatscout_core::{AuditConfig, AuditSources};
use seatscout_hubspot::{HubSpotClient, ProbeOutcome, probe};

use crate::output::Output;

/// Check which HubSpot APIs the token can reach
pub async fn run(config: &AuditConfig, token: &str) -> Result<()> {
    let output = Output::new();
    let client = HubSpotClient::new(token, &config.hubspot)?;
    let since = window_start(Utc::now(), config.thresholds.crm_activity_window_days);

    output.section("HubSpot API probe");
    output.kv("Base URL", &config.hubspot.base_url);

    let checks = probe(
        AuditSources::from(&client),
        &config.hubspot.object_types,
        since,
    )
    .await;

    for check in &checks {
        match &check.outcome {
            ProbeOutcome::Available { items, more } => {
                let suffix = if *more { "+" } else { "" };
                output.success(&format!(
                    "{}: available ({}{} records on first page)",
                    check.name, items, suffix
                ));
            }
            ProbeOutcome::Unavailable { status } => {
                output.warning(&format!(
                    "{}: not available (HTTP {}), missing scope or account tier",
                    check.name, status
                ));
            }
            ProbeOutcome::Failed { message } => {
                output.error(&format!("{}: {}", check.name, message));
            }
        }
    }

    let available = checks.iter().filter(|c| c.outcome.is_available()).count();
    println!();
    output.info(
        "Summary:",
        &format!("{} of {} sources reachable", available, checks.len()),
    );
    Ok(())
}
