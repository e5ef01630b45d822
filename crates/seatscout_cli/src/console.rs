//! Human-readable rendering of an audit report

use std::path::Path;

use seatscout_core::report::{AccuracyEstimate, bucket_cost};
use seatscout_core::{AuditReport, CostModel, SeatCostEstimate};

use crate::output::Output;

/// Detail lines printed under each listed seat
pub fn entry_details(entry: &SeatCostEstimate, cost: &CostModel) -> Vec<String> {
    vec![
        entry.verdict.reason.clone(),
        format!(
            "Confidence: {}% | Monthly cost: {}",
            entry.verdict.score,
            cost.format(entry.monthly_cost)
        ),
    ]
}

pub fn entry_title(entry: &SeatCostEstimate) -> String {
    match &entry.user.email {
        Some(email) => format!("{} ({})", entry.user.display_name(), email),
        None => entry.user.display_name(),
    }
}

/// Tail line for a truncated bucket
pub fn overflow_line(total: usize, shown: usize) -> Option<String> {
    (total > shown).then(|| format!("... and {} more", total - shown))
}

pub fn bucket_title(label: &str, entries: &[SeatCostEstimate], cost: &CostModel) -> String {
    format!(
        "{} ({} users, {}/mo)",
        label,
        entries.len(),
        cost.format(bucket_cost(entries))
    )
}

pub fn accuracy_lines(accuracy: &AccuracyEstimate, unattributed: u64) -> Vec<String> {
    let mut lines = vec![format!("Overall accuracy: {}-{}%", accuracy.low, accuracy.high)];
    if let Some(reduced) = accuracy.reduced_to {
        lines.push(format!(
            "Reduced to ~{}% due to {} unattributed engagements",
            reduced, unattributed
        ));
    }
    lines
}

pub fn next_steps(csv_path: Option<&Path>) -> Vec<String> {
    let mut steps = Vec::new();
    if let Some(path) = csv_path {
        steps.push(format!("Review the CSV report ({})", path.display()));
    }
    steps.extend(
        [
            "Go to Settings → Users & Teams → Seats in HubSpot",
            "Cross-reference flagged users with HubSpot's 'Last Active' column",
            "For deactivated: reactivate → unassign seat → deactivate",
            "For inactive: contact to verify if access is still needed",
        ]
        .map(String::from),
    );
    steps
        .into_iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect()
}

fn render_bucket(
    output: &Output,
    label: &str,
    alarm: bool,
    entries: &[SeatCostEstimate],
    cost: &CostModel,
    top_n: usize,
) {
    if entries.is_empty() {
        return;
    }
    output.bucket(&bucket_title(label, entries, cost), alarm);
    for (i, entry) in entries.iter().take(top_n).enumerate() {
        output.numbered(i + 1, &entry_title(entry), &entry_details(entry, cost));
    }
    if let Some(line) = overflow_line(entries.len(), top_n) {
        output.status(&line);
    }
}

/// Print the whole report
pub fn render(report: &AuditReport, cost: &CostModel, top_n: usize, csv_path: Option<&Path>) {
    let output = Output::new();
    let summary = &report.summary;
    let quality = &report.data_quality;

    output.section("Sources");
    for status in &quality.sources {
        if status.available {
            output.success(&format!("{} ({} pages)", status.source, status.pages));
        } else {
            let why = status.note.as_deref().unwrap_or("not available");
            output.warning(&format!("{}: {}", status.source, why));
        }
    }
    let stats = &quality.engagements;
    output.kv(
        "Engagements",
        &format!(
            "scanned {}, attributed {}, unattributed {}",
            stats.scanned, stats.attributed, stats.unattributed
        ),
    );

    let excluded = stats.sample_excluded + stats.malformed;
    if quality.unattributed() > 0 || excluded > 0 || quality.skipped_without_email > 0 {
        output.section("Data quality");
        if quality.unattributed() > 0 {
            output.list_item(&format!(
                "{} engagements with no attributable owner",
                quality.unattributed()
            ));
        }
        if stats.sample_excluded > 0 {
            output.list_item(&format!(
                "{} sample/demo engagements skipped",
                stats.sample_excluded
            ));
        }
        if stats.malformed > 0 {
            output.list_item(&format!(
                "{} engagements without a timestamp skipped",
                stats.malformed
            ));
        }
        if quality.unmapped_logins > 0 {
            output.list_item(&format!(
                "{} login records with no matching user",
                quality.unmapped_logins
            ));
        }
        if quality.skipped_without_email > 0 {
            output.list_item(&format!(
                "{} users without an email left out",
                quality.skipped_without_email
            ));
        }
    }

    output.banner("RESULTS");
    render_bucket(
        &output,
        "HIGH CONFIDENCE - REMOVE IMMEDIATELY",
        true,
        report.high(),
        cost,
        top_n,
    );
    render_bucket(
        &output,
        "MEDIUM-HIGH CONFIDENCE",
        false,
        report.medium_high(),
        cost,
        top_n,
    );
    let active = report.active();
    if !active.is_empty() {
        output.section(&format!("ACTIVE USERS ({} users)", active.len()));
        output.status("Users with recent engagement or CRM activity");
        output.kv(
            "Total attributed engagements",
            &summary.attributed_engagements.to_string(),
        );
    }

    output.banner("SUMMARY");
    output.kv("Total users scanned", &summary.total_scanned.to_string());
    output.kv("Deactivated", &summary.deactivated.to_string());
    if summary.login_data_available {
        output.kv(
            "High confidence inactive",
            &summary.high_confidence_inactive.to_string(),
        );
    }
    output.kv("Medium-high confidence", &summary.medium_high.to_string());
    output.kv("Active users", &summary.active.to_string());
    println!();
    output.info("Estimated monthly waste:", &cost.format(summary.monthly_waste));
    output.info("Estimated annual waste:", &cost.format(summary.annual_waste));

    output.banner("ACCURACY & NEXT STEPS");
    if summary.login_data_available {
        output.success("High accuracy mode: using login history");
    } else {
        output.warning("Standard mode: login history not available");
    }
    for line in accuracy_lines(&summary.accuracy, quality.unattributed()) {
        output.list_item(&line);
    }

    output.section("Next steps");
    for step in next_steps(csv_path) {
        println!("{}", step);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use seatscout_core::{ConfidenceVerdict, Tier, User};

    fn entry(score: u8, monthly_cost: u64) -> SeatCostEstimate {
        SeatCostEstimate {
            user: User::new("7")
                .with_email("kai@example.com")
                .with_name("Kai", "Lee"),
            verdict: ConfidenceVerdict {
                score,
                tier: Tier::High,
                reason: "No login in 120 days".to_string(),
            },
            monthly_cost,
            annual_cost: monthly_cost * 12,
        }
    }

    #[test]
    fn test_entry_lines() {
        let cost = CostModel::default();
        let e = entry(95, 75);
        assert_eq!(entry_title(&e), "Kai Lee (kai@example.com)");
        assert_eq!(
            entry_details(&e, &cost),
            vec![
                "No login in 120 days".to_string(),
                "Confidence: 95% | Monthly cost: $75".to_string(),
            ]
        );
    }

    #[test]
    fn test_bucket_title_sums_costs() {
        let cost = CostModel::default();
        let entries = vec![entry(95, 75), entry(100, 75)];
        assert_eq!(
            bucket_title("HIGH CONFIDENCE", &entries, &cost),
            "HIGH CONFIDENCE (2 users, $150/mo)"
        );
    }

    #[test]
    fn test_overflow_line() {
        assert_eq!(overflow_line(10, 10), None);
        assert_eq!(overflow_line(3, 10), None);
        assert_eq!(overflow_line(14, 10), Some("... and 4 more".to_string()));
    }

    #[test]
    fn test_accuracy_lines() {
        let plain = AccuracyEstimate::new(true, 0, 10);
        assert_eq!(accuracy_lines(&plain, 0), vec!["Overall accuracy: 90-95%"]);

        let reduced = AccuracyEstimate::new(false, 5, 10);
        assert_eq!(
            accuracy_lines(&reduced, 5),
            vec![
                "Overall accuracy: 70-80%",
                "Reduced to ~65% due to 5 unattributed engagements",
            ]
        );
    }

    #[test]
    fn test_next_steps_numbering() {
        let with_csv = next_steps(Some(Path::new("seatscout_report.csv")));
        assert_eq!(with_csv.len(), 5);
        assert_eq!(with_csv[0], "1. Review the CSV report (seatscout_report.csv)");
        assert!(with_csv[4].starts_with("5. For inactive"));

        let without_csv = next_steps(None);
        assert_eq!(without_csv.len(), 4);
        assert!(without_csv[0].starts_with("1. Go to Settings"));
    }
}
