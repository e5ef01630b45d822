//! Sorting, bucketing and summarising audit results

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::collectors::EngagementStats;
use crate::cost::CostModel;
use crate::model::{ActivitySource, SeatCostEstimate, SeatState, Tier};
use crate::scoring::HIGH_SCORE;

/// Availability of one activity source during the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub source: ActivitySource,
    pub available: bool,
    pub pages: usize,
    pub note: Option<String>,
}

/// Everything that lowers confidence in the verdicts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataQuality {
    pub sources: Vec<SourceStatus>,
    pub engagements: EngagementStats,
    /// Login ids with no matching seat
    pub unmapped_logins: usize,
    /// Seats left out of the report for lack of an email address
    pub skipped_without_email: usize,
}

impl DataQuality {
    pub fn is_available(&self, source: ActivitySource) -> bool {
        self.sources
            .iter()
            .any(|s| s.source == source && s.available)
    }

    pub fn unavailable(&self) -> impl Iterator<Item = &SourceStatus> {
        self.sources.iter().filter(|s| !s.available)
    }

    pub fn unattributed(&self) -> u64 {
        self.engagements.unattributed
    }
}

/// Rough accuracy range of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccuracyEstimate {
    pub low: u8,
    pub high: u8,
    /// Lowered estimate when engagements could not be attributed
    pub reduced_to: Option<u8>,
}

impl AccuracyEstimate {
    pub fn new(login_available: bool, unattributed: u64, attributed_total: u64) -> Self {
        let (low, high) = if login_available { (90, 95) } else { (70, 80) };
        let reduced_to = (unattributed > 0).then(|| {
            let ratio = unattributed as f64 / attributed_total.max(1) as f64;
            (80.0 - ratio * 30.0).max(50.0) as u8
        });
        Self {
            low,
            high,
            reduced_to,
        }
    }
}

/// Headline numbers of an audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_scanned: usize,
    pub deactivated: usize,
    /// HIGH tier, not counting deactivated accounts
    pub high_confidence_inactive: usize,
    pub medium_high: usize,
    pub active: usize,
    pub attributed_engagements: u64,
    pub monthly_waste: u64,
    pub annual_waste: u64,
    pub login_data_available: bool,
    pub accuracy: AccuracyEstimate,
}

/// Final, sorted audit output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    pub removal_score: u8,
    pub currency: String,
    /// Sorted by descending score
    pub entries: Vec<SeatCostEstimate>,
    pub summary: Summary,
    pub data_quality: DataQuality,
}

impl AuditReport {
    fn split_at_score(&self, score: u8) -> usize {
        self.entries.partition_point(|e| e.verdict.score >= score)
    }

    /// Score of at least 95, deactivated accounts included
    pub fn high(&self) -> &[SeatCostEstimate] {
        &self.entries[..self.split_at_score(HIGH_SCORE)]
    }

    /// Removable but below the high bucket
    pub fn medium_high(&self) -> &[SeatCostEstimate] {
        let start = self.split_at_score(HIGH_SCORE);
        let end = self.split_at_score(self.removal_score).max(start);
        &self.entries[start..end]
    }

    pub fn active(&self) -> &[SeatCostEstimate] {
        let start = self
            .split_at_score(self.removal_score)
            .max(self.split_at_score(HIGH_SCORE));
        &self.entries[start..]
    }

    pub fn state_of(&self, entry: &SeatCostEstimate) -> SeatState {
        entry.state(self.removal_score)
    }
}

/// Monthly total of a bucket
pub fn bucket_cost(entries: &[SeatCostEstimate]) -> u64 {
    entries
        .iter()
        .fold(0u64, |total, e| total.saturating_add(e.monthly_cost))
}

/// Builds the final report from per-user estimates
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    cost: CostModel,
}

impl ReportAssembler {
    pub fn new(cost: CostModel) -> Self {
        Self { cost }
    }

    /// `attributed_engagements` is the number of engagements credited to
    /// active seats; `attributed_total` counts every attributed engagement.
    pub fn assemble(
        &self,
        mut entries: Vec<SeatCostEstimate>,
        data_quality: DataQuality,
        attributed_engagements: u64,
        attributed_total: u64,
        generated_at: DateTime<Utc>,
    ) -> AuditReport {
        entries.sort_by(|a, b| {
            b.verdict
                .score
                .cmp(&a.verdict.score)
                .then_with(|| a.user.display_name().cmp(&b.user.display_name()))
        });

        let removal_score = self.cost.removal_score;
        let high = entries
            .iter()
            .filter(|e| e.verdict.score >= HIGH_SCORE)
            .count();
        let deactivated = entries
            .iter()
            .filter(|e| e.verdict.tier == Tier::Deactivated)
            .count();
        let medium_high = entries
            .iter()
            .filter(|e| e.verdict.score >= removal_score && e.verdict.score < HIGH_SCORE)
            .count();
        let active = entries
            .iter()
            .filter(|e| e.verdict.score < removal_score.min(HIGH_SCORE))
            .count();
        let monthly_waste = bucket_cost(&entries);

        let login_data_available = data_quality.is_available(ActivitySource::Login);
        let accuracy = AccuracyEstimate::new(
            login_data_available,
            data_quality.unattributed(),
            attributed_total,
        );

        let summary = Summary {
            total_scanned: entries.len(),
            deactivated,
            high_confidence_inactive: high - deactivated,
            medium_high,
            active,
            attributed_engagements,
            monthly_waste,
            annual_waste: monthly_waste.saturating_mul(12),
            login_data_available,
            accuracy,
        };

        AuditReport {
            generated_at,
            removal_score,
            currency: self.cost.currency.clone(),
            entries,
            summary,
            data_quality,
        }
    }
}
