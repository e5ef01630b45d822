//! The audit run: collect, merge, score, cost, report
//!
//! Collectors run one after another. Scoring and costing happen once over
//! the merged view and perform no I/O.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::activity::ActivityView;
use crate::collectors::{
    Collected, collect_engagements, collect_logins, collect_record_modifications, collect_seats,
};
use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::identity::IdentityMap;
use crate::model::{ActivitySource, SeatCostEstimate, User};
use crate::report::{AuditReport, DataQuality, ReportAssembler, SourceStatus};
use crate::scoring::ConfidenceScorer;
use crate::source::{EngagementSource, LoginSource, RecordSource, SeatSource};

/// The four collaborators an audit reads from
#[derive(Clone, Copy)]
pub struct AuditSources<'a> {
    pub seats: &'a dyn SeatSource,
    pub logins: &'a dyn LoginSource,
    pub engagements: &'a dyn EngagementSource,
    pub records: &'a dyn RecordSource,
}

impl<'a, S> From<&'a S> for AuditSources<'a>
where
    S: SeatSource + LoginSource + EngagementSource + RecordSource,
{
    fn from(source: &'a S) -> Self {
        Self {
            seats: source,
            logins: source,
            engagements: source,
            records: source,
        }
    }
}

/// Runs seat audits with a fixed configuration
#[derive(Debug, Clone)]
pub struct Auditor {
    config: AuditConfig,
    scorer: ConfidenceScorer,
}

impl Auditor {
    pub fn new(config: AuditConfig) -> Result<Self> {
        config.validate()?;
        let scorer = ConfidenceScorer::new(config.thresholds);
        Ok(Self { config, scorer })
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Run a full audit as of `now`.
    ///
    /// Only a failed seat listing is an error; every other source degrades
    /// and is reported in the data-quality section.
    pub async fn run(&self, sources: AuditSources<'_>, now: DateTime<Utc>) -> Result<AuditReport> {
        let thresholds = self.config.thresholds;

        let users = collect_seats(sources.seats)
            .await
            .map_err(|cause| AuditError::SeatListingFailed { cause })?;
        let identities = IdentityMap::from_users(&users);
        debug!(mapped = identities.len(), "identity map built");

        let logins = collect_logins(sources.logins).await;
        let engagements = collect_engagements(
            sources.engagements,
            &identities,
            thresholds.engagement_window_days,
            now,
        )
        .await;
        let records = collect_record_modifications(
            sources.records,
            &self.config.hubspot.object_types,
            thresholds.crm_activity_window_days,
            now,
        )
        .await;

        let mut data_quality = DataQuality {
            sources: vec![
                status(ActivitySource::Login, &logins),
                status(ActivitySource::Engagement, &engagements),
                status(ActivitySource::CrmModification, &records),
            ],
            engagements: engagements.data.stats,
            ..Default::default()
        };

        let (login_ledger, unmapped_logins) = logins.data.into_owner_ledger(&identities);
        data_quality.unmapped_logins = unmapped_logins;
        if unmapped_logins > 0 {
            info!(unmapped_logins, "login records with no matching seat");
        }

        let attributed_total = engagements.data.ledger.total_count();
        let view = ActivityView::new(login_ledger, engagements.data.ledger, records.data);

        // Counted before email filtering so unreported seats still contribute
        let attributed_engagements = users
            .iter()
            .filter(|u| !u.is_deactivated)
            .filter_map(|u| view.engagement.get(&u.owner_id))
            .map(|r| r.count)
            .sum();

        let (reportable, skipped): (Vec<User>, Vec<User>) =
            users.into_iter().partition(User::has_email);
        data_quality.skipped_without_email = skipped.len();
        if !skipped.is_empty() {
            info!(skipped = skipped.len(), "seats without an email left out of the report");
        }

        let estimates = self.evaluate(reportable, &view, now);
        let report = ReportAssembler::new(self.config.cost.clone()).assemble(
            estimates,
            data_quality,
            attributed_engagements,
            attributed_total,
            now,
        );

        info!(
            users = report.summary.total_scanned,
            monthly_waste = report.summary.monthly_waste,
            "audit complete"
        );
        Ok(report)
    }

    /// Score and cost every user against an already merged view
    pub fn evaluate(
        &self,
        users: Vec<User>,
        view: &ActivityView,
        now: DateTime<Utc>,
    ) -> Vec<SeatCostEstimate> {
        users
            .into_iter()
            .map(|user| {
                let signals = view.signals(&user, now);
                let verdict = self.scorer.score(user.is_deactivated, &signals);
                debug!(
                    owner_id = %user.owner_id,
                    score = verdict.score,
                    tier = %verdict.tier,
                    "user scored"
                );
                self.config.cost.estimate(user, verdict)
            })
            .collect()
    }
}

fn status<T>(source: ActivitySource, collected: &Collected<T>) -> SourceStatus {
    SourceStatus {
        source,
        available: collected.available,
        pages: collected.pages,
        note: collected.note.clone(),
    }
}
