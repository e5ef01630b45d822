//! One-page reachability check of every audit source
//!
//! Used before a first audit to find missing token scopes: each source is
//! asked for a single page and the answer is classified without following
//! pagination.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use seatscout_core::{AuditSources, Page, SeatStatus, SourceError};

use crate::client::{ENGAGEMENTS_SOURCE, LOGIN_SOURCE, search_source};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// The source answered; `items` is the size of the first page
    Available { items: usize, more: bool },
    /// Forbidden for this token or account tier
    Unavailable { status: u16 },
    Failed { message: String },
}

impl ProbeOutcome {
    pub fn from_page<T>(result: Result<Page<T>, SourceError>) -> Self {
        match result {
            Ok(page) => Self::Available {
                items: page.items.len(),
                more: page.next.is_some(),
            },
            Err(SourceError::Unavailable { status, .. }) => Self::Unavailable { status },
            Err(err) => Self::Failed {
                message: error_chain(&err),
            },
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeCheck {
    pub name: String,
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
}

/// Ask every source for its first page.
///
/// `since` bounds the record searches the same way an audit would.
pub async fn probe(
    sources: AuditSources<'_>,
    object_types: &[String],
    since: DateTime<Utc>,
) -> Vec<ProbeCheck> {
    let mut checks = Vec::with_capacity(4 + object_types.len());

    for (name, status) in [
        ("owners (active)", SeatStatus::Active),
        ("owners (archived)", SeatStatus::Deactivated),
    ] {
        checks.push(ProbeCheck {
            name: name.to_string(),
            outcome: ProbeOutcome::from_page(sources.seats.fetch_seats(status, None).await),
        });
    }

    checks.push(ProbeCheck {
        name: LOGIN_SOURCE.to_string(),
        outcome: ProbeOutcome::from_page(sources.logins.fetch_logins(None).await),
    });

    checks.push(ProbeCheck {
        name: ENGAGEMENTS_SOURCE.to_string(),
        outcome: ProbeOutcome::from_page(sources.engagements.fetch_engagements(None).await),
    });

    for object_type in object_types {
        checks.push(ProbeCheck {
            name: search_source(object_type),
            outcome: ProbeOutcome::from_page(
                sources.records.fetch_modified(object_type, since, None).await,
            ),
        });
    }

    for check in &checks {
        debug!(source = %check.name, outcome = ?check.outcome, "probed");
    }
    checks
}
