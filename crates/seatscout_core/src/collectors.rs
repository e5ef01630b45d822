//! Activity collectors
//!
//! Every collector owns and returns its own mapping. A source that cannot be
//! read degrades to an empty mapping marked unavailable; only the seat
//! listing is allowed to fail an audit.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::activity::{ActivityLedger, LoginHistory, window_start};
use crate::attribution::{Attribution, attribute};
use crate::error::SourceError;
use crate::identity::IdentityMap;
use crate::model::{ActivitySource, SeatStatus, User};
use crate::source::{EngagementSource, LoginSource, RecordSource, SeatSource, paginate};

/// A collector's result along with whether its source could be read
#[derive(Debug, Clone, Default)]
pub struct Collected<T> {
    pub data: T,
    pub available: bool,
    pub pages: usize,
    /// Why the source was not usable, when it was not
    pub note: Option<String>,
}

impl<T: Default> Collected<T> {
    fn unavailable(source: ActivitySource, error: &SourceError) -> Self {
        if error.is_unavailable() {
            info!(source = %source, error = %error, "source not available, continuing without it");
        } else {
            warn!(source = %source, error = ?error, "source failed, continuing without it");
        }
        Self {
            data: T::default(),
            available: false,
            pages: 0,
            note: Some(error.to_string()),
        }
    }
}

/// Fetch active and deactivated seats, deduplicated by owner id.
///
/// The deactivation flag is taken from the listing that returned the user.
pub async fn collect_seats(source: &dyn SeatSource) -> Result<Vec<User>, SourceError> {
    let mut users = Vec::new();
    let mut seen = HashSet::new();

    for status in [SeatStatus::Active, SeatStatus::Deactivated] {
        let pages = paginate(
            "seat listing",
            |cursor| source.fetch_seats(status, cursor),
            |page| {
                for mut user in page {
                    if seen.insert(user.owner_id.clone()) {
                        user.is_deactivated = status == SeatStatus::Deactivated;
                        users.push(user);
                    }
                }
            },
        )
        .await?;
        debug!(?status, pages, "seat listing fetched");
    }

    info!(
        users = users.len(),
        deactivated = users.iter().filter(|u| u.is_deactivated).count(),
        "seat listing complete"
    );
    Ok(users)
}

/// Last login per login id across every page of the login history.
///
/// An empty history is reported as unavailable: the login API answers with
/// nothing on account tiers that do not record logins.
pub async fn collect_logins(source: &dyn LoginSource) -> Collected<LoginHistory> {
    let mut history = LoginHistory::new();
    let mut malformed = 0usize;

    let result = paginate(
        "login history",
        |cursor| source.fetch_logins(cursor),
        |page| {
            for login in page {
                match login.logged_in_at {
                    Some(at) => history.record(login.login_id, at),
                    None => malformed += 1,
                }
            }
        },
    )
    .await;

    match result {
        Err(e) => Collected::unavailable(ActivitySource::Login, &e),
        Ok(pages) if history.is_empty() => {
            info!(pages, "login history returned no records");
            Collected {
                data: history,
                available: false,
                pages,
                note: Some("login history returned no records".to_string()),
            }
        }
        Ok(pages) => {
            if malformed > 0 {
                info!(malformed, "skipped login records without a timestamp");
            }
            info!(pages, logins = history.len(), "login history collected");
            Collected {
                data: history,
                available: true,
                pages,
                note: None,
            }
        }
    }
}

/// Counters describing what happened to each scanned engagement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngagementStats {
    /// Non-sample events with a timestamp inside the window
    pub scanned: u64,
    pub attributed: u64,
    pub unattributed: u64,
    pub sample_excluded: u64,
    /// Events missing their timestamp
    pub malformed: u64,
    pub out_of_window: u64,
}

/// Owner-keyed engagements plus the counters for data-quality reporting
#[derive(Debug, Clone, Default)]
pub struct EngagementActivity {
    pub ledger: ActivityLedger,
    pub stats: EngagementStats,
}

/// Attribute every engagement within `window_days` of `now` to an owner.
pub async fn collect_engagements(
    source: &dyn EngagementSource,
    identities: &IdentityMap,
    window_days: i64,
    now: DateTime<Utc>,
) -> Collected<EngagementActivity> {
    let cutoff = window_start(now, window_days);
    let mut activity = EngagementActivity::default();

    let result = paginate(
        "engagements",
        |cursor| source.fetch_engagements(cursor),
        |page| {
            for event in page {
                let stats = &mut activity.stats;
                if event.is_sample() {
                    stats.sample_excluded += 1;
                    continue;
                }
                let Some(created_at) = event.created_at else {
                    stats.malformed += 1;
                    continue;
                };
                if created_at < cutoff {
                    stats.out_of_window += 1;
                    continue;
                }

                stats.scanned += 1;
                match attribute(&event, identities) {
                    Attribution::Owner { owner_id, method } => {
                        stats.attributed += 1;
                        debug!(owner_id = %owner_id, ?method, "engagement attributed");
                        activity
                            .ledger
                            .upsert(&owner_id, created_at, Some(event.category().as_str()));
                    }
                    Attribution::Unattributed => stats.unattributed += 1,
                }
            }
        },
    )
    .await;

    match result {
        Err(e) => Collected::unavailable(ActivitySource::Engagement, &e),
        Ok(pages) => {
            let stats = activity.stats;
            if stats.sample_excluded > 0 {
                info!(
                    sample_excluded = stats.sample_excluded,
                    "skipped sample/demo engagements"
                );
            }
            if stats.malformed > 0 {
                info!(
                    malformed = stats.malformed,
                    "skipped engagements without a timestamp"
                );
            }
            info!(
                pages,
                scanned = stats.scanned,
                attributed = stats.attributed,
                unattributed = stats.unattributed,
                "engagements collected"
            );
            Collected {
                data: activity,
                available: true,
                pages,
                note: None,
            }
        }
    }
}

/// Records modified in the last `window_days`, across every object type.
///
/// An object type whose search fails is skipped; the collector is available
/// when at least one object type answered.
pub async fn collect_record_modifications(
    source: &dyn RecordSource,
    object_types: &[String],
    window_days: i64,
    now: DateTime<Utc>,
) -> Collected<ActivityLedger> {
    let since = window_start(now, window_days);
    let mut ledger = ActivityLedger::new();
    let mut total_pages = 0;
    let mut answered = 0;
    let mut failures = Vec::new();

    for object_type in object_types {
        let mut page_records = ActivityLedger::new();
        let mut skipped = 0u64;

        let result = paginate(
            object_type,
            |cursor| source.fetch_modified(object_type, since, cursor),
            |page| {
                for record in page {
                    match (record.owner_id, record.modified_at) {
                        (Some(owner_id), Some(at)) if at >= since => {
                            page_records.upsert(&owner_id, at, None)
                        }
                        _ => skipped += 1,
                    }
                }
            },
        )
        .await;

        match result {
            Ok(pages) => {
                answered += 1;
                total_pages += pages;
                info!(
                    object_type = %object_type,
                    pages,
                    owners = page_records.len(),
                    records = page_records.total_count(),
                    skipped,
                    "record modifications collected"
                );
                ledger.merge(page_records);
            }
            Err(e) => {
                warn!(object_type = %object_type, error = %e, "record search failed, skipping object type");
                failures.push(format!("{}: {}", object_type, e));
            }
        }
    }

    Collected {
        data: ledger,
        available: answered > 0,
        pages: total_pages,
        note: (!failures.is_empty()).then(|| failures.join("; ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::EngagementEvent;
    use crate::id::{LoginId, OwnerId};
    use crate::source::{LoginEvent, MockLoginSource, Page, RecordModification};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 30, 12, 0, 0).unwrap()
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        now() - Duration::days(days)
    }

    /// Serves a fixed list of pages, chained by numeric cursor
    struct PagedEngagements(Vec<Vec<EngagementEvent>>);

    #[async_trait]
    impl EngagementSource for PagedEngagements {
        async fn fetch_engagements(
            &self,
            cursor: Option<String>,
        ) -> Result<Page<EngagementEvent>, SourceError> {
            let index: usize = cursor.map_or(0, |c| c.parse().unwrap());
            let items = self.0[index].clone();
            if index + 1 < self.0.len() {
                Ok(Page::with_next(items, (index + 1).to_string()))
            } else {
                Ok(Page::last(items))
            }
        }
    }

    struct FailingEngagements;

    #[async_trait]
    impl EngagementSource for FailingEngagements {
        async fn fetch_engagements(
            &self,
            _cursor: Option<String>,
        ) -> Result<Page<EngagementEvent>, SourceError> {
            Err(SourceError::Http {
                source_name: "engagements".to_string(),
                status: 500,
                body: "boom".to_string(),
            })
        }
    }

    fn event(owner: Option<&str>, created: Option<DateTime<Utc>>) -> EngagementEvent {
        EngagementEvent {
            event_type: Some("CALL".to_string()),
            created_at: created,
            owner_id: owner.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_engagements_across_pages() {
        let identities = IdentityMap::from_users(&[User::new("200").with_login_id("u-2")]);
        let sample = EngagementEvent {
            source_marker: Some("Sample_Data".to_string()),
            owner_id: Some("100".to_string()),
            created_at: Some(days_ago(1)),
            ..Default::default()
        };
        let by_creator = EngagementEvent {
            event_type: Some("Meeting".to_string()),
            created_at: Some(days_ago(3)),
            created_by: Some("u-2".to_string()),
            ..Default::default()
        };
        let orphan = EngagementEvent {
            created_at: Some(days_ago(4)),
            created_by: Some("u-404".to_string()),
            ..Default::default()
        };

        let source = PagedEngagements(vec![
            vec![event(Some("100"), Some(days_ago(10))), sample],
            vec![
                event(Some("100"), Some(days_ago(2))),
                event(Some("100"), None),
                by_creator,
            ],
            vec![event(Some("100"), Some(days_ago(90))), orphan],
        ]);

        let collected = collect_engagements(&source, &identities, 60, now()).await;
        assert!(collected.available);
        assert_eq!(collected.pages, 3);

        let stats = collected.data.stats;
        assert_eq!(
            stats,
            EngagementStats {
                scanned: 4,
                attributed: 3,
                unattributed: 1,
                sample_excluded: 1,
                malformed: 1,
                out_of_window: 1,
            }
        );

        let ledger = &collected.data.ledger;
        let owner_100 = ledger.get(&OwnerId::new("100")).unwrap();
        assert_eq!(owner_100.count, 2);
        assert_eq!(owner_100.last_seen, days_ago(2));
        let owner_200 = ledger.get(&OwnerId::new("200")).unwrap();
        assert!(owner_200.categories.contains("meeting"));
    }

    #[tokio::test]
    async fn test_failed_engagement_source_degrades_to_empty() {
        let collected =
            collect_engagements(&FailingEngagements, &IdentityMap::default(), 60, now()).await;
        assert!(!collected.available);
        assert!(collected.data.ledger.is_empty());
        assert!(collected.note.unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_logins_deduplicate_across_pages() {
        let mut source = MockLoginSource::new();
        source.expect_fetch_logins().times(2).returning(|cursor| {
            let login = |id: &str, days: i64| LoginEvent {
                login_id: LoginId::new(id),
                logged_in_at: Some(days_ago(days)),
            };
            Ok(match cursor {
                None => Page::with_next(vec![login("1", 40), login("2", 5)], "p2"),
                Some(_) => Page::last(vec![
                    login("1", 3),
                    LoginEvent {
                        login_id: LoginId::new("3"),
                        logged_in_at: None,
                    },
                ]),
            })
        });

        let collected = collect_logins(&source).await;
        assert!(collected.available);
        assert_eq!(collected.pages, 2);
        assert_eq!(collected.data.len(), 2);
        assert_eq!(
            collected.data.last_login(&LoginId::new("1")),
            Some(days_ago(3))
        );
    }

    #[tokio::test]
    async fn test_forbidden_login_history_is_unavailable() {
        let mut source = MockLoginSource::new();
        source.expect_fetch_logins().returning(|_| {
            Err(SourceError::Unavailable {
                source_name: "login history".to_string(),
                status: 403,
            })
        });

        let collected = collect_logins(&source).await;
        assert!(!collected.available);
        assert!(collected.data.is_empty());
    }

    #[tokio::test]
    async fn test_empty_login_history_is_unavailable() {
        let mut source = MockLoginSource::new();
        source
            .expect_fetch_logins()
            .returning(|_| Ok(Page::last(Vec::new())));

        let collected = collect_logins(&source).await;
        assert!(!collected.available);
    }

    /// Record search keyed by object type; `None` means the search is forbidden
    struct Records(HashMap<String, Option<Vec<RecordModification>>>);

    #[async_trait]
    impl RecordSource for Records {
        async fn fetch_modified(
            &self,
            object_type: &str,
            _since: DateTime<Utc>,
            _cursor: Option<String>,
        ) -> Result<Page<RecordModification>, SourceError> {
            match self.0.get(object_type) {
                Some(Some(items)) => Ok(Page::last(items.clone())),
                _ => Err(SourceError::Unavailable {
                    source_name: object_type.to_string(),
                    status: 403,
                }),
            }
        }
    }

    fn modified(owner: Option<&str>, at: Option<DateTime<Utc>>) -> RecordModification {
        RecordModification {
            owner_id: owner.map(OwnerId::new),
            modified_at: at,
        }
    }

    #[tokio::test]
    async fn test_record_modifications_merge_object_types() {
        let source = Records(HashMap::from([
            (
                "contacts".to_string(),
                Some(vec![
                    modified(Some("1"), Some(days_ago(20))),
                    modified(None, Some(days_ago(1))),
                    modified(Some("1"), Some(days_ago(45))),
                ]),
            ),
            (
                "deals".to_string(),
                Some(vec![modified(Some("1"), Some(days_ago(4)))]),
            ),
            ("tickets".to_string(), None),
        ]));
        let types = vec![
            "contacts".to_string(),
            "deals".to_string(),
            "tickets".to_string(),
        ];

        let collected = collect_record_modifications(&source, &types, 30, now()).await;
        assert!(collected.available);
        assert!(collected.note.unwrap().starts_with("tickets"));

        let record = collected.data.get(&OwnerId::new("1")).unwrap();
        assert_eq!(record.count, 2);
        assert_eq!(record.last_seen, days_ago(4));
    }

    #[tokio::test]
    async fn test_record_modifications_all_forbidden() {
        let source = Records(HashMap::new());
        let types = vec!["contacts".to_string()];
        let collected = collect_record_modifications(&source, &types, 30, now()).await;
        assert!(!collected.available);
        assert!(collected.data.is_empty());
    }
}
