//! Per-owner activity ledgers and the merged activity view

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::id::{LoginId, OwnerId};
use crate::identity::IdentityMap;
use crate::model::{ActivityRecord, User};

/// Owner-keyed activity for a single source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityLedger {
    records: HashMap<OwnerId, ActivityRecord>,
}

impl ActivityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup-or-create the owner's record, then merge the observation in.
    pub fn upsert(&mut self, owner_id: &OwnerId, seen_at: DateTime<Utc>, category: Option<&str>) {
        match self.records.get_mut(owner_id) {
            Some(record) => record.observe(seen_at, category),
            None => {
                let mut record = ActivityRecord::first(owner_id.clone(), seen_at);
                if let Some(category) = category {
                    record.categories.insert(category.to_string());
                }
                self.records.insert(owner_id.clone(), record);
            }
        }
    }

    /// Fold another ledger for the same source into this one
    pub fn merge(&mut self, other: ActivityLedger) {
        for (owner_id, incoming) in other.records {
            match self.records.get_mut(&owner_id) {
                Some(record) => record.absorb(incoming),
                None => {
                    self.records.insert(owner_id, incoming);
                }
            }
        }
    }

    pub fn get(&self, owner_id: &OwnerId) -> Option<&ActivityRecord> {
        self.records.get(owner_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_count(&self) -> u64 {
        self.records.values().map(|r| r.count).sum()
    }

}

/// Last login per login id, kept in the login subsystem's identifier space
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginHistory {
    last_login: HashMap<LoginId, DateTime<Utc>>,
}

impl LoginHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a login, keeping the latest timestamp per login id
    pub fn record(&mut self, login_id: LoginId, at: DateTime<Utc>) {
        self.last_login
            .entry(login_id)
            .and_modify(|current| *current = crate::model::latest(*current, at))
            .or_insert(at);
    }

    pub fn last_login(&self, login_id: &LoginId) -> Option<DateTime<Utc>> {
        self.last_login.get(login_id).copied()
    }

    pub fn len(&self) -> usize {
        self.last_login.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_login.is_empty()
    }

    /// Translate into owner space. Returns the ledger and the number of
    /// login ids that no seat maps to.
    pub fn into_owner_ledger(self, identities: &IdentityMap) -> (ActivityLedger, usize) {
        let mut ledger = ActivityLedger::new();
        let mut unmapped = 0;
        for (login_id, at) in self.last_login {
            match identities.owner_for(&login_id) {
                Some(owner_id) => ledger.upsert(owner_id, at, None),
                None => unmapped += 1,
            }
        }
        (ledger, unmapped)
    }
}

/// Days-since figures for one user, ready for scoring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivitySignals {
    pub days_since_login: Option<i64>,
    pub days_since_engagement: Option<i64>,
    pub days_since_crm_activity: Option<i64>,
    pub engagement_count: u64,
    pub engagement_categories: Vec<String>,
    pub crm_count: u64,
}

/// All activity merged onto the owner identifier space
#[derive(Debug, Clone, Default)]
pub struct ActivityView {
    pub login: ActivityLedger,
    pub engagement: ActivityLedger,
    pub crm: ActivityLedger,
}

impl ActivityView {
    pub fn new(login: ActivityLedger, engagement: ActivityLedger, crm: ActivityLedger) -> Self {
        Self {
            login,
            engagement,
            crm,
        }
    }

    pub fn signals(&self, user: &User, now: DateTime<Utc>) -> ActivitySignals {
        let owner = &user.owner_id;
        let engagement = self.engagement.get(owner);
        let crm = self.crm.get(owner);

        ActivitySignals {
            days_since_login: self.login.get(owner).map(|r| days_between(r.last_seen, now)),
            days_since_engagement: engagement.map(|r| days_between(r.last_seen, now)),
            days_since_crm_activity: crm.map(|r| days_between(r.last_seen, now)),
            engagement_count: engagement.map_or(0, |r| r.count),
            engagement_categories: engagement
                .map(|r| r.categories.iter().cloned().collect())
                .unwrap_or_default(),
            crm_count: crm.map_or(0, |r| r.count),
        }
    }
}

/// Whole days elapsed from `then` to `now`
pub fn days_between(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    now.signed_duration_since(then).num_days()
}

/// Start of a window of `days` ending at `now`, clamped to the earliest
/// representable instant
pub fn window_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 30, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_upsert_creates_then_merges() {
        let owner = OwnerId::new("1");
        let mut ledger = ActivityLedger::new();

        ledger.upsert(&owner, now() - Duration::days(10), Some("call"));
        ledger.upsert(&owner, now() - Duration::days(2), Some("email"));
        ledger.upsert(&owner, now() - Duration::days(30), Some("call"));

        let record = ledger.get(&owner).unwrap();
        assert_eq!(record.count, 3);
        assert_eq!(record.last_seen, now() - Duration::days(2));
        assert_eq!(
            record.categories.iter().cloned().collect::<Vec<_>>(),
            vec!["call".to_string(), "email".to_string()]
        );
        assert_eq!(ledger.total_count(), 3);
    }

    #[test]
    fn test_login_history_keeps_latest_and_translates() {
        let users = vec![User::new("100").with_login_id("9001")];
        let identities = IdentityMap::from_users(&users);

        let mut history = LoginHistory::new();
        history.record(LoginId::new("9001"), now() - Duration::days(100));
        history.record(LoginId::new("9001"), now() - Duration::days(5));
        history.record(LoginId::new("9001"), now() - Duration::days(50));
        history.record(LoginId::new("ghost"), now());
        assert_eq!(
            history.last_login(&LoginId::new("9001")),
            Some(now() - Duration::days(5))
        );

        let (ledger, unmapped) = history.into_owner_ledger(&identities);
        assert_eq!(unmapped, 1);
        assert_eq!(
            ledger.get(&OwnerId::new("100")).map(|r| r.last_seen),
            Some(now() - Duration::days(5))
        );
    }

    #[test]
    fn test_signals_for_silent_user() {
        let view = ActivityView::default();
        let signals = view.signals(&User::new("5"), now());
        assert_eq!(signals, ActivitySignals::default());
    }

    #[test]
    fn test_signals_combine_sources() {
        let owner = OwnerId::new("7");
        let mut login = ActivityLedger::new();
        login.upsert(&owner, now() - Duration::days(3), None);
        let mut engagement = ActivityLedger::new();
        engagement.upsert(&owner, now() - Duration::days(12), Some("meeting"));
        let mut crm = ActivityLedger::new();
        crm.upsert(&owner, now() - Duration::hours(30), None);

        let view = ActivityView::new(login, engagement, crm);
        let signals = view.signals(&User::new("7"), now());

        assert_eq!(signals.days_since_login, Some(3));
        assert_eq!(signals.days_since_engagement, Some(12));
        assert_eq!(signals.days_since_crm_activity, Some(1));
        assert_eq!(signals.engagement_count, 1);
        assert_eq!(signals.engagement_categories, vec!["meeting".to_string()]);
        assert_eq!(signals.crm_count, 1);
    }

    #[test]
    fn test_window_start() {
        assert_eq!(window_start(now(), 30), now() - Duration::days(30));
        assert_eq!(window_start(now(), 0), now());
    }

    #[test]
    fn test_window_start_clamps_huge_windows() {
        assert_eq!(window_start(now(), 200_000_000), DateTime::<Utc>::MIN_UTC);
        assert_eq!(window_start(now(), i64::MAX), DateTime::<Utc>::MIN_UTC);
    }
}
