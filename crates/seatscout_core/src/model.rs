//! Run-scoped data model for a seat audit

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{LoginId, OwnerId};

/// A licensed seat holder as reported by the seat listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub owner_id: OwnerId,
    /// Login-history identity; absent for owners that never had a login account
    pub login_id: Option<LoginId>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_deactivated: bool,
}

impl User {
    pub fn new(owner_id: impl Into<OwnerId>) -> Self {
        Self {
            owner_id: owner_id.into(),
            login_id: None,
            email: None,
            first_name: None,
            last_name: None,
            is_deactivated: false,
        }
    }

    pub fn with_login_id(mut self, login_id: impl Into<LoginId>) -> Self {
        self.login_id = Some(login_id.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.is_deactivated = true;
        self
    }

    /// "First Last", falling back to the email, then the owner id
    pub fn display_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let name = name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
        match self.email.as_deref() {
            Some(email) if !email.is_empty() => email.to_string(),
            _ => self.owner_id.to_string(),
        }
    }

    pub fn has_email(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

/// Which seat population a listing query asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    Active,
    Deactivated,
}

/// Activity source an [`ActivityRecord`] was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySource {
    Login,
    Engagement,
    CrmModification,
}

impl fmt::Display for ActivitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => f.write_str("login history"),
            Self::Engagement => f.write_str("engagements"),
            Self::CrmModification => f.write_str("CRM modifications"),
        }
    }
}

/// Latest activity of one owner in one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub owner_id: OwnerId,
    pub last_seen: DateTime<Utc>,
    pub count: u64,
    pub categories: BTreeSet<String>,
}

impl ActivityRecord {
    pub fn first(owner_id: OwnerId, seen_at: DateTime<Utc>) -> Self {
        Self {
            owner_id,
            last_seen: seen_at,
            count: 1,
            categories: BTreeSet::new(),
        }
    }

    /// Count one more observation, keeping the later of the two timestamps
    pub fn observe(&mut self, seen_at: DateTime<Utc>, category: Option<&str>) {
        self.count += 1;
        self.last_seen = latest(self.last_seen, seen_at);
        if let Some(category) = category {
            self.categories.insert(category.to_string());
        }
    }

    /// Combine two records of the same owner and source
    pub fn absorb(&mut self, other: ActivityRecord) {
        self.count += other.count;
        self.last_seen = latest(self.last_seen, other.last_seen);
        self.categories.extend(other.categories);
    }
}

/// The timestamp merge rule shared by every collector
pub fn latest(current: DateTime<Utc>, candidate: DateTime<Utc>) -> DateTime<Utc> {
    if candidate > current {
        candidate
    } else {
        current
    }
}

/// Confidence tier that a seat can be removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Active,
    Medium,
    MediumHigh,
    High,
    Deactivated,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Medium => "MEDIUM",
            Self::MediumHigh => "MEDIUM-HIGH",
            Self::High => "HIGH",
            Self::Deactivated => "DEACTIVATED",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scorer output for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceVerdict {
    /// 0-100
    pub score: u8,
    pub tier: Tier,
    pub reason: String,
}

/// Status column shown to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatState {
    Active,
    Inactive,
    Deactivated,
}

impl fmt::Display for SeatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("Active"),
            Self::Inactive => f.write_str("Inactive"),
            Self::Deactivated => f.write_str("Deactivated"),
        }
    }
}

/// Verdict plus the money it represents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatCostEstimate {
    pub user: User,
    pub verdict: ConfidenceVerdict,
    pub monthly_cost: u64,
    pub annual_cost: u64,
}

impl SeatCostEstimate {
    pub fn state(&self, removal_score: u8) -> SeatState {
        if self.user.is_deactivated {
            SeatState::Deactivated
        } else if self.verdict.score >= removal_score {
            SeatState::Inactive
        } else {
            SeatState::Active
        }
    }
}
