//! Confidence that a seat is inactive and can be removed
//!
//! Rules are evaluated in priority order and the first match wins:
//!
//! 1. deactivated account: `DEACTIVATED` (100)
//! 2. last login at least `login_inactive_days` ago: `HIGH` (95)
//! 3. no engagement inside `engagement_window_days`:
//!    - and no record edits inside `crm_activity_window_days`: `MEDIUM-HIGH` (80)
//!    - otherwise: `MEDIUM` (70)
//! 4. everything else: `ACTIVE` (0)
//!
//! A user with no signal from any source lands on `MEDIUM-HIGH`: silence is
//! read as inactivity rather than as missing data.

use crate::activity::ActivitySignals;
use crate::config::Thresholds;
use crate::model::{ConfidenceVerdict, Tier};

pub const DEACTIVATED_SCORE: u8 = 100;
pub const HIGH_SCORE: u8 = 95;
pub const MEDIUM_HIGH_SCORE: u8 = 80;
pub const MEDIUM_SCORE: u8 = 70;
pub const ACTIVE_SCORE: u8 = 0;

pub const DEACTIVATED_REASON: &str = "Account deactivated - check if seat still assigned";

/// Stateless scorer over a fixed set of thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfidenceScorer {
    thresholds: Thresholds,
}

impl ConfidenceScorer {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn score(&self, is_deactivated: bool, signals: &ActivitySignals) -> ConfidenceVerdict {
        let t = &self.thresholds;

        if is_deactivated {
            return verdict(DEACTIVATED_SCORE, Tier::Deactivated, DEACTIVATED_REASON.to_string());
        }

        if let Some(days) = signals
            .days_since_login
            .filter(|days| *days >= t.login_inactive_days)
        {
            let mut reason = format!("No login in {} days", days);
            if signals.days_since_engagement.is_none() {
                reason.push_str(", no engagements detected");
            }
            return verdict(HIGH_SCORE, Tier::High, reason);
        }

        let engagement_stale = is_stale(signals.days_since_engagement, t.engagement_window_days);
        if engagement_stale {
            if is_stale(signals.days_since_crm_activity, t.crm_activity_window_days) {
                return verdict(
                    MEDIUM_HIGH_SCORE,
                    Tier::MediumHigh,
                    format!(
                        "No engagements in {}+ days, no CRM activity in {}+ days",
                        t.engagement_window_days, t.crm_activity_window_days
                    ),
                );
            }
            return verdict(
                MEDIUM_SCORE,
                Tier::Medium,
                format!(
                    "No engagements in {}+ days, but {} CRM modifications",
                    t.engagement_window_days, signals.crm_count
                ),
            );
        }

        let categories = if signals.engagement_categories.is_empty() {
            "none".to_string()
        } else {
            signals.engagement_categories.join(", ")
        };
        verdict(
            ACTIVE_SCORE,
            Tier::Active,
            format!("{} engagements ({})", signals.engagement_count, categories),
        )
    }
}

/// Unknown or at/after the window edge
fn is_stale(days_since: Option<i64>, window_days: i64) -> bool {
    days_since.is_none_or(|days| days >= window_days)
}

fn verdict(score: u8, tier: Tier, reason: String) -> ConfidenceVerdict {
    ConfidenceVerdict {
        score,
        tier,
        reason,
    }
}
