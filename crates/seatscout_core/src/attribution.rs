//! Owner attribution for engagement events
//!
//! An engagement is credited to exactly one owner, chosen by the first
//! resolver in [`ATTRIBUTION_CHAIN`] that yields one. Earlier resolvers are
//! the more precise signals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::OwnerId;
use crate::identity::IdentityMap;

/// Marker carried in the source field of demo/sample engagements
pub const SAMPLE_MARKER: &str = "SAMPLE";

/// An engagement as reported by the engagement source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementEvent {
    /// call, email, meeting, task, note...
    pub event_type: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub owner_id: Option<String>,
    pub created_by: Option<String>,
    pub modified_by: Option<String>,
    #[serde(default)]
    pub associated_owner_ids: Vec<String>,
    pub source_marker: Option<String>,
}

impl EngagementEvent {
    pub fn is_sample(&self) -> bool {
        self.source_marker
            .as_deref()
            .is_some_and(|marker| marker.to_uppercase().contains(SAMPLE_MARKER))
    }

    /// Lower-cased event type, `unknown` when absent
    pub fn category(&self) -> String {
        match self.event_type.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_lowercase(),
            _ => "unknown".to_string(),
        }
    }
}

/// Which rule in the chain credited the owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionMethod {
    ExplicitOwner,
    Creator,
    LastModifier,
    AssociatedOwner,
}

/// Outcome of running the chain over one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribution {
    Owner {
        owner_id: OwnerId,
        method: AttributionMethod,
    },
    Unattributed,
}

impl Attribution {
    pub fn owner(&self) -> Option<&OwnerId> {
        match self {
            Self::Owner { owner_id, .. } => Some(owner_id),
            Self::Unattributed => None,
        }
    }
}

/// A single link of the chain: returns an owner when its signal applies
pub type Resolver = fn(&EngagementEvent, &IdentityMap) -> Option<OwnerId>;

/// Resolvers in precedence order
pub const ATTRIBUTION_CHAIN: [(AttributionMethod, Resolver); 4] = [
    (AttributionMethod::ExplicitOwner, explicit_owner),
    (AttributionMethod::Creator, creator),
    (AttributionMethod::LastModifier, last_modifier),
    (AttributionMethod::AssociatedOwner, first_associated_owner),
];

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

pub fn explicit_owner(event: &EngagementEvent, _identities: &IdentityMap) -> Option<OwnerId> {
    non_empty(event.owner_id.as_ref()).map(OwnerId::from)
}

pub fn creator(event: &EngagementEvent, identities: &IdentityMap) -> Option<OwnerId> {
    non_empty(event.created_by.as_ref())
        .and_then(|id| identities.owner_for_raw(id))
        .cloned()
}

pub fn last_modifier(event: &EngagementEvent, identities: &IdentityMap) -> Option<OwnerId> {
    non_empty(event.modified_by.as_ref())
        .and_then(|id| identities.owner_for_raw(id))
        .cloned()
}

pub fn first_associated_owner(
    event: &EngagementEvent,
    _identities: &IdentityMap,
) -> Option<OwnerId> {
    non_empty(event.associated_owner_ids.first()).map(OwnerId::from)
}

/// Run the chain, stopping at the first resolver that applies
pub fn attribute(event: &EngagementEvent, identities: &IdentityMap) -> Attribution {
    ATTRIBUTION_CHAIN
        .iter()
        .find_map(|(method, resolve)| {
            resolve(event, identities).map(|owner_id| Attribution::Owner {
                owner_id,
                method: *method,
            })
        })
        .unwrap_or(Attribution::Unattributed)
}
