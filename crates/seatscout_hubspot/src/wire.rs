//! HubSpot JSON shapes and their translation into core types
//!
//! HubSpot is inconsistent about identifier encoding: owner ids come back
//! as strings from the v3 APIs and as numbers from the v1 engagements API,
//! and user ids flip between the two depending on the endpoint. Every id
//! is normalised to a string here so the core only sees one form.

use chrono::{DateTime, Utc};
use seatscout_core::{EngagementEvent, LoginEvent, LoginId, OwnerId, RecordModification, User};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text.trim().to_string(),
            RawId::Number(n) => n.to_string(),
        }
    }
}

fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?
        .map(String::from)
        .filter(|id| !id.is_empty()))
}

fn id_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<RawId>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(String::from)
        .filter(|id| !id.is_empty())
        .collect())
}

/// RFC 3339, or epoch milliseconds as HubSpot sometimes sends in property values
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(millis) = raw.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ---- v3 collection paging -------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct NextPage {
    #[serde(deserialize_with = "id")]
    pub after: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Paging {
    pub next: Option<NextPage>,
}

/// `{ "results": [...], "paging": { "next": { "after": ... } } }`
#[derive(Debug, Deserialize)]
pub struct CollectionResponse<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

impl<T> CollectionResponse<T> {
    pub fn next_cursor(&self) -> Option<String> {
        self.paging
            .as_ref()
            .and_then(|p| p.next.as_ref())
            .map(|n| n.after.clone())
            .filter(|after| !after.is_empty())
    }
}

// ---- owners ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRecord {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

impl OwnerRecord {
    pub fn into_user(self) -> User {
        let mut user = User::new(OwnerId::new(self.id));
        user.login_id = self.user_id.map(LoginId::new);
        user.email = self.email.filter(|e| !e.trim().is_empty());
        user.first_name = self.first_name;
        user.last_name = self.last_name;
        user.is_deactivated = self.archived;
        user
    }
}

// ---- login history --------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRecord {
    #[serde(default, deserialize_with = "optional_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub login_at: Option<String>,
}

impl LoginRecord {
    /// `None` when the row names no user at all
    pub fn into_event(self) -> Option<LoginEvent> {
        let login_id = LoginId::new(self.user_id?);
        Some(LoginEvent {
            login_id,
            logged_in_at: self.login_at.as_deref().and_then(parse_timestamp),
        })
    }
}

// ---- v1 engagements -------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementBody {
    /// Epoch milliseconds
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub owner_id: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub modified_by: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Associations {
    #[serde(default, deserialize_with = "id_list")]
    pub owner_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EngagementItem {
    #[serde(default)]
    pub engagement: EngagementBody,
    #[serde(default)]
    pub associations: Associations,
}

impl From<EngagementItem> for EngagementEvent {
    fn from(item: EngagementItem) -> Self {
        let body = item.engagement;
        EngagementEvent {
            event_type: body.kind,
            created_at: body.created_at.and_then(DateTime::from_timestamp_millis),
            owner_id: body.owner_id,
            created_by: body.created_by,
            modified_by: body.modified_by,
            associated_owner_ids: item.associations.owner_ids,
            source_marker: body.source_id,
        }
    }
}

/// Offset-paged response of the v1 engagements API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementsResponse {
    #[serde(default)]
    pub results: Vec<EngagementItem>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default, deserialize_with = "optional_id")]
    pub offset: Option<String>,
}

impl EngagementsResponse {
    pub fn next_cursor(&self) -> Option<String> {
        if self.has_more {
            self.offset.clone()
        } else {
            None
        }
    }
}

// ---- CRM object search ----------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub property_name: String,
    pub operator: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterGroup {
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub filter_groups: Vec<FilterGroup>,
    pub properties: Vec<String>,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl SearchRequest {
    /// Records whose last modification is at or after `since`
    pub fn modified_since(since: DateTime<Utc>, limit: u32, after: Option<String>) -> Self {
        Self {
            filter_groups: vec![FilterGroup {
                filters: vec![Filter {
                    property_name: "hs_lastmodifieddate".to_string(),
                    operator: "GTE".to_string(),
                    value: since.timestamp_millis().to_string(),
                }],
            }],
            properties: vec![
                "hubspot_owner_id".to_string(),
                "hs_lastmodifieddate".to_string(),
            ],
            limit,
            after,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchProperties {
    #[serde(default, deserialize_with = "optional_id")]
    pub hubspot_owner_id: Option<String>,
    #[serde(default)]
    pub hs_lastmodifieddate: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub properties: SearchProperties,
}

impl From<SearchResult> for RecordModification {
    fn from(result: SearchResult) -> Self {
        let props = result.properties;
        RecordModification {
            owner_id: props.hubspot_owner_id.map(OwnerId::new),
            modified_at: props.hs_lastmodifieddate.as_deref().and_then(parse_timestamp),
        }
    }
}
