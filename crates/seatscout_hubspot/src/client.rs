//! Authenticated HubSpot REST client
//!
//! One [`HubSpotClient`] serves all four audit sources. A 403 from any
//! endpoint is reported as [`SourceError::Unavailable`]: HubSpot answers
//! that way both for missing token scopes and for APIs the account tier
//! does not include, and the audit treats both as absent data.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use seatscout_core::config::HubSpotConfig;
use seatscout_core::{
    EngagementEvent, EngagementSource, LoginEvent, LoginSource, Page, RecordModification,
    RecordSource, SeatSource, SeatStatus, SourceError, User,
};

use crate::error::{HubSpotError, Result};
use crate::wire::{
    CollectionResponse, EngagementsResponse, LoginRecord, OwnerRecord, SearchRequest, SearchResult,
};

pub const OWNERS_SOURCE: &str = "owners";
pub const LOGIN_SOURCE: &str = "login history";
pub const ENGAGEMENTS_SOURCE: &str = "engagements";

/// Source name used for a CRM object search, e.g. `contacts search`
pub fn search_source(object_type: &str) -> String {
    format!("{object_type} search")
}

#[derive(Debug, Clone)]
pub struct HubSpotClient {
    http: Client,
    base_url: String,
    config: HubSpotConfig,
}

impl HubSpotClient {
    /// Build a client authenticated with a private app token
    pub fn new(token: &str, config: &HubSpotConfig) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(HubSpotError::MissingToken);
        }

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| HubSpotError::InvalidBaseUrl {
            url: config.base_url.clone(),
            cause: Box::new(e),
        })?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| HubSpotError::InvalidToken)?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("seatscout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|cause| HubSpotError::ClientBuild { cause })?;

        Ok(Self {
            http,
            base_url,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &HubSpotConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        source_name: &str,
        request: RequestBuilder,
    ) -> std::result::Result<T, SourceError> {
        let response = request.send().await.map_err(|e| SourceError::Transport {
            source_name: source_name.to_string(),
            cause: Box::new(e),
        })?;

        let status = response.status();
        trace!(source = source_name, %status, "response received");

        if status == StatusCode::FORBIDDEN {
            return Err(SourceError::Unavailable {
                source_name: source_name.to_string(),
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Http {
                source_name: source_name.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| SourceError::Transport {
            source_name: source_name.to_string(),
            cause: Box::new(e),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| SourceError::Decode {
            source_name: source_name.to_string(),
            cause: Box::new(e),
        })
    }
}

fn page<T>(items: Vec<T>, next: Option<String>) -> Page<T> {
    match next {
        Some(cursor) => Page::with_next(items, cursor),
        None => Page::last(items),
    }
}

#[async_trait]
impl SeatSource for HubSpotClient {
    async fn fetch_seats(
        &self,
        status: SeatStatus,
        cursor: Option<String>,
    ) -> std::result::Result<Page<User>, SourceError> {
        let archived = status == SeatStatus::Deactivated;
        let mut request = self.http.get(self.url("/crm/v3/owners/")).query(&[
            ("limit", self.config.owners_page_size.to_string()),
            ("archived", archived.to_string()),
        ]);
        if let Some(after) = &cursor {
            request = request.query(&[("after", after)]);
        }
        debug!(?status, ?cursor, "fetching owners");

        let response: CollectionResponse<OwnerRecord> =
            self.execute(OWNERS_SOURCE, request).await?;
        let next = response.next_cursor();
        let users = response
            .results
            .into_iter()
            .map(OwnerRecord::into_user)
            .collect();
        Ok(page(users, next))
    }
}

#[async_trait]
impl LoginSource for HubSpotClient {
    async fn fetch_logins(
        &self,
        cursor: Option<String>,
    ) -> std::result::Result<Page<LoginEvent>, SourceError> {
        let mut request = self
            .http
            .get(self.url("/account-info/v3/activity/login"))
            .query(&[("limit", self.config.login_page_size.to_string())]);
        if let Some(after) = &cursor {
            request = request.query(&[("after", after)]);
        }
        debug!(?cursor, "fetching login history");

        let response: CollectionResponse<LoginRecord> = self.execute(LOGIN_SOURCE, request).await?;
        let next = response.next_cursor();
        let total = response.results.len();
        let events: Vec<LoginEvent> = response
            .results
            .into_iter()
            .filter_map(LoginRecord::into_event)
            .collect();
        if events.len() < total {
            debug!(dropped = total - events.len(), "login rows without a user id");
        }
        Ok(page(events, next))
    }
}

#[async_trait]
impl EngagementSource for HubSpotClient {
    async fn fetch_engagements(
        &self,
        cursor: Option<String>,
    ) -> std::result::Result<Page<EngagementEvent>, SourceError> {
        let mut request = self
            .http
            .get(self.url("/engagements/v1/engagements/paged"))
            .query(&[("limit", self.config.engagements_page_size.to_string())]);
        if let Some(offset) = &cursor {
            request = request.query(&[("offset", offset)]);
        }
        debug!(?cursor, "fetching engagements");

        let response: EngagementsResponse = self.execute(ENGAGEMENTS_SOURCE, request).await?;
        let next = response.next_cursor();
        let events = response
            .results
            .into_iter()
            .map(EngagementEvent::from)
            .collect();
        Ok(page(events, next))
    }
}

#[async_trait]
impl RecordSource for HubSpotClient {
    async fn fetch_modified(
        &self,
        object_type: &str,
        since: DateTime<Utc>,
        cursor: Option<String>,
    ) -> std::result::Result<Page<RecordModification>, SourceError> {
        let body = SearchRequest::modified_since(since, self.config.search_page_size, cursor);
        let request = self
            .http
            .post(self.url(&format!("/crm/v3/objects/{object_type}/search")))
            .json(&body);
        debug!(object_type, after = ?body.after, "searching modified records");

        let response: CollectionResponse<SearchResult> =
            self.execute(&search_source(object_type), request).await?;
        let next = response.next_cursor();
        let records = response
            .results
            .into_iter()
            .map(RecordModification::from)
            .collect();
        Ok(page(records, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_rejected() {
        let err = HubSpotClient::new("   ", &HubSpotConfig::default()).unwrap_err();
        assert!(matches!(err, HubSpotError::MissingToken));
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let config = HubSpotConfig {
            base_url: "not a url".to_string(),
            ..HubSpotConfig::default()
        };
        let err = HubSpotClient::new("pat-na1-token", &config).unwrap_err();
        assert!(matches!(err, HubSpotError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_token_with_newline_rejected() {
        let err = HubSpotClient::new("pat\nna1", &HubSpotConfig::default()).unwrap_err();
        assert!(matches!(err, HubSpotError::InvalidToken));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = HubSpotConfig {
            base_url: "https://api.hubapi.com/".to_string(),
            ..HubSpotConfig::default()
        };
        let client = HubSpotClient::new("pat-na1-token", &config).unwrap();
        assert_eq!(
            client.url("/crm/v3/owners/"),
            "https://api.hubapi.com/crm/v3/owners/"
        );
    }
}
