//! Traits implemented by the backing data sources
//!
//! Each source hands out one page at a time; [`paginate`] drives the page
//! loop for every collector.

use std::future::Future;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attribution::EngagementEvent;
use crate::error::SourceError;
use crate::id::{LoginId, OwnerId};
use crate::model::{SeatStatus, User};

/// One page of results plus the cursor for the next page, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    pub fn with_next(items: Vec<T>, next: impl Into<String>) -> Self {
        Self {
            items,
            next: Some(next.into()),
        }
    }
}

/// A login reported by the login-history source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginEvent {
    pub login_id: LoginId,
    /// Missing on malformed rows
    pub logged_in_at: Option<DateTime<Utc>>,
}

/// A CRM record touched since the requested lower bound
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordModification {
    pub owner_id: Option<OwnerId>,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Paginated user/seat listing
#[async_trait]
pub trait SeatSource: Send + Sync {
    async fn fetch_seats(
        &self,
        status: SeatStatus,
        cursor: Option<String>,
    ) -> Result<Page<User>, SourceError>;
}

/// Paginated login history; unavailable on lower account tiers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginSource: Send + Sync {
    async fn fetch_logins(&self, cursor: Option<String>) -> Result<Page<LoginEvent>, SourceError>;
}

/// Paginated engagement log
#[async_trait]
pub trait EngagementSource: Send + Sync {
    async fn fetch_engagements(
        &self,
        cursor: Option<String>,
    ) -> Result<Page<EngagementEvent>, SourceError>;
}

/// Paginated record-modification search for one object category
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_modified(
        &self,
        object_type: &str,
        since: DateTime<Utc>,
        cursor: Option<String>,
    ) -> Result<Page<RecordModification>, SourceError>;
}

/// Drive a page loop to exhaustion, handing each page's items to `on_page`.
///
/// Stops when a page carries no next cursor, or when a source hands back the
/// cursor it was just called with. Returns the number of pages fetched.
pub async fn paginate<T, F, Fut>(
    source_name: &str,
    mut fetch: F,
    mut on_page: impl FnMut(Vec<T>),
) -> Result<usize, SourceError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, SourceError>>,
{
    let mut cursor: Option<String> = None;
    let mut pages = 0;

    loop {
        let page = fetch(cursor.clone()).await?;
        pages += 1;
        on_page(page.items);

        match page.next {
            Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                tracing::warn!(source = source_name, cursor = %next, "source repeated its cursor, stopping");
                break;
            }
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    tracing::debug!(source = source_name, pages, "pagination complete");
    Ok(pages)
}
