//! Seatscout Core - activity attribution and seat confidence scoring
//!
//! This crate merges login, engagement and record-modification activity onto
//! a single owner identifier space, scores each licensed seat for how likely
//! it is to be unused, and prices the result. Fetching data is left to the
//! [`source`] traits; nothing here performs network I/O.

pub mod activity;
pub mod attribution;
pub mod collectors;
pub mod config;
pub mod cost;
pub mod error;
pub mod id;
pub mod identity;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod source;

pub use activity::{ActivityLedger, ActivitySignals, ActivityView, LoginHistory};
pub use attribution::{Attribution, AttributionMethod, EngagementEvent, attribute};
pub use collectors::{Collected, EngagementStats};
pub use config::{AuditConfig, Thresholds};
pub use cost::CostModel;
pub use error::{AuditError, Result, SourceError};
pub use id::{LoginId, OwnerId};
pub use identity::IdentityMap;
pub use model::{
    ActivityRecord, ActivitySource, ConfidenceVerdict, SeatCostEstimate, SeatState, SeatStatus,
    Tier, User,
};
pub use pipeline::{AuditSources, Auditor};
pub use report::{AuditReport, DataQuality, ReportAssembler, Summary};
pub use scoring::ConfidenceScorer;
pub use source::{
    EngagementSource, LoginEvent, LoginSource, Page, RecordModification, RecordSource, SeatSource,
};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        AuditConfig, AuditError, AuditReport, AuditSources, Auditor, ConfidenceScorer,
        ConfidenceVerdict, CostModel, LoginId, OwnerId, Result, SeatCostEstimate, Thresholds,
        Tier, User,
    };
}
