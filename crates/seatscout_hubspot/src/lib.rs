//! HubSpot REST sources for seatscout
//!
//! Implements the core source traits against the owners, login history,
//! v1 engagements and CRM object search APIs.

pub mod client;
pub mod error;
pub mod probe;
pub mod wire;

pub use client::HubSpotClient;
pub use error::{HubSpotError, Result};
pub use probe::{ProbeCheck, ProbeOutcome, probe};
