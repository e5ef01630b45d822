//! Configuration for seat audits
//!
//! Thresholds and seat pricing are explicit value objects handed to the
//! scorer and cost aggregator, loaded from TOML with every field defaulted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    cost::CostModel,
    error::{AuditError, ConfigError, Result},
};

/// Longest inactivity window accepted, about a century
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Highest monthly seat price accepted
pub const MAX_SEAT_PRICE: u64 = 1_000_000;

/// Top-level configuration for an audit run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Inactivity thresholds used by the confidence scorer
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Seat pricing
    #[serde(default)]
    pub cost: CostModel,

    /// HubSpot API settings
    #[serde(default)]
    pub hubspot: HubSpotConfig,

    /// Report output settings
    #[serde(default)]
    pub report: ReportConfig,
}

/// Inactivity windows, all in whole days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// A login at least this old marks a seat as high-confidence inactive
    #[serde(default = "default_login_inactive_days")]
    pub login_inactive_days: i64,

    /// Engagements newer than this count as recent activity
    #[serde(default = "default_engagement_window_days")]
    pub engagement_window_days: i64,

    /// Record modifications newer than this count as recent activity
    #[serde(default = "default_crm_activity_window_days")]
    pub crm_activity_window_days: i64,
}

fn default_login_inactive_days() -> i64 {
    90
}

fn default_engagement_window_days() -> i64 {
    60
}

fn default_crm_activity_window_days() -> i64 {
    30
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            login_inactive_days: default_login_inactive_days(),
            engagement_window_days: default_engagement_window_days(),
            crm_activity_window_days: default_crm_activity_window_days(),
        }
    }
}

/// HubSpot API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubSpotConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// CRM object categories scanned for record modifications
    #[serde(default = "default_object_types")]
    pub object_types: Vec<String>,

    #[serde(default = "default_owners_page_size")]
    pub owners_page_size: u32,

    #[serde(default = "default_login_page_size")]
    pub login_page_size: u32,

    #[serde(default = "default_engagements_page_size")]
    pub engagements_page_size: u32,

    #[serde(default = "default_search_page_size")]
    pub search_page_size: u32,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.hubapi.com".to_string()
}

fn default_object_types() -> Vec<String> {
    vec![
        "contacts".to_string(),
        "deals".to_string(),
        "tickets".to_string(),
    ]
}

fn default_owners_page_size() -> u32 {
    100
}

fn default_login_page_size() -> u32 {
    100
}

fn default_engagements_page_size() -> u32 {
    250
}

fn default_search_page_size() -> u32 {
    100
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for HubSpotConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            object_types: default_object_types(),
            owners_page_size: default_owners_page_size(),
            login_page_size: default_login_page_size(),
            engagements_page_size: default_engagements_page_size(),
            search_page_size: default_search_page_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Report output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Where the CSV report is written
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// Rows listed per console bucket
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("seatscout_report.csv")
}

fn default_top_n() -> usize {
    10
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            top_n: default_top_n(),
        }
    }
}

impl AuditConfig {
    /// Reject values that would make every verdict meaningless
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        for (field, days) in [
            ("thresholds.login_inactive_days", t.login_inactive_days),
            ("thresholds.engagement_window_days", t.engagement_window_days),
            ("thresholds.crm_activity_window_days", t.crm_activity_window_days),
        ] {
            if !(1..=MAX_WINDOW_DAYS).contains(&days) {
                return Err(AuditError::invalid_config(
                    field,
                    format!("between 1 and {MAX_WINDOW_DAYS} days"),
                ));
            }
        }
        if self.cost.seat_price > MAX_SEAT_PRICE {
            return Err(AuditError::invalid_config(
                "cost.seat_price",
                format!("at most {MAX_SEAT_PRICE} per month"),
            ));
        }
        if self.cost.removal_score > 100 {
            return Err(AuditError::invalid_config(
                "cost.removal_score",
                "a score between 0 and 100",
            ));
        }
        if self.hubspot.object_types.iter().any(|t| t.trim().is_empty()) {
            return Err(AuditError::invalid_config(
                "hubspot.object_types",
                "non-empty object type names",
            ));
        }
        Ok(())
    }
}

/// Load configuration from a TOML file
pub async fn load_config(path: &Path) -> Result<AuditConfig> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        AuditError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "file".to_string(),
            expected: "readable TOML file".to_string(),
            cause: ConfigError::Io(e.to_string()),
        }
    })?;

    let mut config: AuditConfig =
        toml::from_str(&content).map_err(|e| AuditError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "content".to_string(),
            expected: "valid TOML configuration".to_string(),
            cause: ConfigError::TomlParse(e.to_string()),
        })?;

    // Relative report paths are relative to the config file
    if config.report.csv_path.is_relative() {
        if let Some(base_dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.report.csv_path = base_dir.join(&config.report.csv_path);
        }
    }

    config.validate().map_err(|e| match e {
        AuditError::ConfigurationError {
            field,
            expected,
            cause,
            ..
        } => AuditError::ConfigurationError {
            config_path: path.display().to_string(),
            field,
            expected,
            cause,
        },
        other => other,
    })?;

    Ok(config)
}

/// Save configuration to a TOML file
pub async fn save_config(config: &AuditConfig, path: &Path) -> Result<()> {
    let content =
        toml::to_string_pretty(config).map_err(|e| AuditError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "config".to_string(),
            expected: "serializable configuration".to_string(),
            cause: ConfigError::TomlSerialize(e.to_string()),
        })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AuditError::ConfigurationError {
                config_path: parent.display().to_string(),
                field: "directory".to_string(),
                expected: "writable directory".to_string(),
                cause: ConfigError::Io(e.to_string()),
            })?;
    }

    tokio::fs::write(path, content)
        .await
        .map_err(|e| AuditError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "file".to_string(),
            expected: "writable file".to_string(),
            cause: ConfigError::Io(e.to_string()),
        })?;

    Ok(())
}

/// Standard config file locations
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // Project-specific config
    paths.push(PathBuf::from("seatscout.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("seatscout").join("config.toml"));
    }

    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".seatscout").join("config.toml"));
    }

    paths
}

/// Load configuration from standard locations
pub async fn load_config_from_standard_locations() -> Result<AuditConfig> {
    for path in config_paths() {
        if path.exists() {
            tracing::debug!(path = %path.display(), "using config file");
            return load_config(&path).await;
        }
    }

    // No config found, return default
    Ok(AuditConfig::default())
}
