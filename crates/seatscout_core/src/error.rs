use miette::Diagnostic;
use thiserror::Error;

/// Failure reported by an activity or seat source at the collector boundary.
///
/// None of these abort an audit on their own: collectors log them and
/// degrade to an empty mapping flagged as unavailable.
#[derive(Error, Diagnostic, Debug)]
pub enum SourceError {
    #[error("{source_name} is not available")]
    #[diagnostic(
        code(seatscout_core::source_unavailable),
        help(
            "The token lacks the scope for {source_name} or the account tier does not include it (status {status})"
        )
    )]
    Unavailable { source_name: String, status: u16 },

    #[error("{source_name} request failed with status {status}")]
    #[diagnostic(code(seatscout_core::source_http), help("Response body: {body}"))]
    Http {
        source_name: String,
        status: u16,
        body: String,
    },

    #[error("{source_name} request failed")]
    #[diagnostic(
        code(seatscout_core::source_transport),
        help("Check network connectivity and the configured base URL")
    )]
    Transport {
        source_name: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{source_name} returned a response that could not be decoded")]
    #[diagnostic(
        code(seatscout_core::source_decode),
        help("The API response shape may have changed")
    )]
    Decode {
        source_name: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl SourceError {
    pub fn source_name(&self) -> &str {
        match self {
            Self::Unavailable { source_name, .. }
            | Self::Http { source_name, .. }
            | Self::Transport { source_name, .. }
            | Self::Decode { source_name, .. } => source_name,
        }
    }

    /// Permission or tier restriction, as opposed to a broken request
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(String),

    #[error("Invalid value: {0}")]
    Invalid(String),
}

#[derive(Error, Diagnostic, Debug)]
pub enum AuditError {
    #[error("Configuration error")]
    #[diagnostic(
        code(seatscout_core::configuration_error),
        help("Check configuration file at {config_path}: expected {expected} for '{field}'")
    )]
    ConfigurationError {
        config_path: String,
        field: String,
        expected: String,
        #[source]
        cause: ConfigError,
    },

    #[error("Seat listing could not be fetched")]
    #[diagnostic(
        code(seatscout_core::seat_listing_failed),
        help("An audit needs the full user list; check the token has the owners read scope")
    )]
    SeatListingFailed {
        #[source]
        cause: SourceError,
    },

    #[error("Failed to write report")]
    #[diagnostic(
        code(seatscout_core::report_write_failed),
        help("Check that {path} is writable")
    )]
    ReportWriteFailed {
        path: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type Result<T> = std::result::Result<T, AuditError>;

impl AuditError {
    pub fn invalid_config(field: impl Into<String>, expected: impl Into<String>) -> Self {
        let field = field.into();
        let expected = expected.into();
        Self::ConfigurationError {
            config_path: "<in memory>".to_string(),
            cause: ConfigError::Invalid(format!("{} must be {}", field, expected)),
            field,
            expected,
        }
    }

    pub fn report_write(
        path: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ReportWriteFailed {
            path: path.into(),
            cause: Box::new(cause),
        }
    }
}
