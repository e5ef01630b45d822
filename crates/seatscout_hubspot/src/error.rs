use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum HubSpotError {
    #[error("No HubSpot access token provided")]
    #[diagnostic(
        code(seatscout_hubspot::missing_token),
        help("Set HUBSPOT_API_KEY in the environment or a .env file, or pass --token")
    )]
    MissingToken,

    #[error("HubSpot access token contains characters not allowed in a header")]
    #[diagnostic(
        code(seatscout_hubspot::invalid_token),
        help("Copy the private app token again without surrounding whitespace or quotes")
    )]
    InvalidToken,

    #[error("Invalid HubSpot base URL: {url}")]
    #[diagnostic(
        code(seatscout_hubspot::invalid_base_url),
        help("hubspot.base_url must be an absolute http(s) URL such as https://api.hubapi.com")
    )]
    InvalidBaseUrl {
        url: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to build HTTP client")]
    #[diagnostic(code(seatscout_hubspot::client_build))]
    ClientBuild {
        #[source]
        cause: reqwest::Error,
    },
}

pub type Result<T> = std::result::Result<T, HubSpotError>;
