//! Error types for the lead gateway

use thiserror::Error;

/// Main error type for all gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("Phone must be 11 digits starting with 7")]
    InvalidPhone,

    /// Token exchange answered with a non-success status
    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Auth error: no token in response")]
    AuthTokenMissing,

    #[error("User fetch error: {0}")]
    NotFound(String),

    /// Attribute catalog could not be read from any candidate endpoint
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Create-user call failed with something other than a conflict
    #[error("Create user error: {0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl GatewayError {
    /// HTTP status the inbound surface reports for this error
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Validation(_) | GatewayError::InvalidPhone => 400,
            GatewayError::Auth(_) | GatewayError::AuthTokenMissing => 401,
            GatewayError::NotFound(_) => 404,
            GatewayError::ServiceUnavailable(_) | GatewayError::Rejected(_) => 502,
            GatewayError::Config(_)
            | GatewayError::Http(_)
            | GatewayError::Json(_)
            | GatewayError::Transport(_) => 500,
        }
    }

    pub(crate) fn catalog_unavailable() -> Self {
        GatewayError::ServiceUnavailable("Cannot read attributes list from API".to_string())
    }
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
