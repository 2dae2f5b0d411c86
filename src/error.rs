//! Error types for Haggle

use thiserror::Error;

/// Main error type for Haggle
#[derive(Error, Debug)]
pub enum HaggleError {
    // Language model service errors
    #[error("Service request failed: {0}")]
    ServiceRequest(String),

    #[error("Service returned {status}: {body}")]
    ServiceStatus { status: u16, body: String },

    #[error("Malformed service response: {0}")]
    MalformedResponse(String),

    // Game state errors
    #[error("Invalid negotiation state transition: {0}")]
    InvalidStateTransition(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing configuration field: {0}")]
    MissingConfig(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl HaggleError {
    /// True for failures of the language model service, which callers
    /// recover from with a fallback value
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            HaggleError::ServiceRequest(_)
                | HaggleError::ServiceStatus { .. }
                | HaggleError::MalformedResponse(_)
                | HaggleError::Http(_)
                | HaggleError::Json(_)
        )
    }
}

/// Result type alias for Haggle operations
pub type Result<T> = std::result::Result<T, HaggleError>;
