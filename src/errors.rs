use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("No authenticated session")]
    NoSession,

    #[error("No matching row found")]
    NotFound,

    /// Faults reported by the tabular store, carried verbatim.
    #[error("{0}")]
    StoreError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to decode row: {0}")]
    DecodeError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        GatewayError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        GatewayError::DecodeError(error.to_string())
    }
}
