use thiserror::Error;

/// Result type alias for sku-details operations
pub type Result<T, E = SkuDetailsError> = std::result::Result<T, E>;

/// The call to the billing service could not complete.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Billing service returned status {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    #[error("Billing service disconnected: {0}")]
    Disconnected(String),
}

/// Errors that abort a request before it can produce an outcome
#[derive(Error, Debug)]
pub enum SkuDetailsError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}
