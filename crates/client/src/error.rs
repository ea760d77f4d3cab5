/// Failures surfaced by the triage-service client.
///
/// Every variant is non-fatal to the console: callers log or print the
/// message and let the user retry the triggering action.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not signed in, or the session token was rejected")]
    Unauthorized,

    #[error("access denied: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("request rejected: {0}")]
    Validation(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid base URL: {0}")]
    Url(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
