use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("provider call timed out")]
    Timeout,
    #[error("unrecognized provider payload: {0}")]
    BadPayload(String),
    #[error("platform not supported")]
    UnsupportedPlatform,
    #[error("no media found")]
    NoMediaFound,
    #[error("other: {0}")]
    Other(String),
}
