use thiserror::Error;

/// All the ways a lookup can go wrong
#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Cache operation failed: {0}")]
    CacheError(#[from] repofinder_cache::CacheError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<repofinder_api::GitHubError> for Error {
    fn from(err: repofinder_api::GitHubError) -> Self {
        match err {
            e @ repofinder_api::GitHubError::RateLimitExceeded { .. } => {
                Error::RateLimitExceeded(e.to_string())
            }
            other => Error::ApiError(other.to_string()),
        }
    }
}
