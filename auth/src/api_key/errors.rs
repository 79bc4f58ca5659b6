use thiserror::Error;

/// Error type for API key operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiKeyError {
    #[error("Random source unavailable: {0}")]
    RandomSource(String),

    #[error("Invalid key prefix '{0}': must be non-empty ASCII alphanumeric")]
    InvalidPrefix(String),

    #[error("API key is malformed")]
    MalformedKey,

    #[error("API key prefix does not match: expected '{expected}'")]
    UnexpectedPrefix { expected: String },
}
