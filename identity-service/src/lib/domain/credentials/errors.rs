use auth::ApiKeyError;
use auth::JwtError;
use auth::PasswordError;
use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid user id: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error(
        "Username contains invalid characters (only alphanumeric, underscore, and hyphen allowed)"
    )]
    InvalidCharacters,
}

/// Top-level error for credential operations.
///
/// Variants map one-to-one onto responses of the calling HTTP layer:
/// `InvalidCredentials` and `Unauthorized` are authentication failures,
/// `Internal` is a server fault.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("API token name must not be empty")]
    InvalidTokenName,

    // Domain-level errors
    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("API token not found: {0}")]
    TokenNotFound(i64),

    // Infrastructure errors
    #[error("Repository error: {0}")]
    RepositoryError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PasswordError> for CredentialError {
    fn from(err: PasswordError) -> Self {
        match err {
            // A corrupt stored hash must look like a wrong password
            PasswordError::InvalidHash(_) => CredentialError::InvalidCredentials,
            PasswordError::IncompatibleVersion { .. }
            | PasswordError::RandomSource(_)
            | PasswordError::HashingFailed(_) => CredentialError::Internal(err.to_string()),
        }
    }
}

impl From<JwtError> for CredentialError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::SigningFailed(_) => CredentialError::Internal(err.to_string()),
            JwtError::InvalidSignature
            | JwtError::Expired
            | JwtError::MalformedToken(_)
            | JwtError::UnsupportedAlgorithm => CredentialError::Unauthorized,
        }
    }
}

impl From<ApiKeyError> for CredentialError {
    fn from(err: ApiKeyError) -> Self {
        match err {
            ApiKeyError::RandomSource(_) | ApiKeyError::InvalidPrefix(_) => {
                CredentialError::Internal(err.to_string())
            }
            ApiKeyError::MalformedKey | ApiKeyError::UnexpectedPrefix { .. } => {
                CredentialError::Unauthorized
            }
        }
    }
}
