use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Random source unavailable: {0}")]
    RandomSource(String),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("The encoded hash is not in the correct format: {0}")]
    InvalidHash(String),

    #[error("Incompatible argon2 version: expected {expected}, found {found}")]
    IncompatibleVersion { expected: u32, found: u32 },
}
