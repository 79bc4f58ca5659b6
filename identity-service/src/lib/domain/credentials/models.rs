use std::fmt;

use crate::credentials::errors::UserIdError;
use crate::credentials::errors::UsernameError;

/// Registered user as seen by the credential subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub password_hash: String,
}

/// User to be persisted; the repository assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub password_hash: String,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl UserId {
    /// Parse a user ID from a token subject.
    ///
    /// # Arguments
    /// * `subject` - Decimal user id string
    ///
    /// # Returns
    /// Parsed UserId
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a decimal integer
    pub fn from_subject(subject: &str) -> Result<Self, UserIdError> {
        subject
            .parse::<i64>()
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 3-32 characters and contains only alphanumeric, underscore, and hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 32;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 32 characters
    /// * `InvalidCharacters` - Contains non-alphanumeric characters (except _ and -)
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command for registering a new user.
#[derive(Clone)]
pub struct SignUpCommand {
    pub username: Username,
    pub password: String,
    pub password_confirm: String,
}

/// Signed-in user together with a fresh session token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: UserId,
    pub username: Username,
    pub token: String,
}

/// How a request proved its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Session token; carries the username claim
    Session { username: String },

    /// Stored API token, by record id
    ApiToken { token_id: i64 },
}

/// Identity established for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub credential: Credential,
}

/// Stored API token. Holds the digest of the key, never the key itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiTokenRecord {
    pub id: i64,
    pub name: String,
    pub short_token: String,
    pub token_hash: String,
    pub user_id: UserId,
}

/// API token to be persisted; the repository assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApiToken {
    pub name: String,
    pub short_token: String,
    pub token_hash: String,
    pub user_id: UserId,
}

/// Newly issued API token: the plaintext key is returned once, here.
#[derive(Clone)]
pub struct IssuedApiToken {
    pub token: String,
    pub record: ApiTokenRecord,
}

impl fmt::Debug for IssuedApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedApiToken")
            .field("token", &"<redacted>")
            .field("record", &self.record)
            .finish()
    }
}
