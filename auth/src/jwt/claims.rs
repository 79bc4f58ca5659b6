use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Identity asserted by a session token.
///
/// Standard `sub`, `iat` and `exp` claims plus the `username` custom claim.
/// Built at sign-in, rebuilt from the token on every authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityClaims {
    /// Subject (stringified numeric user id)
    pub sub: String,

    /// Username at the time of issue
    pub username: String,

    /// Issued at (Unix timestamp), 0 when the token carries none
    #[serde(default)]
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl IdentityClaims {
    /// Create claims for a user.
    ///
    /// # Arguments
    /// * `user_id` - Numeric user identifier (stored as `sub`)
    /// * `username` - Username (stored as `username`)
    /// * `issued_at` - Issue instant
    /// * `lifetime` - Time until expiry
    ///
    /// # Returns
    /// Claims with sub, username, iat, and exp set
    ///
    /// # Errors
    /// * `SigningFailed` - The expiry falls outside the representable range
    pub fn new(
        user_id: i64,
        username: impl Into<String>,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, JwtError> {
        let expires_at = issued_at.checked_add_signed(lifetime).ok_or_else(|| {
            JwtError::SigningFailed(format!("Token lifetime {} is out of range", lifetime))
        })?;

        Ok(Self {
            sub: user_id.to_string(),
            username: username.into(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }
}
