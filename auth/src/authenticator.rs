use chrono::Duration;

use crate::api_key::ApiKey;
use crate::api_key::ApiKeyError;
use crate::api_key::ApiKeyIssuer;
use crate::api_key::ApiKeyParts;
use crate::jwt::IdentityClaims;
use crate::jwt::JwtError;
use crate::jwt::SessionTokenCodec;
use crate::password::HashParameters;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Credential service combining password hashing, session tokens and API keys.
///
/// Owns the signing secret; build one at startup and share it behind an `Arc`.
/// Every operation takes `&self` and keeps no per-call state.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: SessionTokenCodec,
    api_key_issuer: ApiKeyIssuer,
}

/// Result of successful authentication.
pub struct AuthenticationResult {
    /// Session token for the authenticated user
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for session token signing
    ///
    /// # Returns
    /// Authenticator with default hash parameters and 24 hour sessions
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_codec: SessionTokenCodec::new(jwt_secret),
            api_key_issuer: ApiKeyIssuer::new(),
        }
    }

    /// Use `params` for newly hashed passwords.
    pub fn with_password_params(mut self, params: HashParameters) -> Self {
        self.password_hasher = PasswordHasher::with_params(params);
        self
    }

    /// Use `lifetime` for newly issued session tokens.
    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_codec = self.token_codec.with_lifetime(lifetime);
        self
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against a stored hash.
    ///
    /// # Errors
    /// * `PasswordError` - Stored hash is malformed or of another version
    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and generate a session token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `user_id` - Id of the user owning `stored_hash`
    /// * `username` - Username of that user
    ///
    /// # Returns
    /// AuthenticationResult with access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: i64,
        username: &str,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.token_codec.generate_token(user_id, username)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Generate a session token without password verification.
    ///
    /// Used right after sign-up, when the password was just hashed.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn generate_token(&self, user_id: i64, username: &str) -> Result<String, JwtError> {
        self.token_codec.generate_token(user_id, username)
    }

    /// Validate and decode a session token.
    ///
    /// # Errors
    /// * `JwtError` - Token validation or decoding failed
    pub fn validate_token(&self, token: &str) -> Result<IdentityClaims, JwtError> {
        self.token_codec.verify_token(token)
    }

    /// Issue a new API key.
    ///
    /// # Errors
    /// * `ApiKeyError` - Random source failed
    pub fn issue_api_key(&self) -> Result<ApiKey, ApiKeyError> {
        self.api_key_issuer.issue()
    }

    /// Split a presented API key into its components.
    ///
    /// # Errors
    /// * `ApiKeyError` - Key is malformed or carries another prefix
    pub fn parse_api_key<'a>(&self, token: &'a str) -> Result<ApiKeyParts<'a>, ApiKeyError> {
        self.api_key_issuer.parse(token)
    }

    /// Check a presented API key against its stored digest.
    pub fn verify_api_key(&self, token: &str, stored_hash: &str) -> bool {
        self.api_key_issuer.verify(token, stored_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> Authenticator {
        Authenticator::new(b"test_secret_key_at_least_32_bytes!")
            .with_password_params(HashParameters::new(1024, 1, 1, 16, 32))
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = authenticator();

        // Hash a password
        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        // Authenticate with correct password
        let result = authenticator
            .authenticate(password, &hash, 42, "alice")
            .expect("Authentication failed");

        assert!(!result.access_token.is_empty());

        // Validate the token
        let decoded = authenticator
            .validate_token(&result.access_token)
            .expect("Token validation failed");
        assert_eq!(decoded.sub, "42");
        assert_eq!(decoded.username, "alice");
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        // Try with wrong password
        let result = authenticator.authenticate("wrong_password", &hash, 42, "alice");
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_malformed_hash() {
        let authenticator = authenticator();

        let result = authenticator.authenticate("my_password", "$argon2id$v=19", 42, "alice");
        assert!(matches!(
            result,
            Err(AuthenticationError::PasswordError(PasswordError::InvalidHash(_)))
        ));
    }

    #[test]
    fn test_token_lifetime_override() {
        let authenticator = authenticator().with_token_lifetime(Duration::hours(1));

        let token = authenticator
            .generate_token(7, "bob")
            .expect("Failed to generate token");
        let claims = authenticator
            .validate_token(&token)
            .expect("Failed to validate token");
        assert_eq!(claims.exp - claims.iat, 60 * 60);
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = authenticator();

        let result = authenticator.validate_token("invalid.token.here");
        assert!(result.is_err());
    }

    #[test]
    fn test_api_key_round_trip() {
        let authenticator = authenticator();

        let key = authenticator.issue_api_key().expect("Failed to issue key");
        let parts = authenticator
            .parse_api_key(key.token())
            .expect("Failed to parse key");

        assert_eq!(parts.short_token, key.short_token());
        assert!(authenticator.verify_api_key(key.token(), key.long_token_hash()));
        assert!(!authenticator.verify_api_key("lshelf_x_y", key.long_token_hash()));
    }
}
