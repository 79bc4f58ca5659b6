use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;

use super::claims::IdentityClaims;
use super::errors::JwtError;

/// Default session lifetime.
pub const DEFAULT_LIFETIME_HOURS: i64 = 24;

/// Algorithm used for every token this codec issues.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS512;

/// Algorithms accepted on verification: the HMAC family only.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Names of [`ACCEPTED_ALGORITHMS`] as they appear in a token header.
const ACCEPTED_ALGORITHM_NAMES: [&str; 3] = ["HS256", "HS384", "HS512"];

/// The part of a token header checked before any decoding.
#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Session token codec for issuing and verifying identity tokens.
///
/// Holds the signing secret for its whole lifetime; construct it once at
/// startup and share it. Tokens are signed with HS512.
pub struct SessionTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl SessionTokenCodec {
    /// Create a new codec with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// SessionTokenCodec issuing tokens valid for 24 hours
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime: Duration::hours(DEFAULT_LIFETIME_HOURS),
        }
    }

    /// Override the lifetime of issued tokens.
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Issue a token for a user, valid from now.
    ///
    /// # Arguments
    /// * `user_id` - Numeric user id, carried as `sub`
    /// * `username` - Username, carried as `username`
    ///
    /// # Returns
    /// Compact `header.payload.signature` token
    ///
    /// # Errors
    /// * `SigningFailed` - Token encoding failed
    pub fn generate_token(&self, user_id: i64, username: &str) -> Result<String, JwtError> {
        self.generate_token_at(user_id, username, Utc::now())
    }

    /// Issue a token as if it were issued at `issued_at`.
    pub fn generate_token_at(
        &self,
        user_id: i64,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = IdentityClaims::new(user_id, username, issued_at, self.lifetime)?;
        let header = Header::new(SIGNING_ALGORITHM);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::SigningFailed(e.to_string()))
    }

    /// Decode and validate a token.
    ///
    /// # Arguments
    /// * `token` - Compact token string
    ///
    /// # Returns
    /// Decoded identity claims. `sub` is the authoritative user id.
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - Header names an algorithm outside the HMAC family
    /// * `InvalidSignature` - MAC does not match
    /// * `Expired` - `exp` is in the past
    /// * `MalformedToken` - Token structure or claims are invalid
    pub fn verify_token(&self, token: &str) -> Result<IdentityClaims, JwtError> {
        check_algorithm(token)?;

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data =
            decode::<IdentityClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                    ErrorKind::ExpiredSignature => JwtError::Expired,
                    ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                        JwtError::UnsupportedAlgorithm
                    }
                    _ => JwtError::MalformedToken(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

/// Reject any header whose `alg` is not an HMAC algorithm, including names
/// such as `none` that the decoder would otherwise report as malformed JSON.
fn check_algorithm(token: &str) -> Result<(), JwtError> {
    let (encoded, _) = token
        .split_once('.')
        .ok_or_else(|| JwtError::MalformedToken("Token has no header segment".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|e| JwtError::MalformedToken(format!("Header is not base64url: {}", e)))?;
    let header: RawHeader = serde_json::from_slice(&bytes)
        .map_err(|e| JwtError::MalformedToken(format!("Header is not valid JSON: {}", e)))?;

    if ACCEPTED_ALGORITHM_NAMES.contains(&header.alg.as_str()) {
        Ok(())
    } else {
        Err(JwtError::UnsupportedAlgorithm)
    }
}
