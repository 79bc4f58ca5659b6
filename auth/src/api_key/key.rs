//! Prefixed API keys.
//!
//! Key text is `<prefix>_<short>_<long>`: both tokens are base58 encoded
//! random bytes. The short token is a non-secret identifier that can be
//! stored and indexed; the full key is persisted only as its SHA-256 digest.

use std::fmt;

use sha2::Digest;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::errors::ApiKeyError;
use crate::secure::constant_time_eq;
use crate::secure::random_bytes;

/// Product prefix carried by every Linkshelf key.
pub const PREFIX: &str = "lshelf";

const SHORT_TOKEN_BYTES: usize = 8;
const LONG_TOKEN_BYTES: usize = 24;
const SEPARATOR: char = '_';

/// A freshly issued API key.
///
/// The plaintext key is only available on this value; once it is dropped the
/// key cannot be recovered from what is stored.
pub struct ApiKey {
    token: Zeroizing<String>,
    short_token: String,
    long_token_hash: String,
}

impl ApiKey {
    /// Full key text, to be shown to the caller exactly once.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Non-secret lookup and display identifier.
    pub fn short_token(&self) -> &str {
        &self.short_token
    }

    /// Lowercase hex SHA-256 of the full key, the only form to persist.
    pub fn long_token_hash(&self) -> &str {
        &self.long_token_hash
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("token", &"<redacted>")
            .field("short_token", &self.short_token)
            .field("long_token_hash", &self.long_token_hash)
            .finish()
    }
}

/// Components of a presented key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiKeyParts<'a> {
    pub prefix: &'a str,
    pub short_token: &'a str,
    pub long_token: &'a str,
}

/// Issues and checks prefixed API keys.
#[derive(Debug, Clone)]
pub struct ApiKeyIssuer {
    prefix: String,
}

impl ApiKeyIssuer {
    /// Create an issuer using the product [`PREFIX`].
    pub fn new() -> Self {
        Self {
            prefix: PREFIX.to_string(),
        }
    }

    /// Create an issuer with another prefix.
    ///
    /// # Errors
    /// * `InvalidPrefix` - Prefix is empty or not ASCII alphanumeric
    pub fn with_prefix(prefix: impl Into<String>) -> Result<Self, ApiKeyError> {
        let prefix = prefix.into();
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ApiKeyError::InvalidPrefix(prefix));
        }

        Ok(Self { prefix })
    }

    /// Generate a new key.
    ///
    /// # Returns
    /// ApiKey holding the plaintext key, its short token and its digest
    ///
    /// # Errors
    /// * `RandomSource` - The OS entropy source failed
    pub fn issue(&self) -> Result<ApiKey, ApiKeyError> {
        let short_bytes = random_bytes(SHORT_TOKEN_BYTES)
            .map_err(|e| ApiKeyError::RandomSource(e.to_string()))?;
        let long_bytes = Zeroizing::new(
            random_bytes(LONG_TOKEN_BYTES).map_err(|e| ApiKeyError::RandomSource(e.to_string()))?,
        );

        let short_token = bs58::encode(&short_bytes).into_string();
        let long_token = Zeroizing::new(bs58::encode(long_bytes.as_slice()).into_string());

        let token = Zeroizing::new(format!(
            "{}{}{}{}{}",
            self.prefix,
            SEPARATOR,
            short_token,
            SEPARATOR,
            long_token.as_str()
        ));
        let long_token_hash = hash_token(&token);

        Ok(ApiKey {
            token,
            short_token,
            long_token_hash,
        })
    }

    /// Split a presented key into its components.
    ///
    /// # Errors
    /// * `MalformedKey` - Wrong number of segments or tokens of the wrong shape
    /// * `UnexpectedPrefix` - Prefix is not this issuer's
    pub fn parse<'a>(&self, token: &'a str) -> Result<ApiKeyParts<'a>, ApiKeyError> {
        let mut segments = token.split(SEPARATOR);
        let (prefix, short_token, long_token) =
            match (segments.next(), segments.next(), segments.next(), segments.next()) {
                (Some(prefix), Some(short), Some(long), None) => (prefix, short, long),
                _ => return Err(ApiKeyError::MalformedKey),
            };

        if prefix != self.prefix {
            return Err(ApiKeyError::UnexpectedPrefix {
                expected: self.prefix.clone(),
            });
        }

        if !is_base58_of_len(short_token, SHORT_TOKEN_BYTES)
            || !is_base58_of_len(long_token, LONG_TOKEN_BYTES)
        {
            return Err(ApiKeyError::MalformedKey);
        }

        Ok(ApiKeyParts {
            prefix,
            short_token,
            long_token,
        })
    }

    /// Check a presented key against a stored digest.
    ///
    /// Digests are compared in constant time. A stored digest that is not
    /// valid hex never matches.
    pub fn verify(&self, presented: &str, stored_hash: &str) -> bool {
        let Ok(stored) = hex::decode(stored_hash) else {
            return false;
        };

        let computed = Sha256::digest(presented.as_bytes());
        constant_time_eq(computed.as_slice(), &stored)
    }
}

impl Default for ApiKeyIssuer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase hex SHA-256 of a key's text.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn is_base58_of_len(s: &str, len: usize) -> bool {
    matches!(bs58::decode(s).into_vec(), Ok(bytes) if bytes.len() == len)
}
