use argon2::Algorithm;
use argon2::Argon2;
use argon2::Version;
use zeroize::Zeroizing;

use super::encoded::EncodedHash;
use super::encoded::VERSION;
use super::errors::PasswordError;
use super::params::HashParameters;
use crate::secure::constant_time_eq;
use crate::secure::random_bytes;

/// Password hashing implementation.
///
/// Derives Argon2id keys and stores them as [`EncodedHash`] strings. The
/// configured parameters apply to new hashes only.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: HashParameters,
}

impl PasswordHasher {
    /// Create a new password hasher instance.
    ///
    /// # Returns
    /// PasswordHasher instance configured with [`HashParameters::default`]
    pub fn new() -> Self {
        Self::with_params(HashParameters::default())
    }

    /// Create a password hasher that derives new hashes with `params`.
    pub fn with_params(params: HashParameters) -> Self {
        Self { params }
    }

    /// Hash a plaintext password securely.
    ///
    /// Uses Argon2id with a fresh random salt of `salt_length` bytes.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// Encoded hash string (includes algorithm, version, parameters, salt, and key)
    ///
    /// # Errors
    /// * `RandomSource` - The OS entropy source failed
    /// * `HashingFailed` - Argon2 rejected the configured parameters
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = random_bytes(self.params.salt_length as usize)
            .map_err(|e| PasswordError::RandomSource(e.to_string()))?;

        let key = derive_key(password.as_bytes(), &salt, &self.params)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        let encoded = EncodedHash {
            version: VERSION,
            params: self.params,
            salt,
            key: key.to_vec(),
        };

        Ok(encoded.to_string())
    }

    /// Verify a password against a stored hash.
    ///
    /// The key is re-derived with the parameters embedded in `encoded_hash`,
    /// then compared in constant time.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `encoded_hash` - Stored hash in encoded form
    ///
    /// # Returns
    /// True if password matches, false otherwise
    ///
    /// # Errors
    /// * `InvalidHash` - Hash is malformed or carries unusable parameters
    /// * `IncompatibleVersion` - Hash was produced by another Argon2 version
    pub fn verify(&self, password: &str, encoded_hash: &str) -> Result<bool, PasswordError> {
        let stored: EncodedHash = encoded_hash.parse()?;

        let candidate = derive_key(password.as_bytes(), &stored.salt, &stored.params)
            .map_err(|e| PasswordError::InvalidHash(format!("unusable parameters: {}", e)))?;

        Ok(constant_time_eq(&candidate, &stored.key))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

fn derive_key(
    password: &[u8],
    salt: &[u8],
    params: &HashParameters,
) -> Result<Zeroizing<Vec<u8>>, argon2::Error> {
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.to_argon2()?);

    let mut key = Zeroizing::new(vec![0u8; params.key_length as usize]);
    argon2.hash_password_into(password, salt, key.as_mut_slice())?;

    Ok(key)
}
