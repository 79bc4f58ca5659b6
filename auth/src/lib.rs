//! Credential primitives for Linkshelf
//!
//! Provides the stateless building blocks of user and client authentication:
//! - Password hashing (Argon2id, self-describing encoded hashes)
//! - Session token generation and validation (HS512 JWT)
//! - Prefixed API key generation and verification
//! - Authentication coordination
//!
//! None of these types keep mutable state; they are `Send + Sync` and can be
//! shared across threads as is.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::SessionTokenCodec;
//!
//! let codec = SessionTokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let token = codec.generate_token(42, "alice").unwrap();
//! let claims = codec.verify_token(&token).unwrap();
//! assert_eq!(claims.sub, "42");
//! ```
//!
//! ## API Keys
//! ```
//! use auth::ApiKeyIssuer;
//!
//! let issuer = ApiKeyIssuer::new();
//! let key = issuer.issue().unwrap();
//!
//! // Show key.token() once, persist key.short_token() and key.long_token_hash()
//! assert!(issuer.verify(key.token(), key.long_token_hash()));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::Authenticator;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and generate token
//! let result = auth.authenticate("password123", &hash, 42, "alice").unwrap();
//!
//! // Validate token
//! let claims = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(claims.username, "alice");
//! ```

pub mod api_key;
pub mod authenticator;
pub mod jwt;
pub mod password;
mod secure;

// Re-export commonly used items
pub use api_key::ApiKey;
pub use api_key::ApiKeyError;
pub use api_key::ApiKeyIssuer;
pub use api_key::ApiKeyParts;
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::IdentityClaims;
pub use jwt::JwtError;
pub use jwt::SessionTokenCodec;
pub use password::EncodedHash;
pub use password::HashParameters;
pub use password::PasswordError;
pub use password::PasswordHasher;
