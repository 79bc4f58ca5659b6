use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::PasswordError;
use tokio::sync::Semaphore;

use crate::credentials::errors::CredentialError;
use crate::credentials::models::ApiTokenRecord;
use crate::credentials::models::AuthenticatedUser;
use crate::credentials::models::Credential;
use crate::credentials::models::IssuedApiToken;
use crate::credentials::models::NewApiToken;
use crate::credentials::models::NewUser;
use crate::credentials::models::Session;
use crate::credentials::models::SignUpCommand;
use crate::credentials::models::User;
use crate::credentials::models::UserId;
use crate::credentials::models::Username;
use crate::credentials::ports::ApiTokenRepository;
use crate::credentials::ports::CredentialServicePort;
use crate::credentials::ports::UserRepository;

/// Stored digest compared against when a key's short token is unknown.
const UNKNOWN_TOKEN_DIGEST: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Domain service implementation for credential operations.
///
/// Argon2 work runs on the blocking pool, at most `max_concurrent_hashes`
/// derivations at a time; each one allocates the configured memory cost.
pub struct CredentialService<UR, TR>
where
    UR: UserRepository,
    TR: ApiTokenRepository,
{
    users: Arc<UR>,
    tokens: Arc<TR>,
    authenticator: Arc<Authenticator>,
    hashing_permits: Semaphore,
    decoy_hash: String,
}

impl<UR, TR> CredentialService<UR, TR>
where
    UR: UserRepository,
    TR: ApiTokenRepository,
{
    /// Create a new credential service with injected dependencies.
    ///
    /// # Arguments
    /// * `users` - User persistence implementation
    /// * `tokens` - API token persistence implementation
    /// * `authenticator` - Credential primitives holding the signing secret
    /// * `max_concurrent_hashes` - Upper bound on simultaneous Argon2 derivations
    ///
    /// # Errors
    /// * `Internal` - The decoy hash used for unknown users could not be derived
    pub fn new(
        users: Arc<UR>,
        tokens: Arc<TR>,
        authenticator: Arc<Authenticator>,
        max_concurrent_hashes: usize,
    ) -> Result<Self, CredentialError> {
        // Unknown usernames are verified against this so they cost as much as real ones
        let decoy_hash = authenticator.hash_password("linkshelf-decoy-password")?;

        Ok(Self {
            users,
            tokens,
            authenticator,
            hashing_permits: Semaphore::new(max_concurrent_hashes.max(1)),
            decoy_hash,
        })
    }

    async fn run_hashing<T, F>(&self, job: F) -> Result<T, CredentialError>
    where
        F: FnOnce(&Authenticator) -> T + Send + 'static,
        T: Send + 'static,
    {
        let _permit = self
            .hashing_permits
            .acquire()
            .await
            .map_err(|e| CredentialError::Internal(e.to_string()))?;

        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || job(&authenticator))
            .await
            .map_err(|e| CredentialError::Internal(format!("Hashing task failed: {}", e)))
    }

    fn open_session(&self, user: User) -> Result<Session, CredentialError> {
        let token = self
            .authenticator
            .generate_token(user.id.0, user.username.as_str())?;

        Ok(Session {
            user_id: user.id,
            username: user.username,
            token,
        })
    }
}

#[async_trait]
impl<UR, TR> CredentialServicePort for CredentialService<UR, TR>
where
    UR: UserRepository,
    TR: ApiTokenRepository,
{
    async fn sign_up(&self, command: SignUpCommand) -> Result<Session, CredentialError> {
        if command.password != command.password_confirm {
            return Err(CredentialError::PasswordMismatch);
        }

        let password = command.password;
        let password_hash = self
            .run_hashing(move |authenticator| authenticator.hash_password(&password))
            .await?
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing failed");
                CredentialError::from(e)
            })?;

        let user = self
            .users
            .create(NewUser {
                username: command.username,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

        self.open_session(user)
    }

    async fn sign_in(&self, username: &str, password: &str) -> Result<Session, CredentialError> {
        let user = match Username::new(username.to_string()) {
            Ok(username) => self.users.find_by_username(&username).await?,
            Err(_) => None,
        };

        let password = password.to_string();
        let Some(user) = user else {
            // Only run so an unknown username costs as much as a wrong password
            let decoy_hash = self.decoy_hash.clone();
            let _decoy = self
                .run_hashing(move |authenticator| {
                    authenticator.verify_password(&password, &decoy_hash)
                })
                .await?;

            tracing::warn!("Sign-in rejected: unknown username");
            return Err(CredentialError::InvalidCredentials);
        };

        let stored_hash = user.password_hash.clone();
        let verified = self
            .run_hashing(move |authenticator| {
                authenticator.verify_password(&password, &stored_hash)
            })
            .await?;

        match verified {
            Ok(true) => {
                tracing::info!(user_id = %user.id, "User signed in");
                self.open_session(user)
            }
            Ok(false) => {
                tracing::warn!(user_id = %user.id, "Sign-in rejected: wrong password");
                Err(CredentialError::InvalidCredentials)
            }
            Err(e @ PasswordError::InvalidHash(_)) => {
                tracing::error!(
                    user_id = %user.id,
                    error = %e,
                    "Stored password hash is malformed"
                );
                Err(CredentialError::from(e))
            }
            Err(e) => {
                tracing::error!(
                    user_id = %user.id,
                    error = %e,
                    "Stored password hash cannot be verified"
                );
                Err(CredentialError::from(e))
            }
        }
    }

    async fn authenticate_session(
        &self,
        token: &str,
    ) -> Result<AuthenticatedUser, CredentialError> {
        let claims = self.authenticator.validate_token(token).map_err(|e| {
            tracing::warn!("Session token validation failed: {}", e);
            CredentialError::from(e)
        })?;

        let user_id = UserId::from_subject(&claims.sub).map_err(|e| {
            tracing::error!("Failed to parse user ID from token: {}", e);
            CredentialError::Unauthorized
        })?;

        Ok(AuthenticatedUser {
            user_id,
            credential: Credential::Session {
                username: claims.username,
            },
        })
    }

    async fn issue_api_token(
        &self,
        user_id: &UserId,
        name: &str,
    ) -> Result<IssuedApiToken, CredentialError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CredentialError::InvalidTokenName);
        }

        let key = self.authenticator.issue_api_key().map_err(|e| {
            tracing::error!(error = %e, "API key generation failed");
            CredentialError::from(e)
        })?;

        let record = self
            .tokens
            .create(NewApiToken {
                name: name.to_string(),
                short_token: key.short_token().to_string(),
                token_hash: key.long_token_hash().to_string(),
                user_id: *user_id,
            })
            .await?;

        tracing::info!(
            user_id = %user_id,
            token_id = record.id,
            short_token = %record.short_token,
            "API token issued"
        );

        Ok(IssuedApiToken {
            token: key.token().to_string(),
            record,
        })
    }

    async fn authenticate_api_token(
        &self,
        token: &str,
    ) -> Result<AuthenticatedUser, CredentialError> {
        let parts = self.authenticator.parse_api_key(token).map_err(|e| {
            tracing::warn!("API token rejected: {}", e);
            CredentialError::from(e)
        })?;

        let Some(record) = self.tokens.find_by_short_token(parts.short_token).await? else {
            // Digest the presented key anyway so unknown and mismatched keys cost the same
            let _decoy = self.authenticator.verify_api_key(token, UNKNOWN_TOKEN_DIGEST);

            tracing::warn!(short_token = %parts.short_token, "API token rejected: unknown");
            return Err(CredentialError::Unauthorized);
        };

        if !self.authenticator.verify_api_key(token, &record.token_hash) {
            tracing::warn!(token_id = record.id, "API token rejected: digest mismatch");
            return Err(CredentialError::Unauthorized);
        }

        Ok(AuthenticatedUser {
            user_id: record.user_id,
            credential: Credential::ApiToken {
                token_id: record.id,
            },
        })
    }

    async fn list_api_tokens(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ApiTokenRecord>, CredentialError> {
        self.tokens.list_for_user(user_id).await
    }

    async fn revoke_api_token(
        &self,
        user_id: &UserId,
        token_id: i64,
    ) -> Result<(), CredentialError> {
        self.tokens.delete(token_id, user_id).await?;

        tracing::info!(user_id = %user_id, token_id, "API token revoked");

        Ok(())
    }
}
