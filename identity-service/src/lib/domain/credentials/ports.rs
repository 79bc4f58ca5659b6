use async_trait::async_trait;

use crate::credentials::errors::CredentialError;
use crate::credentials::models::ApiTokenRecord;
use crate::credentials::models::AuthenticatedUser;
use crate::credentials::models::IssuedApiToken;
use crate::credentials::models::NewApiToken;
use crate::credentials::models::NewUser;
use crate::credentials::models::Session;
use crate::credentials::models::SignUpCommand;
use crate::credentials::models::User;
use crate::credentials::models::UserId;
use crate::credentials::models::Username;

/// Port for credential domain service operations.
#[async_trait]
pub trait CredentialServicePort: Send + Sync + 'static {
    /// Register a user and open a session.
    ///
    /// # Errors
    /// * `PasswordMismatch` - Password and confirmation differ
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `Internal` - Hashing or token signing failed
    async fn sign_up(&self, command: SignUpCommand) -> Result<Session, CredentialError>;

    /// Check a username and password and open a session.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown user, wrong password, or unusable stored hash
    /// * `Internal` - Stored hash uses an unsupported version, or signing failed
    async fn sign_in(&self, username: &str, password: &str) -> Result<Session, CredentialError>;

    /// Resolve a session token to the user it was issued for.
    ///
    /// # Errors
    /// * `Unauthorized` - Token is expired, forged or malformed
    async fn authenticate_session(&self, token: &str)
        -> Result<AuthenticatedUser, CredentialError>;

    /// Issue a named API token for a user.
    ///
    /// # Errors
    /// * `InvalidTokenName` - Name is blank
    /// * `Internal` - Random source failed
    /// * `RepositoryError` - Storage failed
    async fn issue_api_token(
        &self,
        user_id: &UserId,
        name: &str,
    ) -> Result<IssuedApiToken, CredentialError>;

    /// Resolve a presented API token to its owner.
    ///
    /// # Errors
    /// * `Unauthorized` - Token is malformed, unknown, or does not match its digest
    async fn authenticate_api_token(
        &self,
        token: &str,
    ) -> Result<AuthenticatedUser, CredentialError>;

    /// List a user's API tokens (digests and short tokens only).
    async fn list_api_tokens(&self, user_id: &UserId)
        -> Result<Vec<ApiTokenRecord>, CredentialError>;

    /// Delete one of a user's API tokens.
    ///
    /// # Errors
    /// * `TokenNotFound` - No token with this id belongs to the user
    async fn revoke_api_token(&self, user_id: &UserId, token_id: i64)
        -> Result<(), CredentialError>;
}

/// Lookup and creation of users.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Returns
    /// Created user with its assigned id
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `RepositoryError` - Storage failed
    async fn create(&self, user: NewUser) -> Result<User, CredentialError>;

    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user (None if not found)
    ///
    /// # Errors
    /// * `RepositoryError` - Storage failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, CredentialError>;
}

/// Storage of API token digests.
#[async_trait]
pub trait ApiTokenRepository: Send + Sync + 'static {
    /// Persist a new token digest.
    async fn create(&self, token: NewApiToken) -> Result<ApiTokenRecord, CredentialError>;

    /// Retrieve a token by its short token.
    async fn find_by_short_token(
        &self,
        short_token: &str,
    ) -> Result<Option<ApiTokenRecord>, CredentialError>;

    /// Retrieve all tokens owned by a user.
    async fn list_for_user(&self, user_id: &UserId)
        -> Result<Vec<ApiTokenRecord>, CredentialError>;

    /// Remove a token owned by a user.
    ///
    /// # Errors
    /// * `TokenNotFound` - No token with this id belongs to the user
    async fn delete(&self, id: i64, user_id: &UserId) -> Result<(), CredentialError>;
}
