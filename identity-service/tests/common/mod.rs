use std::collections::HashMap;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::HashParameters;
use identity_service::credentials::errors::CredentialError;
use identity_service::credentials::models::ApiTokenRecord;
use identity_service::credentials::models::NewApiToken;
use identity_service::credentials::models::NewUser;
use identity_service::credentials::models::User;
use identity_service::credentials::models::UserId;
use identity_service::credentials::models::Username;
use identity_service::credentials::ports::ApiTokenRepository;
use identity_service::credentials::ports::UserRepository;
use identity_service::credentials::service::CredentialService;
use tokio::sync::RwLock;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Users kept in memory, keyed by username.
#[derive(Default)]
pub struct InMemoryUserRepository {
    next_id: AtomicI64,
    users: RwLock<HashMap<String, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, CredentialError> {
        let mut users = self.users.write().await;
        if users.contains_key(user.username.as_str()) {
            return Err(CredentialError::UsernameAlreadyExists(
                user.username.to_string(),
            ));
        }

        let created = User {
            id: UserId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            username: user.username,
            password_hash: user.password_hash,
        };
        users.insert(created.username.to_string(), created.clone());

        Ok(created)
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, CredentialError> {
        Ok(self.users.read().await.get(username.as_str()).cloned())
    }
}

/// API token digests kept in memory, keyed by id.
#[derive(Default)]
pub struct InMemoryApiTokenRepository {
    next_id: AtomicI64,
    tokens: RwLock<HashMap<i64, ApiTokenRecord>>,
}

impl InMemoryApiTokenRepository {
    pub async fn all(&self) -> Vec<ApiTokenRecord> {
        self.tokens.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl ApiTokenRepository for InMemoryApiTokenRepository {
    async fn create(&self, token: NewApiToken) -> Result<ApiTokenRecord, CredentialError> {
        let record = ApiTokenRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: token.name,
            short_token: token.short_token,
            token_hash: token.token_hash,
            user_id: token.user_id,
        };
        self.tokens.write().await.insert(record.id, record.clone());

        Ok(record)
    }

    async fn find_by_short_token(
        &self,
        short_token: &str,
    ) -> Result<Option<ApiTokenRecord>, CredentialError> {
        Ok(self
            .tokens
            .read()
            .await
            .values()
            .find(|record| record.short_token == short_token)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ApiTokenRecord>, CredentialError> {
        let mut records: Vec<ApiTokenRecord> = self
            .tokens
            .read()
            .await
            .values()
            .filter(|record| record.user_id == *user_id)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.id);

        Ok(records)
    }

    async fn delete(&self, id: i64, user_id: &UserId) -> Result<(), CredentialError> {
        let mut tokens = self.tokens.write().await;
        match tokens.get(&id) {
            Some(record) if record.user_id == *user_id => {
                tokens.remove(&id);
                Ok(())
            }
            _ => Err(CredentialError::TokenNotFound(id)),
        }
    }
}

/// Credential service wired to in-memory repositories.
pub struct TestApp {
    pub service: Arc<CredentialService<InMemoryUserRepository, InMemoryApiTokenRepository>>,
    pub users: Arc<InMemoryUserRepository>,
    pub tokens: Arc<InMemoryApiTokenRepository>,
    pub authenticator: Arc<Authenticator>,
}

impl TestApp {
    pub fn new() -> Self {
        let authenticator = Arc::new(
            Authenticator::new(TEST_SECRET)
                .with_password_params(HashParameters::new(1024, 1, 1, 16, 32)),
        );
        let users = Arc::new(InMemoryUserRepository::default());
        let tokens = Arc::new(InMemoryApiTokenRepository::default());

        let service = Arc::new(
            CredentialService::new(
                Arc::clone(&users),
                Arc::clone(&tokens),
                Arc::clone(&authenticator),
                4,
            )
            .expect("Failed to build credential service"),
        );

        Self {
            service,
            users,
            tokens,
            authenticator,
        }
    }
}
