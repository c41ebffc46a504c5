use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AccessToken;
use crate::domain::auth::models::NewAccessToken;
use crate::domain::auth::models::NewUser;
use crate::domain::auth::models::ResolvedToken;
use crate::domain::auth::models::User;

/// Persistence operations for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Retrieve user by exact user name.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `Store` - Storage operation failed
    async fn find_by_user_name(&self, user_name: &str) -> Result<Option<User>, AuthError>;

    /// Persist new user to storage. The store assigns the identifier.
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `DuplicateUser` - User name is already taken
    /// * `Store` - Storage operation failed
    async fn create(&self, user: NewUser) -> Result<User, AuthError>;
}

/// Persistence operations for access tokens.
#[async_trait]
pub trait AccessTokenRepository: Send + Sync + 'static {
    /// Retrieve access token by exact token string, joined with its owner.
    ///
    /// # Returns
    /// Optional resolved token (None if not found)
    ///
    /// # Errors
    /// * `Store` - Storage operation failed
    async fn find_by_token(&self, token: &str) -> Result<Option<ResolvedToken>, AuthError>;

    /// Persist new access token to storage.
    ///
    /// # Returns
    /// Created access token entity
    ///
    /// # Errors
    /// * `DuplicateToken` - Token string already exists
    /// * `Store` - Storage operation failed
    async fn create(&self, access_token: NewAccessToken) -> Result<AccessToken, AuthError>;
}

/// Handle to the repositories serving the current tenant or connection.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub access_tokens: Arc<dyn AccessTokenRepository>,
}

impl Store {
    pub fn new(
        users: Arc<dyn UserRepository>,
        access_tokens: Arc<dyn AccessTokenRepository>,
    ) -> Self {
        Self {
            users,
            access_tokens,
        }
    }

    /// Build a handle from one backend implementing both repositories.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserRepository + AccessTokenRepository,
    {
        Self {
            users: backend.clone(),
            access_tokens: backend,
        }
    }
}
