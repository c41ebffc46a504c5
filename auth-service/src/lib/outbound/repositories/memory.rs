use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AccessToken;
use crate::domain::auth::models::AccessTokenId;
use crate::domain::auth::models::NewAccessToken;
use crate::domain::auth::models::NewUser;
use crate::domain::auth::models::ResolvedToken;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::AccessTokenRepository;
use crate::domain::auth::ports::UserRepository;

/// Process-local store backing both repositories.
///
/// Enforces the same uniqueness rules as the database: one user per name and
/// one access token per token string. Owners are not checked on token insert;
/// a token whose owner is missing simply never resolves.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<Users>,
    access_tokens: RwLock<HashMap<String, AccessToken>>,
}

/// Users keyed by id, with a name index kept in step under the same lock.
#[derive(Debug, Default)]
struct Users {
    by_id: HashMap<UserId, User>,
    ids_by_name: HashMap<String, UserId>,
}

impl Users {
    fn by_name(&self, user_name: &str) -> Option<&User> {
        self.ids_by_name
            .get(user_name)
            .and_then(|id| self.by_id.get(id))
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, new_user: NewUser) -> Result<User, AuthError> {
        let mut users = self.users.write().await;

        if users.ids_by_name.contains_key(&new_user.user_name) {
            return Err(AuthError::DuplicateUser(new_user.user_name));
        }

        let user = User {
            id: UserId::new(),
            user_name: new_user.user_name,
            password_hash: new_user.password_hash,
            extra: new_user.extra,
            created_at: Utc::now(),
        };
        users.ids_by_name.insert(user.user_name.clone(), user.id);
        users.by_id.insert(user.id, user.clone());

        Ok(user)
    }

    pub async fn insert_access_token(
        &self,
        new_token: NewAccessToken,
    ) -> Result<AccessToken, AuthError> {
        let mut access_tokens = self.access_tokens.write().await;

        if access_tokens.contains_key(&new_token.token) {
            return Err(AuthError::DuplicateToken);
        }

        let access_token = AccessToken {
            id: AccessTokenId::new(),
            token: new_token.token,
            user_id: new_token.user_id,
            extra: new_token.extra,
            created_at: Utc::now(),
        };
        access_tokens.insert(access_token.token.clone(), access_token.clone());

        Ok(access_token)
    }

    pub async fn user(&self, user_name: &str) -> Option<User> {
        self.users.read().await.by_name(user_name).cloned()
    }

    pub async fn access_token(&self, token: &str) -> Option<AccessToken> {
        self.access_tokens.read().await.get(token).cloned()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.by_id.len()
    }

    pub async fn access_token_count(&self) -> usize {
        self.access_tokens.read().await.len()
    }

    /// Token strings issued to `user_id`, oldest first.
    pub async fn tokens_of(&self, user_id: UserId) -> Vec<String> {
        let access_tokens = self.access_tokens.read().await;

        let mut owned: Vec<&AccessToken> = access_tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .collect();
        owned.sort_by_key(|t| (t.created_at, t.id.0));

        owned.into_iter().map(|t| t.token.clone()).collect()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_user_name(&self, user_name: &str) -> Result<Option<User>, AuthError> {
        Ok(self.user(user_name).await)
    }

    async fn create(&self, user: NewUser) -> Result<User, AuthError> {
        self.insert_user(user).await
    }
}

#[async_trait]
impl AccessTokenRepository for InMemoryStore {
    async fn find_by_token(&self, token: &str) -> Result<Option<ResolvedToken>, AuthError> {
        let Some(access_token) = self.access_token(token).await else {
            return Ok(None);
        };

        let owner = self
            .users
            .read()
            .await
            .by_id
            .get(&access_token.user_id)
            .cloned();

        Ok(owner.map(|user| ResolvedToken { access_token, user }))
    }

    async fn create(&self, access_token: NewAccessToken) -> Result<AccessToken, AuthError> {
        self.insert_access_token(access_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_user_names_are_unique() {
        let store = InMemoryStore::new();
        store.insert_user(NewUser::new("alice")).await.unwrap();

        let result = UserRepository::create(&store, NewUser::new("alice")).await;
        assert_eq!(result, Err(AuthError::DuplicateUser("alice".to_string())));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_user_lookup_is_exact() {
        let store = InMemoryStore::new();
        store.insert_user(NewUser::new("alice")).await.unwrap();

        assert!(store.find_by_user_name("alice").await.unwrap().is_some());
        assert!(store.find_by_user_name("Alice").await.unwrap().is_none());
        assert!(store.find_by_user_name("alice ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let store = InMemoryStore::new();
        let user = store.insert_user(NewUser::new("alice")).await.unwrap();

        let token = NewAccessToken::new("abc123".to_string(), user.id);
        store.insert_access_token(token.clone()).await.unwrap();

        let result = AccessTokenRepository::create(&store, token).await;
        assert_eq!(result, Err(AuthError::DuplicateToken));
    }

    #[tokio::test]
    async fn test_find_by_token_joins_owner() {
        let store = InMemoryStore::new();
        let user = store.insert_user(NewUser::new("alice")).await.unwrap();
        store
            .insert_access_token(NewAccessToken::new("abc123".to_string(), user.id))
            .await
            .unwrap();

        let resolved = store.find_by_token("abc123").await.unwrap().unwrap();
        assert_eq!(resolved.user, user);
        assert_eq!(resolved.access_token.user_id, user.id);

        assert!(store.find_by_token("ABC123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_token_picks_owner_among_many_users() {
        let store = InMemoryStore::new();
        let mut users = Vec::new();
        for i in 0..100 {
            let user = store.insert_user(NewUser::new(format!("user{}", i))).await;
            users.push(user.unwrap());
        }
        for user in &users {
            let token = format!("token-of-{}", user.user_name);
            store
                .insert_access_token(NewAccessToken::new(token, user.id))
                .await
                .unwrap();
        }

        for user in &users {
            let token = format!("token-of-{}", user.user_name);
            let resolved = store.find_by_token(&token).await.unwrap().unwrap();
            assert_eq!(&resolved.user, user);
            assert_eq!(store.user(&user.user_name).await.as_ref(), Some(user));
        }
        assert_eq!(store.user_count().await, 100);
    }

    #[tokio::test]
    async fn test_token_without_owner_does_not_resolve() {
        let store = InMemoryStore::new();
        store
            .insert_access_token(NewAccessToken::new("abc123".to_string(), UserId::new()))
            .await
            .unwrap();

        assert!(store.find_by_token("abc123").await.unwrap().is_none());
    }
}
