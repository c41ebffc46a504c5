use std::collections::HashMap;
use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// Additional persisted attributes attached through model extensions.
pub type Extra = HashMap<String, serde_json::Value>;

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new time-ordered user ID.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Access token unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AccessTokenId(pub Uuid);

impl AccessTokenId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for AccessTokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccessTokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Registered account.
///
/// `password_hash` is None for accounts that cannot sign in with credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub user_name: String,
    pub password_hash: Option<String>,
    pub extra: Extra,
    pub created_at: DateTime<Utc>,
}

/// Issued bearer token. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    pub id: AccessTokenId,
    pub token: String,
    pub user_id: UserId,
    pub extra: Extra,
    pub created_at: DateTime<Utc>,
}

/// Access token joined with its owner, as returned by token lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedToken {
    pub access_token: AccessToken,
    pub user: User,
}

/// User record about to be persisted. The store assigns the identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub user_name: String,
    pub password_hash: Option<String>,
    pub extra: Extra,
}

impl NewUser {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            password_hash: None,
            extra: Extra::new(),
        }
    }
}

/// Access token record about to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccessToken {
    pub token: String,
    pub user_id: UserId,
    pub extra: Extra,
}

impl NewAccessToken {
    pub fn new(token: String, user_id: UserId) -> Self {
        Self {
            token,
            user_id,
            extra: Extra::new(),
        }
    }
}

/// Authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_name: String,
    pub id: UserId,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_name: user.user_name.clone(),
            id: user.id,
        }
    }
}

/// Outcome of an authentication phase.
///
/// An empty verdict (no identity) means the decision is still pending, as in
/// the header phase of the payload-driven schemes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthVerdict {
    pub identity: Option<Identity>,
    pub issued_token: Option<String>,
}

impl AuthVerdict {
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            issued_token: None,
        }
    }

    pub fn with_issued_token(mut self, token: String) -> Self {
        self.issued_token = Some(token);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// True once credentials were checked and a token minted for this request.
    pub fn has_session(&self) -> bool {
        self.identity.is_some() && self.issued_token.is_some()
    }
}
