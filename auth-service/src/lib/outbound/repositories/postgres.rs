use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AccessToken;
use crate::domain::auth::models::AccessTokenId;
use crate::domain::auth::models::Extra;
use crate::domain::auth::models::NewAccessToken;
use crate::domain::auth::models::NewUser;
use crate::domain::auth::models::ResolvedToken;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::AccessTokenRepository;
use crate::domain::auth::ports::UserRepository;

const USER_NAME_CONSTRAINT: &str = "users_user_name_key";
const TOKEN_CONSTRAINT: &str = "access_tokens_token_key";

/// PostgreSQL store backing both repositories.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    user_name: String,
    password_hash: Option<String>,
    extra: Json<Extra>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            user_name: row.user_name,
            password_hash: row.password_hash,
            extra: row.extra.0,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct ResolvedTokenRow {
    id: Uuid,
    token: String,
    user_id: Uuid,
    extra: Json<Extra>,
    created_at: DateTime<Utc>,
    user_name: String,
    password_hash: Option<String>,
    user_extra: Json<Extra>,
    user_created_at: DateTime<Utc>,
}

impl From<ResolvedTokenRow> for ResolvedToken {
    fn from(row: ResolvedTokenRow) -> Self {
        Self {
            access_token: AccessToken {
                id: AccessTokenId(row.id),
                token: row.token,
                user_id: UserId(row.user_id),
                extra: row.extra.0,
                created_at: row.created_at,
            },
            user: User {
                id: UserId(row.user_id),
                user_name: row.user_name,
                password_hash: row.password_hash,
                extra: row.user_extra.0,
                created_at: row.user_created_at,
            },
        }
    }
}

fn violates(e: &sqlx::Error, constraint: &str) -> bool {
    e.as_database_error()
        .map(|db_err| db_err.is_unique_violation() && db_err.constraint() == Some(constraint))
        .unwrap_or(false)
}

#[async_trait]
impl UserRepository for PostgresStore {
    async fn find_by_user_name(&self, user_name: &str) -> Result<Option<User>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, user_name, password_hash, extra, created_at
            FROM users
            WHERE user_name = $1
            "#,
        )
        .bind(user_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(row.map(User::from))
    }

    async fn create(&self, user: NewUser) -> Result<User, AuthError> {
        let user = User {
            id: UserId::new(),
            user_name: user.user_name,
            password_hash: user.password_hash,
            extra: user.extra,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, user_name, password_hash, extra, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id.0)
        .bind(&user.user_name)
        .bind(&user.password_hash)
        .bind(Json(&user.extra))
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, USER_NAME_CONSTRAINT) {
                return AuthError::DuplicateUser(user.user_name.clone());
            }
            AuthError::Store(e.to_string())
        })?;

        Ok(user)
    }
}

#[async_trait]
impl AccessTokenRepository for PostgresStore {
    async fn find_by_token(&self, token: &str) -> Result<Option<ResolvedToken>, AuthError> {
        let row = sqlx::query_as::<_, ResolvedTokenRow>(
            r#"
            SELECT t.id, t.token, t.user_id, t.extra, t.created_at,
                   u.user_name, u.password_hash,
                   u.extra AS user_extra, u.created_at AS user_created_at
            FROM access_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(row.map(ResolvedToken::from))
    }

    async fn create(&self, access_token: NewAccessToken) -> Result<AccessToken, AuthError> {
        let access_token = AccessToken {
            id: AccessTokenId::new(),
            token: access_token.token,
            user_id: access_token.user_id,
            extra: access_token.extra,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO access_tokens (id, token, user_id, extra, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(access_token.id.0)
        .bind(&access_token.token)
        .bind(access_token.user_id.0)
        .bind(Json(&access_token.extra))
        .bind(access_token.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, TOKEN_CONSTRAINT) {
                return AuthError::DuplicateToken;
            }
            AuthError::Store(e.to_string())
        })?;

        Ok(access_token)
    }
}
