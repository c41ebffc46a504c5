use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::auth::models::NewAccessToken;
use crate::domain::auth::models::NewUser;
use crate::domain::auth::models::ResolvedToken;

/// Post-resolution check applied to a presented token.
///
/// Runs after the token was found and before the verdict is built. An `Err`
/// carries the reason reported to the caller.
#[async_trait]
pub trait TokenValidator: Send + Sync + 'static {
    async fn validate(&self, resolved: &ResolvedToken) -> Result<(), String>;
}

#[async_trait]
impl<F> TokenValidator for F
where
    F: Fn(&ResolvedToken) -> Result<(), String> + Send + Sync + 'static,
{
    async fn validate(&self, resolved: &ResolvedToken) -> Result<(), String> {
        self(resolved)
    }
}

/// Hook run on every new user record before it is persisted.
pub type UserExtension = Arc<dyn Fn(&mut NewUser) + Send + Sync>;

/// Hook run on every new access token record before it is persisted.
pub type AccessTokenExtension = Arc<dyn Fn(&mut NewAccessToken) + Send + Sync>;
