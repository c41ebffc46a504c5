use async_trait::async_trait;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AuthVerdict;
use crate::domain::auth::request::AuthRequest;

pub mod signin;
pub mod signup;
pub mod token;

pub use signin::SigninScheme;
pub use signup::SignupScheme;
pub use token::TokenScheme;
pub use token::TokenSchemeConfig;

/// One authentication protocol.
///
/// `authenticate` sees only what arrives before the body (headers, query).
/// `payload` runs once the structured body is available and may complete the
/// verdict stored on the request.
#[async_trait]
pub trait AuthScheme: Send + Sync {
    fn name(&self) -> &'static str;

    async fn authenticate(&self, request: &AuthRequest) -> Result<AuthVerdict, AuthError>;

    async fn payload(&self, _request: &mut AuthRequest) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Payload field names used by the credential schemes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialFields {
    pub user_name: String,
    pub password: String,
    pub repeat_password: String,
}

impl Default for CredentialFields {
    fn default() -> Self {
        Self {
            user_name: "username".to_string(),
            password: "password".to_string(),
            repeat_password: "repeatPassword".to_string(),
        }
    }
}
