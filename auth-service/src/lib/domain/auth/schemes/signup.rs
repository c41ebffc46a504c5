use std::sync::Arc;

use async_trait::async_trait;

use super::AuthScheme;
use super::CredentialFields;
use crate::domain::auth::engine::AuthEngine;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AuthVerdict;
use crate::domain::auth::request::AuthRequest;

/// Credential sign-up.
///
/// Nothing can be decided before the body is read, so all the work happens in
/// the payload phase: create the account, set its password, mint a token.
pub struct SignupScheme {
    engine: Arc<AuthEngine>,
    fields: CredentialFields,
}

impl SignupScheme {
    pub fn new(engine: Arc<AuthEngine>, fields: CredentialFields) -> Self {
        Self { engine, fields }
    }
}

#[async_trait]
impl AuthScheme for SignupScheme {
    fn name(&self) -> &'static str {
        "signup"
    }

    async fn authenticate(&self, _request: &AuthRequest) -> Result<AuthVerdict, AuthError> {
        Ok(AuthVerdict::pending())
    }

    async fn payload(&self, request: &mut AuthRequest) -> Result<(), AuthError> {
        let user_name = request.payload_str(&self.fields.user_name);
        let password = request.payload_str(&self.fields.password);
        let repeat_password = request.payload_str(&self.fields.repeat_password);

        let (Some(user_name), Some(password), Some(repeat_password)) =
            (user_name, password, repeat_password)
        else {
            return Err(AuthError::BadRequest(format!(
                "{}, {} and {} are required",
                self.fields.user_name, self.fields.password, self.fields.repeat_password
            )));
        };

        if repeat_password != password {
            return Err(AuthError::PasswordMismatch);
        }

        let store = request.store.as_ref().ok_or_else(AuthError::missing_store)?;

        let verdict = self.engine.sign_up(store, user_name, password).await?;

        request.auth = verdict;
        Ok(())
    }
}
