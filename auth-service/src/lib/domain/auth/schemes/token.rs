use std::sync::Arc;

use async_trait::async_trait;

use super::AuthScheme;
use crate::domain::auth::engine::AuthEngine;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::hooks::TokenValidator;
use crate::domain::auth::models::AuthVerdict;
use crate::domain::auth::models::Identity;
use crate::domain::auth::request::AuthRequest;

/// Per-route settings of the token scheme.
#[derive(Clone, Default)]
pub struct TokenSchemeConfig {
    /// Overrides the global validator from the options.
    pub validate_token: Option<Arc<dyn TokenValidator>>,
}

impl TokenSchemeConfig {
    pub fn with_validate_token(validator: impl TokenValidator) -> Self {
        Self {
            validate_token: Some(Arc::new(validator)),
        }
    }
}

/// Bearer token presentation.
///
/// Reads the token from `Authorization: Bearer <token>`, falling back to the
/// configured query parameter, and resolves it through the engine cache.
/// Never issues a token.
pub struct TokenScheme {
    engine: Arc<AuthEngine>,
    config: TokenSchemeConfig,
}

impl TokenScheme {
    pub fn new(engine: Arc<AuthEngine>, config: TokenSchemeConfig) -> Self {
        Self { engine, config }
    }

    fn extract_token<'a>(&self, request: &'a AuthRequest) -> Option<&'a str> {
        let from_header = request
            .authorization()
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .and_then(|(_, token)| token);

        from_header.or_else(|| request.query_param(&self.engine.options().token_field))
    }
}

#[async_trait]
impl AuthScheme for TokenScheme {
    fn name(&self) -> &'static str {
        "token"
    }

    async fn authenticate(&self, request: &AuthRequest) -> Result<AuthVerdict, AuthError> {
        let token = self
            .extract_token(request)
            .ok_or(AuthError::Unauthenticated)?;

        let store = request.store.as_ref().ok_or_else(AuthError::missing_store)?;

        let resolved = self.engine.resolve_token(store, token).await?;

        let validator = self
            .config
            .validate_token
            .as_ref()
            .or(self.engine.options().validate_token.as_ref());
        if let Some(validator) = validator {
            validator
                .validate(&resolved)
                .await
                .map_err(AuthError::Rejected)?;
        }

        Ok(AuthVerdict::authenticated(Identity::from(&resolved.user)))
    }
}
