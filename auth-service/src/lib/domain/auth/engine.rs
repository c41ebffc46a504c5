use std::sync::Arc;

use auth::Authenticator;
use auth::CredentialHasher;
use auth::PasswordError;
use auth::TokenCache;
use auth::TokenGenerator;

use crate::config::AuthOptions;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AccessToken;
use crate::domain::auth::models::AuthVerdict;
use crate::domain::auth::models::Identity;
use crate::domain::auth::models::NewAccessToken;
use crate::domain::auth::models::NewUser;
use crate::domain::auth::models::ResolvedToken;
use crate::domain::auth::models::User;
use crate::domain::auth::ports::Store;
use crate::domain::auth::request::AuthRequest;
use crate::domain::auth::schemes::AuthScheme;
use crate::domain::auth::schemes::CredentialFields;
use crate::domain::auth::schemes::SigninScheme;
use crate::domain::auth::schemes::SignupScheme;
use crate::domain::auth::schemes::TokenScheme;
use crate::domain::auth::schemes::TokenSchemeConfig;

/// Shared state behind every authentication scheme.
///
/// Owns the resolved options, the credential coordinator and the token
/// validation cache. One engine is built at startup and injected wherever
/// schemes are needed; tests build a fresh one each.
pub struct AuthEngine {
    options: AuthOptions,
    authenticator: Arc<Authenticator>,
    cache: TokenCache<ResolvedToken, AuthError>,
}

impl AuthEngine {
    /// Create a new engine from validated options.
    pub fn new(options: AuthOptions) -> Self {
        let hasher = CredentialHasher::new(
            options.pepper.clone(),
            options.min_password_length,
            options.work_factor,
        );
        let authenticator = Authenticator::new(hasher, TokenGenerator::new());
        let cache = TokenCache::new(options.cache_expires_in);

        Self {
            options,
            authenticator: Arc::new(authenticator),
            cache,
        }
    }

    pub fn options(&self) -> &AuthOptions {
        &self.options
    }

    pub fn cache(&self) -> &TokenCache<ResolvedToken, AuthError> {
        &self.cache
    }

    /// Bearer token scheme.
    pub fn token_scheme(self: &Arc<Self>, config: TokenSchemeConfig) -> TokenScheme {
        TokenScheme::new(Arc::clone(self), config)
    }

    /// Credential sign-in scheme (Basic header or payload).
    pub fn signin_scheme(self: &Arc<Self>, fields: CredentialFields) -> SigninScheme {
        SigninScheme::new(Arc::clone(self), fields)
    }

    /// Credential sign-up scheme (payload only).
    pub fn signup_scheme(self: &Arc<Self>, fields: CredentialFields) -> SignupScheme {
        SignupScheme::new(Arc::clone(self), fields)
    }

    /// Drive a scheme through both phases for one request.
    ///
    /// The header phase result is stored on the request, then the payload
    /// phase runs and may complete or replace it.
    ///
    /// # Returns
    /// Final verdict, always carrying an identity
    ///
    /// # Errors
    /// * Any rejection or internal error raised by the scheme
    /// * `Unauthenticated` - Both phases finished without an identity
    pub async fn run(
        &self,
        scheme: &dyn AuthScheme,
        request: &mut AuthRequest,
    ) -> Result<AuthVerdict, AuthError> {
        let outcome = self.run_phases(scheme, request).await;

        match &outcome {
            Ok(verdict) => {
                if let Some(identity) = &verdict.identity {
                    tracing::debug!(
                        scheme = scheme.name(),
                        user_id = %identity.id,
                        issued_token = verdict.issued_token.is_some(),
                        "Request authenticated"
                    );
                }
            }
            Err(e) if e.is_rejection() => {
                tracing::warn!(scheme = scheme.name(), error = %e, "Authentication rejected");
            }
            Err(e) => {
                tracing::error!(scheme = scheme.name(), error = %e, "Authentication failed");
            }
        }

        outcome
    }

    async fn run_phases(
        &self,
        scheme: &dyn AuthScheme,
        request: &mut AuthRequest,
    ) -> Result<AuthVerdict, AuthError> {
        request.auth = scheme.authenticate(request).await?;
        scheme.payload(request).await?;

        if !request.auth.is_authenticated() {
            return Err(AuthError::Unauthenticated);
        }

        Ok(request.auth.clone())
    }

    /// Resolve a presented token through the validation cache.
    ///
    /// # Errors
    /// * `InvalidToken` - No access token with this exact string
    /// * `Store` - Lookup failed (not cached; the next call retries)
    pub(crate) async fn resolve_token(
        &self,
        store: &Store,
        token: &str,
    ) -> Result<ResolvedToken, AuthError> {
        let access_tokens = Arc::clone(&store.access_tokens);

        let resolved = self
            .cache
            .validate(token, move |token| async move {
                access_tokens
                    .find_by_token(&token)
                    .await?
                    .ok_or(AuthError::InvalidToken)
            })
            .await?;

        Ok(resolved)
    }

    /// Check credentials and mint a session token.
    ///
    /// # Errors
    /// * `Configuration` - No store attached to the request
    /// * `Unauthenticated` - Unknown user, missing field or wrong password
    pub(crate) async fn sign_in(
        &self,
        store: Option<&Store>,
        user_name: Option<&str>,
        password: Option<&str>,
    ) -> Result<AuthVerdict, AuthError> {
        let store = store.ok_or_else(AuthError::missing_store)?;

        let user_name = user_name.ok_or(AuthError::Unauthenticated)?;
        let user = store
            .users
            .find_by_user_name(user_name)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        let password = password.unwrap_or_default().to_string();
        if !self.verify_password(password, user.password_hash.clone()).await? {
            return Err(AuthError::Unauthenticated);
        }

        let access_token = self.mint(store, &user).await?;
        tracing::info!(user_id = %user.id, "User signed in");

        Ok(AuthVerdict::authenticated(Identity::from(&user)).with_issued_token(access_token.token))
    }

    /// Create an account with a password and mint its first session token.
    ///
    /// # Errors
    /// * `WeakPassword` - Password shorter than the configured minimum
    /// * `DuplicateUser` - User name already taken
    pub(crate) async fn sign_up(
        &self,
        store: &Store,
        user_name: &str,
        password: &str,
    ) -> Result<AuthVerdict, AuthError> {
        let mut new_user = NewUser::new(user_name);
        if let Some(extend) = &self.options.extend_user {
            extend(&mut new_user);
        }
        new_user.password_hash = self.hash_password(password.to_string()).await?;

        let user = store.users.create(new_user).await?;
        let access_token = self.mint(store, &user).await?;
        tracing::info!(user_id = %user.id, "User signed up");

        Ok(AuthVerdict::authenticated(Identity::from(&user)).with_issued_token(access_token.token))
    }

    /// Generate and persist a new access token for `user`.
    ///
    /// A token collision is reported as `DuplicateToken`, never retried.
    async fn mint(&self, store: &Store, user: &User) -> Result<AccessToken, AuthError> {
        let token = self.authenticator.generate_token()?;

        let mut new_token = NewAccessToken::new(token, user.id);
        if let Some(extend) = &self.options.extend_access_token {
            extend(&mut new_token);
        }

        store.access_tokens.create(new_token).await
    }

    // Argon2 takes tens of milliseconds at production cost, so both
    // operations run on the blocking pool.

    pub(crate) async fn hash_password(&self, password: String) -> Result<Option<String>, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);

        let hash = tokio::task::spawn_blocking(move || authenticator.set_password(Some(password.as_str())))
            .await
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))??;

        Ok(hash)
    }

    async fn verify_password(
        &self,
        password: String,
        stored_hash: Option<String>,
    ) -> Result<bool, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);

        let matches = tokio::task::spawn_blocking(move || {
            authenticator.verify_password(&password, stored_hash.as_deref())
        })
        .await
        .map_err(|e| PasswordError::VerificationFailed(e.to_string()))??;

        Ok(matches)
    }
}
