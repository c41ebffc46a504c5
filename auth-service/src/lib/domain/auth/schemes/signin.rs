use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::AuthScheme;
use super::CredentialFields;
use crate::domain::auth::engine::AuthEngine;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AuthVerdict;
use crate::domain::auth::request::AuthRequest;

/// Credential sign-in.
///
/// Credentials come either from an `Authorization: Basic` header, checked in
/// the header phase, or from the payload fields once the body is read. Either
/// way one access token is minted per successful sign-in.
pub struct SigninScheme {
    engine: Arc<AuthEngine>,
    fields: CredentialFields,
}

impl SigninScheme {
    pub fn new(engine: Arc<AuthEngine>, fields: CredentialFields) -> Self {
        Self { engine, fields }
    }
}

/// Decode `base64(user:password)`. Only the first colon separates the parts.
fn decode_basic(credentials: &str) -> Result<(String, String), AuthError> {
    let decoded = STANDARD
        .decode(credentials)
        .map_err(|_| AuthError::Unauthenticated)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::Unauthenticated)?;

    match decoded.split_once(':') {
        Some((user_name, password)) => Ok((user_name.to_string(), password.to_string())),
        None => Ok((decoded, String::new())),
    }
}

#[async_trait]
impl AuthScheme for SigninScheme {
    fn name(&self) -> &'static str {
        "signin"
    }

    async fn authenticate(&self, request: &AuthRequest) -> Result<AuthVerdict, AuthError> {
        let credentials = match request.authorization() {
            Some((scheme, Some(credentials))) if scheme.eq_ignore_ascii_case("basic") => {
                credentials
            }
            // Decided in the payload phase.
            _ => return Ok(AuthVerdict::pending()),
        };

        let (user_name, password) = decode_basic(credentials)?;

        self.engine
            .sign_in(
                request.store.as_ref(),
                Some(user_name.as_str()),
                Some(password.as_str()),
            )
            .await
    }

    async fn payload(&self, request: &mut AuthRequest) -> Result<(), AuthError> {
        if request.auth.has_session() {
            return Ok(());
        }

        let verdict = self
            .engine
            .sign_in(
                request.store.as_ref(),
                request.payload_str(&self.fields.user_name),
                request.payload_str(&self.fields.password),
            )
            .await?;

        request.auth = verdict;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use auth::WorkFactor;
    use http::header::AUTHORIZATION;
    use http::HeaderMap;
    use http::HeaderValue;
    use serde_json::json;

    use super::*;
    use crate::config::AuthOptions;
    use crate::domain::auth::models::NewUser;
    use crate::domain::auth::models::User;
    use crate::domain::auth::ports::Store;
    use crate::outbound::repositories::InMemoryStore;

    async fn setup() -> (Arc<AuthEngine>, Arc<InMemoryStore>, User) {
        let engine = Arc::new(AuthEngine::new(AuthOptions {
            work_factor: WorkFactor::Reduced,
            ..AuthOptions::default()
        }));
        let backend = Arc::new(InMemoryStore::new());

        let mut new_user = NewUser::new("alice");
        new_user.password_hash = engine
            .hash_password("correct-pw".to_string())
            .await
            .expect("Failed to hash password");
        let user = backend.insert_user(new_user).await.unwrap();

        (engine, backend, user)
    }

    fn basic(user_name: &str, password: &str) -> HeaderMap {
        let encoded = STANDARD.encode(format!("{}:{}", user_name, password));
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {}", encoded)).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_basic_header_signs_in() {
        let (engine, backend, alice) = setup().await;
        let scheme = engine.signin_scheme(CredentialFields::default());

        let request = AuthRequest::new(Some(Store::from_backend(backend.clone())))
            .with_headers(basic("alice", "correct-pw"));
        let verdict = scheme.authenticate(&request).await.unwrap();

        let identity = verdict.identity.expect("Missing identity");
        assert_eq!(identity.user_name, "alice");
        assert_eq!(identity.id, alice.id);

        let token = verdict.issued_token.expect("Missing token");
        assert_eq!(token.len(), 24);
        assert_eq!(backend.access_token_count().await, 1);
    }

    #[tokio::test]
    async fn test_basic_header_wrong_password() {
        let (engine, backend, _) = setup().await;
        let scheme = engine.signin_scheme(CredentialFields::default());

        let request = AuthRequest::new(Some(Store::from_backend(backend.clone())))
            .with_headers(basic("alice", "wrong-pw"));

        assert_eq!(
            scheme.authenticate(&request).await,
            Err(AuthError::Unauthenticated)
        );
        assert_eq!(backend.access_token_count().await, 0);
    }

    #[tokio::test]
    async fn test_basic_header_unknown_user() {
        let (engine, backend, _) = setup().await;
        let scheme = engine.signin_scheme(CredentialFields::default());

        let request = AuthRequest::new(Some(Store::from_backend(backend)))
            .with_headers(basic("bob", "correct-pw"));

        assert_eq!(
            scheme.authenticate(&request).await,
            Err(AuthError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn test_password_may_contain_colons() {
        let (engine, backend, _) = setup().await;

        let mut new_user = NewUser::new("carol");
        new_user.password_hash = engine.hash_password("pa:ss:word".to_string()).await.unwrap();
        backend.insert_user(new_user).await.unwrap();

        let scheme = engine.signin_scheme(CredentialFields::default());
        let request = AuthRequest::new(Some(Store::from_backend(backend)))
            .with_headers(basic("carol", "pa:ss:word"));

        assert!(scheme.authenticate(&request).await.is_ok());
    }

    #[tokio::test]
    async fn test_user_without_password_cannot_sign_in() {
        let (engine, backend, _) = setup().await;
        backend.insert_user(NewUser::new("dave")).await.unwrap();

        let scheme = engine.signin_scheme(CredentialFields::default());
        let request = AuthRequest::new(Some(Store::from_backend(backend)))
            .with_headers(basic("dave", ""));

        assert_eq!(
            scheme.authenticate(&request).await,
            Err(AuthError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn test_no_basic_header_is_pending() {
        let (engine, backend, _) = setup().await;
        let scheme = engine.signin_scheme(CredentialFields::default());

        let request = AuthRequest::new(Some(Store::from_backend(backend)));
        assert_eq!(
            scheme.authenticate(&request).await,
            Ok(AuthVerdict::pending())
        );
    }

    #[tokio::test]
    async fn test_payload_signs_in_with_custom_fields() {
        let (engine, backend, alice) = setup().await;
        let scheme = engine.signin_scheme(CredentialFields {
            user_name: "login".to_string(),
            password: "secret".to_string(),
            ..CredentialFields::default()
        });

        let payload = json!({"login": "alice", "secret": "correct-pw"});
        let mut request = AuthRequest::new(Some(Store::from_backend(backend.clone())))
            .with_payload(payload.as_object().unwrap().clone());

        let verdict = engine.run(&scheme, &mut request).await.unwrap();
        assert_eq!(verdict.identity.unwrap().id, alice.id);
        assert!(verdict.issued_token.is_some());
        assert_eq!(backend.access_token_count().await, 1);
    }

    #[tokio::test]
    async fn test_payload_missing_fields_is_unauthenticated() {
        let (engine, backend, _) = setup().await;
        let scheme = engine.signin_scheme(CredentialFields::default());

        let payload = json!({"username": "alice"});
        let mut request = AuthRequest::new(Some(Store::from_backend(backend)))
            .with_payload(payload.as_object().unwrap().clone());

        assert_eq!(
            engine.run(&scheme, &mut request).await,
            Err(AuthError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn test_payload_phase_after_basic_does_not_mint_again() {
        let (engine, backend, _) = setup().await;
        let scheme = engine.signin_scheme(CredentialFields::default());

        let payload = json!({"username": "alice", "password": "correct-pw"});
        let mut request = AuthRequest::new(Some(Store::from_backend(backend.clone())))
            .with_headers(basic("alice", "correct-pw"))
            .with_payload(payload.as_object().unwrap().clone());

        let verdict = engine.run(&scheme, &mut request).await.unwrap();

        assert_eq!(backend.access_token_count().await, 1);
        assert_eq!(
            verdict.issued_token,
            backend.tokens_of(verdict.identity.unwrap().id).await.pop()
        );
    }

    #[tokio::test]
    async fn test_missing_store_is_configuration_error() {
        let (engine, _, _) = setup().await;
        let scheme = engine.signin_scheme(CredentialFields::default());

        let request = AuthRequest::new(None).with_headers(basic("alice", "correct-pw"));
        assert!(matches!(
            scheme.authenticate(&request).await,
            Err(AuthError::Configuration(_))
        ));
    }

    #[test]
    fn test_decode_basic() {
        let encoded = STANDARD.encode("alice:correct-pw");
        assert_eq!(
            decode_basic(&encoded),
            Ok(("alice".to_string(), "correct-pw".to_string()))
        );

        let encoded = STANDARD.encode("alice");
        assert_eq!(
            decode_basic(&encoded),
            Ok(("alice".to_string(), String::new()))
        );

        assert_eq!(decode_basic("%%%"), Err(AuthError::Unauthenticated));
    }
}
