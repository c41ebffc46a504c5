use auth::CacheError;
use auth::PasswordError;
use auth::TokenError;
use thiserror::Error;

/// Top-level error for every authentication operation.
///
/// Rejections are expected outcomes of bad or missing credentials; the rest
/// are operator-facing failures. See [`AuthError::is_rejection`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    // Rejections
    #[error("Missing or invalid credentials")]
    Unauthenticated,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Password must contain at least {min} characters")]
    WeakPassword { min: usize, actual: usize },

    #[error("Passwords are mismatched")]
    PasswordMismatch,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("User name already exists: {0}")]
    DuplicateUser(String),

    #[error("Token rejected: {0}")]
    Rejected(String),

    // Internal errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Entropy source unavailable: {0}")]
    EntropySource(String),

    #[error("Generated access token already exists")]
    DuplicateToken,

    #[error("Password error: {0}")]
    Password(PasswordError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Token resolution was interrupted")]
    Interrupted,
}

impl AuthError {
    /// Whether this error is a user-facing rejection rather than an internal failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::Unauthenticated
                | AuthError::InvalidToken
                | AuthError::WeakPassword { .. }
                | AuthError::PasswordMismatch
                | AuthError::BadRequest(_)
                | AuthError::DuplicateUser(_)
                | AuthError::Rejected(_)
        )
    }

    pub fn missing_store() -> Self {
        AuthError::Configuration("no store is attached to the request".to_string())
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::WeakPassword { min, actual } => AuthError::WeakPassword { min, actual },
            other => AuthError::Password(other),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::EntropySource(msg) => AuthError::EntropySource(msg),
        }
    }
}

impl From<CacheError<AuthError>> for AuthError {
    fn from(err: CacheError<AuthError>) -> Self {
        match err {
            CacheError::Resolve(inner) => inner,
            CacheError::Interrupted => AuthError::Interrupted,
        }
    }
}
