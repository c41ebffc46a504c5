use crate::password::CredentialHasher;
use crate::password::PasswordError;
use crate::token::TokenError;
use crate::token::TokenGenerator;

/// Authentication coordinator combining password verification and token minting.
///
/// Provides the credential operations shared by every authentication scheme.
#[derive(Debug, Clone)]
pub struct Authenticator {
    password_hasher: CredentialHasher,
    token_generator: TokenGenerator,
}

/// Result of a successful credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// Freshly generated access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `password_hasher` - Peppered hasher used for every credential check
    /// * `token_generator` - Generator for opaque access tokens
    pub fn new(password_hasher: CredentialHasher, token_generator: TokenGenerator) -> Self {
        Self {
            password_hasher,
            token_generator,
        }
    }

    pub fn password_hasher(&self) -> &CredentialHasher {
        &self.password_hasher
    }

    /// Hash a password for storage.
    ///
    /// # Returns
    /// Hashed password string, or None when the password is cleared
    ///
    /// # Errors
    /// * `WeakPassword` - Password shorter than the configured minimum
    /// * `HashingFailed` - Hashing operation failed
    pub fn set_password(&self, password: Option<&str>) -> Result<Option<String>, PasswordError> {
        self.password_hasher.set_password(password)
    }

    /// Check a password against a stored hash.
    ///
    /// # Errors
    /// * `VerificationFailed` - Stored hash is malformed
    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: Option<&str>,
    ) -> Result<bool, PasswordError> {
        self.password_hasher.verify_password(password, stored_hash)
    }

    /// Verify credentials and generate an access token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash, if the account has one
    ///
    /// # Returns
    /// AuthenticationResult with a new access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `TokenError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: Option<&str>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify_password(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.token_generator.generate()?;

        Ok(AuthenticationResult { access_token })
    }

    /// Generate an access token without password verification.
    ///
    /// Used when the caller has just established the identity by other means,
    /// such as creating the account.
    ///
    /// # Errors
    /// * `EntropySource` - Random source unavailable
    pub fn generate_token(&self) -> Result<String, TokenError> {
        self.token_generator.generate()
    }
}
