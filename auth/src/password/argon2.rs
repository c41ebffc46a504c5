use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Cost profile of the adaptive hash.
///
/// `Reduced` exists so test suites do not spend seconds per hash. It must never
/// be selected for a production run mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkFactor {
    Production,
    Reduced,
}

impl WorkFactor {
    /// Select the cost profile for a run mode (`test` gets the reduced profile).
    pub fn for_run_mode(run_mode: &str) -> Self {
        if run_mode.eq_ignore_ascii_case("test") {
            Self::Reduced
        } else {
            Self::Production
        }
    }

    fn params(self) -> Result<Params, PasswordError> {
        match self {
            Self::Production => Ok(Params::default()),
            Self::Reduced => Params::new(Params::MIN_M_COST, Params::MIN_T_COST, 1, None)
                .map_err(|e| PasswordError::HashingFailed(e.to_string())),
        }
    }
}

/// Peppered password hashing.
///
/// Hashes `password + pepper` with Argon2id and a random per-record salt.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    pepper: String,
    min_length: usize,
    work_factor: WorkFactor,
}

impl CredentialHasher {
    /// Create a new hasher.
    ///
    /// # Arguments
    /// * `pepper` - Server-side secret appended to every password
    /// * `min_length` - Minimum accepted plaintext length, in characters
    /// * `work_factor` - Cost profile used for new hashes
    pub fn new(pepper: impl Into<String>, min_length: usize, work_factor: WorkFactor) -> Self {
        Self {
            pepper: pepper.into(),
            min_length,
            work_factor,
        }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Compute the stored hash for a new password.
    ///
    /// An absent or empty password clears the hash (`Ok(None)`).
    ///
    /// # Returns
    /// PHC string format hash, or None when the password is cleared
    ///
    /// # Errors
    /// * `WeakPassword` - Password shorter than the configured minimum
    /// * `HashingFailed` - Password hashing operation failed
    pub fn set_password(&self, password: Option<&str>) -> Result<Option<String>, PasswordError> {
        let password = match password {
            Some(p) if !p.is_empty() => p,
            _ => return Ok(None),
        };

        let actual = password.chars().count();
        if actual < self.min_length {
            return Err(PasswordError::WeakPassword {
                min: self.min_length,
                actual,
            });
        }

        self.hash(password).map(Some)
    }

    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.work_factor.params()?);

        argon2
            .hash_password(self.peppered(password).as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// A missing stored hash never matches. Cost parameters are read from the
    /// stored hash, so hashes made under either work factor verify.
    ///
    /// # Returns
    /// True if the peppered password matches, false otherwise
    ///
    /// # Errors
    /// * `VerificationFailed` - Stored hash is not a valid PHC string
    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: Option<&str>,
    ) -> Result<bool, PasswordError> {
        let Some(stored_hash) = stored_hash else {
            return Ok(false);
        };

        let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
            PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
        })?;

        Ok(Argon2::default()
            .verify_password(self.peppered(password).as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn peppered(&self, password: &str) -> String {
        let mut input = String::with_capacity(password.len() + self.pepper.len());
        input.push_str(password);
        input.push_str(&self.pepper);
        input
    }
}
