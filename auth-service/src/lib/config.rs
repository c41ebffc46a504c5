use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use auth::WorkFactor;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::auth::hooks::AccessTokenExtension;
use crate::domain::auth::hooks::TokenValidator;
use crate::domain::auth::hooks::UserExtension;
use crate::domain::auth::models::NewAccessToken;
use crate::domain::auth::models::NewUser;

pub const DEFAULT_TOKEN_FIELD: &str = "token";
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;
pub const DEFAULT_PEPPER: &str = "JcmjuDxZf8zm";
pub const DEFAULT_CACHE_EXPIRES_IN_MS: u64 = 300_000;
pub const MIN_PEPPER_LENGTH: usize = 10;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(skip)]
    pub run_mode: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            database_url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

/// Raw authentication settings as read from files and environment.
///
/// Unknown keys are rejected; missing keys take their defaults.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AuthSettings {
    /// Query parameter carrying a bearer token
    pub token_field: String,
    pub min_password_length: usize,
    /// Secret appended to every password before hashing
    pub pepper: String,
    /// Token validation cache TTL, in milliseconds
    pub access_token_cache_expires_in: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_field: DEFAULT_TOKEN_FIELD.to_string(),
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
            pepper: DEFAULT_PEPPER.to_string(),
            access_token_cache_expires_in: DEFAULT_CACHE_EXPIRES_IN_MS,
        }
    }
}

/// Error for authentication settings that fail validation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("pepper must contain at least {min} characters, got {actual}")]
    PepperTooShort { min: usize, actual: usize },

    #[error("token_field must not be empty")]
    EmptyTokenField,

    #[error("access_token_cache_expires_in must be greater than zero")]
    ZeroCacheExpiry,
}

/// Validated authentication options shared by every scheme.
///
/// Function-valued options cannot come from configuration files and are
/// attached with the `with_*` builders.
#[derive(Clone)]
pub struct AuthOptions {
    pub token_field: String,
    pub min_password_length: usize,
    pub pepper: String,
    pub cache_expires_in: Duration,
    pub work_factor: WorkFactor,
    pub validate_token: Option<Arc<dyn TokenValidator>>,
    pub extend_user: Option<UserExtension>,
    pub extend_access_token: Option<AccessTokenExtension>,
}

impl AuthOptions {
    /// Validate raw settings and fill in the derived options.
    ///
    /// # Arguments
    /// * `settings` - Raw settings with defaults already applied
    /// * `work_factor` - Password hashing cost profile
    ///
    /// # Errors
    /// * `PepperTooShort` - Pepper shorter than 10 characters
    /// * `EmptyTokenField` - Token query parameter name is empty
    /// * `ZeroCacheExpiry` - Cache TTL of zero milliseconds
    pub fn resolve(settings: AuthSettings, work_factor: WorkFactor) -> Result<Self, OptionsError> {
        let pepper_length = settings.pepper.chars().count();
        if pepper_length < MIN_PEPPER_LENGTH {
            return Err(OptionsError::PepperTooShort {
                min: MIN_PEPPER_LENGTH,
                actual: pepper_length,
            });
        }

        if settings.token_field.is_empty() {
            return Err(OptionsError::EmptyTokenField);
        }

        if settings.access_token_cache_expires_in == 0 {
            return Err(OptionsError::ZeroCacheExpiry);
        }

        if settings.pepper == DEFAULT_PEPPER {
            tracing::warn!("Using the built-in password pepper; set auth.pepper in production");
        }

        Ok(Self {
            token_field: settings.token_field,
            min_password_length: settings.min_password_length,
            pepper: settings.pepper,
            cache_expires_in: Duration::from_millis(settings.access_token_cache_expires_in),
            work_factor,
            validate_token: None,
            extend_user: None,
            extend_access_token: None,
        })
    }

    /// Global token check, used by token schemes without their own.
    pub fn with_validate_token(mut self, validator: impl TokenValidator) -> Self {
        self.validate_token = Some(Arc::new(validator));
        self
    }

    pub fn with_user_extension(
        mut self,
        extension: impl Fn(&mut NewUser) + Send + Sync + 'static,
    ) -> Self {
        self.extend_user = Some(Arc::new(extension));
        self
    }

    pub fn with_access_token_extension(
        mut self,
        extension: impl Fn(&mut NewAccessToken) + Send + Sync + 'static,
    ) -> Self {
        self.extend_access_token = Some(Arc::new(extension));
        self
    }
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            token_field: DEFAULT_TOKEN_FIELD.to_string(),
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
            pepper: DEFAULT_PEPPER.to_string(),
            cache_expires_in: Duration::from_millis(DEFAULT_CACHE_EXPIRES_IN_MS),
            work_factor: WorkFactor::Production,
            validate_token: None,
            extend_user: None,
            extend_access_token: None,
        }
    }
}

impl fmt::Debug for AuthOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthOptions")
            .field("token_field", &self.token_field)
            .field("min_password_length", &self.min_password_length)
            .field("pepper", &"<redacted>")
            .field("cache_expires_in", &self.cache_expires_in)
            .field("work_factor", &self.work_factor)
            .field("validate_token", &self.validate_token.is_some())
            .field("extend_user", &self.extend_user.is_some())
            .field("extend_access_token", &self.extend_access_token.is_some())
            .finish()
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (SERVER__HTTP_PORT, AUTH__PEPPER, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: AUTH__PEPPER=... overrides auth.pepper
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;

        let mut config: Config = configuration.try_deserialize()?;
        config.run_mode = run_mode;

        Ok(config)
    }

    /// Resolve the authentication options for this run mode.
    pub fn auth_options(&self) -> Result<AuthOptions, OptionsError> {
        AuthOptions::resolve(self.auth.clone(), WorkFactor::for_run_mode(&self.run_mode))
    }
}
