//! Authentication utilities library
//!
//! Provides the credential and token infrastructure behind the auth service:
//! - Peppered password hashing (Argon2id)
//! - Opaque access token generation
//! - Single-flight, time-bounded token validation cache
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{CredentialHasher, WorkFactor};
//!
//! let hasher = CredentialHasher::new("server-side-pepper", 6, WorkFactor::Reduced);
//! let hash = hasher.set_password(Some("my_password")).unwrap();
//! let is_valid = hasher.verify_password("my_password", hash.as_deref()).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::TokenGenerator;
//!
//! let token = TokenGenerator::new().generate().unwrap();
//! assert_eq!(token.len(), 24);
//! ```
//!
//! ## Token Validation Cache
//! ```
//! use std::time::Duration;
//! use auth::TokenCache;
//!
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! let cache: TokenCache<String, String> = TokenCache::new(Duration::from_secs(300));
//! let user = cache
//!     .validate("abc", |token| async move { Ok(format!("owner of {}", token)) })
//!     .await
//!     .unwrap();
//! assert_eq!(user, "owner of abc");
//! # }
//! ```

pub mod authenticator;
pub mod cache;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use cache::CacheError;
pub use cache::TokenCache;
pub use password::CredentialHasher;
pub use password::PasswordError;
pub use password::WorkFactor;
pub use token::TokenError;
pub use token::TokenGenerator;
