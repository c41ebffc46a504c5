pub mod argon2;
pub mod errors;

pub use argon2::CredentialHasher;
pub use argon2::WorkFactor;
pub use errors::PasswordError;
