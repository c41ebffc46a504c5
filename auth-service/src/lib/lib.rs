pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

// Re-export commonly used types
pub use domain::auth::engine::AuthEngine;
pub use domain::auth::errors::AuthError;
pub use outbound::repositories;
