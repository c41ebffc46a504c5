pub mod errors;
pub mod generator;

pub use errors::TokenError;
pub use generator::TokenGenerator;
pub use generator::TOKEN_ALPHABET;
pub use generator::TOKEN_LENGTH;
