pub mod errors;
pub mod single_flight;

pub use errors::CacheError;
pub use single_flight::TokenCache;
pub use single_flight::DEFAULT_TTL;
