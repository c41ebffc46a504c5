use thiserror::Error;

/// Error type for cached token resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError<E> {
    /// The resolver ran and failed. Every waiter for the key receives it.
    #[error("{0}")]
    Resolve(E),

    /// The resolver task ended without producing a result.
    #[error("Token resolution was interrupted")]
    Interrupted,
}
