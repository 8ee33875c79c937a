//! Error taxonomy for the cascade resolver.
//!
//! Only [`FetchError`] is ever surfaced to the user (through the
//! resolver's error sink, paired with a retry handle). Discarding a
//! stale fetch result is not an error at all; it is a silent internal
//! outcome logged at debug level by the resolver.

use thiserror::Error;

/// Failure of an external level fetch (network/HTTP error).
///
/// Recoverable: the resolver pairs every surfaced `FetchError` with a
/// retry handle that replays the identical fetch. Nothing is retried
/// automatically.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    /// Human-readable failure description.
    pub message: String,
    /// Whether the external layer considers the failure transient.
    pub retryable: bool,
}

impl FetchError {
    /// Create a fetch error.
    pub fn new(message: impl Into<String>, retryable: bool) -> Self {
        Self {
            message: message.into(),
            retryable,
        }
    }

    /// A transient failure worth retrying.
    pub fn retryable(message: impl Into<String>) -> Self {
        Self::new(message, true)
    }

    /// A permanent failure.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::new(message, false)
    }
}

/// Invalid chain construction. These are programmer errors caught when
/// a [`ChainSpec`](crate::chain::ChainSpec) is built, never at runtime.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChainSpecError {
    /// A chain must have at least one level.
    #[error("chain has no levels")]
    EmptyChain,

    /// Every level key must be unique within a chain.
    #[error("duplicate level key: {0}")]
    DuplicateLevel(String),

    /// A level declared the same fetch parameter twice.
    #[error("level {level} declares duplicate param: {param}")]
    DuplicateParam {
        /// Offending level key.
        level: String,
        /// Duplicated param key.
        param: String,
    },

    /// The root level is lazy-loaded and has no dependencies, so it
    /// cannot declare fetch parameters.
    #[error("root level {0} cannot declare fetch params")]
    RootWithParams(String),
}
