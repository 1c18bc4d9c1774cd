//! Error types for partition pruning
//!
//! Error codes:
//! - PRUNE_AFFINITY_UNAVAILABLE (affinity collaborator could not map a key)
//! - PRUNE_AFFINITY_UNSUPPORTED_KEY (key cannot be hashed by the affinity function)
//! - PRUNE_PARAMETER_OUT_OF_RANGE (bound parameter ordinal missing at execution)
//! - PRUNE_CONFIG_INVALID (configuration rejected)
//!
//! Losing precision is never an error: it is expressed as `PartitionNode::All`.

use thiserror::Error;

/// Result type for pruning operations
pub type PruningResult<T> = Result<T, PruningError>;

/// Failures raised by an affinity collaborator.
///
/// These pass through the engine unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AffinityError {
    #[error("partition mapping unavailable for cache '{cache}': {reason}")]
    Unavailable { cache: String, reason: String },

    #[error("key cannot be mapped to a partition: {0}")]
    UnsupportedKey(String),
}

impl AffinityError {
    /// Returns the string error code
    pub fn code(&self) -> &'static str {
        match self {
            AffinityError::Unavailable { .. } => "PRUNE_AFFINITY_UNAVAILABLE",
            AffinityError::UnsupportedKey(_) => "PRUNE_AFFINITY_UNSUPPORTED_KEY",
        }
    }
}

/// Pruning engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PruningError {
    #[error(transparent)]
    Affinity(#[from] AffinityError),

    #[error("parameter #{index} is not bound ({count} arguments supplied)")]
    ParameterOutOfRange { index: usize, count: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PruningError {
    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        PruningError::Config(reason.into())
    }

    /// Returns the string error code
    pub fn code(&self) -> &'static str {
        match self {
            PruningError::Affinity(e) => e.code(),
            PruningError::ParameterOutOfRange { .. } => "PRUNE_PARAMETER_OUT_OF_RANGE",
            PruningError::Config(_) => "PRUNE_CONFIG_INVALID",
        }
    }
}
