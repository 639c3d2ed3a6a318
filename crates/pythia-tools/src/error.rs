//! Error types for pythia-tools

use thiserror::Error;

/// Capability error type
#[derive(Debug, Error)]
pub enum Error {
    /// Capability not found in the registry
    #[error("capability not found: {0}")]
    NotFound(String),

    /// Capability is registered but disabled
    #[error("capability disabled: {0}")]
    Disabled(String),

    /// Invalid input for a capability
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Network error during invocation
    #[error("network error: {0}")]
    Network(String),

    /// Invocation failed
    #[error("execution error: {0}")]
    Execution(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
