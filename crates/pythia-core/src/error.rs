//! Error types for pythia-core
//!
//! The engine's public operations never let these escape: every stage
//! converts failures into degraded text artifacts. The taxonomy exists so
//! the conversion sites can log and classify what they recovered from.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Model output did not match the expected structure
    #[error("validation error: {0}")]
    Validation(String),

    /// Capability invocation failed
    #[error("tool execution error: {0}")]
    ToolExecution(#[from] pythia_tools::Error),

    /// Transport/provider failure during a required model call
    #[error("model invocation error: {0}")]
    ModelInvocation(#[from] pythia_llm::Error),

    /// Invalid configuration, reported as the full list of violations
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
