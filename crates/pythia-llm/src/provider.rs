//! The `LlmProvider` trait - the model-invocation seam
//!
//! Every stage of the research engine talks to the model through this
//! trait, so tests can substitute a scripted in-memory provider and the
//! binary can wire in any concrete backend.

use crate::completion::{CompletionRequest, CompletionResponse};
use crate::error::Result;

/// Trait implemented by every LLM backend
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Get available models
    fn available_models(&self) -> Vec<String>;

    /// Get the default model
    fn default_model(&self) -> &str;

    /// Complete a conversation
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}
