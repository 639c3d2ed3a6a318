//! One-shot tool agent
//!
//! Handles the simple-lookup path: pick the capability that matches
//! the question, invoke it once, and phrase the result as an answer.
//! Every failure degrades to explanatory text.

use std::sync::Arc;

use tracing::{debug, warn};

use pythia_llm::{CompletionRequest, LlmProvider, Message};
use pythia_tools::CapabilityRegistry;

use crate::prompts;
use crate::router::detect_tool_category;

/// Answers single-tool questions without entering the research loop
pub struct ToolAgent {
    provider: Arc<dyn LlmProvider>,
    registry: Arc<CapabilityRegistry>,
}

impl ToolAgent {
    /// Create the agent over the shared provider and registry
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, registry: Arc<CapabilityRegistry>) -> Self {
        Self { provider, registry }
    }

    /// Answer the message with one capability invocation. Never fails.
    pub async fn answer(&self, message: &str) -> String {
        let category = detect_tool_category(message);
        let mut candidates = self.registry.list_by_category(category);
        candidates.sort();

        let Some(tool_name) = candidates.into_iter().next() else {
            return format!(
                "I don't have a capability available that could answer that \
                 ({:?} tools are not configured).",
                category
            );
        };
        debug!(tool = %tool_name, "tool agent invoking capability");

        let input = serde_json::json!({ "input": message });
        let result = match self.registry.invoke(&tool_name, input).await {
            Ok(value) => match value.as_str() {
                Some(s) => s.to_string(),
                None => value.to_string(),
            },
            Err(e) => {
                warn!(tool = %tool_name, error = %e, "capability invocation failed");
                return format!(
                    "I tried to look that up with {} but the call failed: {}",
                    tool_name, e
                );
            }
        };

        self.phrase(message, &tool_name, &result).await
    }

    /// Phrase the raw tool output as an answer, degrading to the raw text
    async fn phrase(&self, question: &str, tool_name: &str, result: &str) -> String {
        let request = CompletionRequest::new(
            self.provider.default_model(),
            vec![
                Message::system(prompts::TOOL_ANSWER_SYSTEM),
                Message::user(prompts::tool_answer_prompt(
                    question, tool_name, result,
                )),
            ],
        );

        match self.provider.complete(request).await {
            Ok(response) if !response.content.trim().is_empty() => {
                response.content.trim().to_string()
            }
            Ok(_) => result.to_string(),
            Err(e) => {
                warn!(error = %e, "tool answer phrasing failed, returning raw result");
                result.to_string()
            }
        }
    }
}
