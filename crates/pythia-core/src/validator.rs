//! Structured output validation with retry
//!
//! Every stage that needs typed JSON out of a model goes through
//! [`StructuredOutputValidator`]. It retries parse failures up to a
//! configured cap and always returns an outcome rather than an error,
//! so callers can fall back to defaults instead of failing the run.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use pythia_llm::{CompletionRequest, LlmProvider, Message};

/// Result of a structured generation attempt.
///
/// Exactly one of `data` and `error` is populated. `raw` keeps the last
/// model response so callers can attempt their own salvage parse.
#[derive(Debug, Clone)]
pub struct ValidatorOutcome<T> {
    /// Parsed value, when some attempt succeeded
    pub data: Option<T>,
    /// Description of the failure, when all attempts failed
    pub error: Option<String>,
    /// 1-based number of attempts consumed
    pub attempts: u32,
    /// Raw text of the last model response, if any response arrived
    pub raw: Option<String>,
}

impl<T> ValidatorOutcome<T> {
    /// Whether a parsed value is available
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }
}

/// Retries model calls until the response parses as the requested type
pub struct StructuredOutputValidator {
    provider: Arc<dyn LlmProvider>,
    max_retries: u32,
    retry_delay: Duration,
}

impl StructuredOutputValidator {
    /// Create a validator with the given retry cap
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, max_retries: u32) -> Self {
        Self {
            provider,
            max_retries: max_retries.max(1),
            retry_delay: Duration::from_millis(500),
        }
    }

    /// Override the delay between attempts
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Ask the model for a value of type `T`, retrying on parse failure.
    ///
    /// Never returns an error: exhausted retries yield an outcome with
    /// `error` set and `data` empty.
    pub async fn generate<T: DeserializeOwned>(
        &self,
        system: &str,
        prompt: &str,
    ) -> ValidatorOutcome<T> {
        let mut last_error = String::new();
        let mut last_raw: Option<String> = None;

        for attempt in 1..=self.max_retries {
            if attempt > 1 {
                tokio::time::sleep(self.retry_delay).await;
            }

            let request = CompletionRequest::new(
                self.provider.default_model(),
                vec![Message::system(system), Message::user(prompt)],
            );

            match self.provider.complete(request).await {
                Ok(response) => {
                    let cleaned = extract_json(&strip_reasoning(&response.content));
                    last_raw = Some(response.content.clone());
                    match serde_json::from_str::<T>(&cleaned) {
                        Ok(data) => {
                            debug!(attempt, "structured output parsed");
                            return ValidatorOutcome {
                                data: Some(data),
                                error: None,
                                attempts: attempt,
                                raw: last_raw,
                            };
                        }
                        Err(e) => {
                            warn!(attempt, error = %e, "structured output parse failed");
                            last_error = format!("parse error: {}", e);
                        }
                    }
                }
                Err(e) => {
                    warn!(attempt, error = %e, "structured output request failed");
                    last_error = format!("model error: {}", e);
                }
            }
        }

        ValidatorOutcome {
            data: None,
            error: Some(last_error),
            attempts: self.max_retries,
            raw: last_raw,
        }
    }
}

/// Remove `<think>...</think>` reasoning blocks some models prepend
#[must_use]
pub fn strip_reasoning(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("<think>") {
        out.push_str(&rest[..start]);
        match rest[start..].find("</think>") {
            Some(end) => rest = &rest[start + end + "</think>".len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Extract the outermost JSON object from surrounding prose
#[must_use]
pub fn extract_json(text: &str) -> String {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => text[start..=end].to_string(),
        _ => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_reasoning_removes_think_blocks() {
        let text = "<think>pondering deeply</think>{\"a\": 1}";
        assert_eq!(strip_reasoning(text), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_reasoning_unclosed_block() {
        let text = "answer <think>never closed";
        assert_eq!(strip_reasoning(text), "answer");
    }

    #[test]
    fn test_strip_reasoning_passthrough() {
        assert_eq!(strip_reasoning("  plain  "), "plain");
    }

    #[test]
    fn test_extract_json_from_prose() {
        let text = "Sure, here you go:\n{\"key\": \"value\"}\nHope that helps.";
        assert_eq!(extract_json(text), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_json_no_object() {
        assert_eq!(extract_json("  no json here "), "no json here");
    }

    #[test]
    fn test_extract_json_nested() {
        let text = "x {\"a\": {\"b\": 1}} y";
        assert_eq!(extract_json(text), "{\"a\": {\"b\": 1}}");
    }
}
