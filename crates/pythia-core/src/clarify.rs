//! Clarification and research brief extraction
//!
//! First stage of a research run: decide whether to ask the user one
//! clarifying question, and if not, distill the conversation into a
//! self-contained research brief for the supervisor.

use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use pythia_llm::{CompletionRequest, LlmProvider, Message};

use crate::config::ResearchConfig;
use crate::prompts;
use crate::types::{last_user_message, ConversationMessage};
use crate::validator::StructuredOutputValidator;

/// Model's answer to "does this request need clarification?"
#[derive(Debug, Clone, Deserialize)]
pub struct ClarificationDecision {
    /// Whether to ask the user a question before researching
    pub need_clarification: bool,
    /// The question to ask, when clarification is needed
    #[serde(default)]
    pub question: String,
    /// Acknowledgement of the understood request, otherwise
    #[serde(default)]
    pub verification: String,
}

/// Outcome of the clarification stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClarifyOutcome {
    /// Ask the user this question and end the turn
    Question(String),
    /// Proceed to research with this brief
    Brief(String),
}

/// Runs the clarification decision and brief extraction
pub struct ClarifyStage {
    provider: Arc<dyn LlmProvider>,
    validator: StructuredOutputValidator,
    allow_clarification: bool,
}

impl ClarifyStage {
    /// Create the stage from the engine's provider and config
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: &ResearchConfig) -> Self {
        let validator = StructuredOutputValidator::new(
            Arc::clone(&provider),
            config.max_structured_output_retries,
        );
        Self {
            provider,
            validator,
            allow_clarification: config.allow_clarification,
        }
    }

    /// Decide between asking a question and producing a research brief.
    ///
    /// Never fails: with clarification disabled the latest user message
    /// becomes the brief verbatim, and any model failure degrades to the
    /// same verbatim-brief path.
    pub async fn run(&self, history: &[ConversationMessage]) -> ClarifyOutcome {
        let latest = last_user_message(history)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        if !self.allow_clarification {
            debug!("clarification disabled, using latest message as brief");
            return ClarifyOutcome::Brief(latest);
        }

        let decision = self.decide(history).await;
        if decision.need_clarification && !decision.question.trim().is_empty() {
            return ClarifyOutcome::Question(decision.question);
        }

        ClarifyOutcome::Brief(self.extract_brief(history, &latest).await)
    }

    async fn decide(&self, history: &[ConversationMessage]) -> ClarificationDecision {
        let date = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let prompt = prompts::clarification_prompt(history, &date);
        let outcome = self
            .validator
            .generate::<ClarificationDecision>(prompts::CLARIFY_SYSTEM, &prompt)
            .await;

        if let Some(decision) = outcome.data {
            return decision;
        }

        // Salvage pass over the raw text before giving up on the model.
        if let Some(raw) = outcome.raw.as_deref() {
            if let Some(decision) = parse_decision_loosely(raw) {
                debug!("clarification decision salvaged from raw text");
                return decision;
            }
        }

        warn!(
            error = outcome.error.as_deref().unwrap_or("unknown"),
            "clarification decision failed, proceeding without a question"
        );
        ClarificationDecision {
            need_clarification: false,
            question: String::new(),
            verification: prompts::CLARIFY_FALLBACK_VERIFICATION.to_string(),
        }
    }

    async fn extract_brief(&self, history: &[ConversationMessage], latest: &str) -> String {
        let request = CompletionRequest::new(
            self.provider.default_model(),
            vec![
                Message::system(prompts::BRIEF_SYSTEM),
                Message::user(prompts::brief_prompt(history)),
            ],
        );

        match self.provider.complete(request).await {
            Ok(response) if !response.content.trim().is_empty() => {
                response.content.trim().to_string()
            }
            Ok(_) => {
                warn!("brief extraction returned empty text, using latest message");
                latest.to_string()
            }
            Err(e) => {
                warn!(error = %e, "brief extraction failed, using latest message");
                latest.to_string()
            }
        }
    }
}

/// Best-effort extraction of the decision fields from non-JSON model text.
///
/// The boolean is whichever of `true`/`false` appears first after the
/// `need_clarification` key; without one the text is unsalvageable.
#[must_use]
pub fn parse_decision_loosely(raw: &str) -> Option<ClarificationDecision> {
    static NEED_RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let need_re = NEED_RE
        .get_or_init(|| Regex::new(r"(?is)need_clarification.*?\b(true|false)\b").unwrap());

    let need = need_re.captures(raw)?;
    let need_clarification = need[1].eq_ignore_ascii_case("true");

    let question = extract_field(raw, "question").unwrap_or_default();
    let verification = extract_field(raw, "verification").unwrap_or_default();

    Some(ClarificationDecision {
        need_clarification,
        question,
        verification,
    })
}

/// Pull a `"field": "value"` string out of malformed JSON-ish text
fn extract_field(raw: &str, field: &str) -> Option<String> {
    let re = Regex::new(&format!(r#"(?s)"{}"[^"]*"([^"]*)""#, field)).ok()?;
    Some(re.captures(raw)?[1].to_string())
}
