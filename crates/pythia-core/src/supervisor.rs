//! Research supervision
//!
//! Between rounds of delegated research the supervisor looks at the
//! brief and the collected notes and decides whether to keep going.
//! The decision is parsed leniently; an unreadable answer continues
//! research rather than cutting it short, and the iteration cap puts
//! a hard bound on the loop either way.

use std::sync::Arc;

use tracing::{debug, warn};

use pythia_llm::{CompletionRequest, LlmProvider, Message};

use crate::config::ResearchConfig;
use crate::prompts;
use crate::types::{ConversationMessage, SupervisorState};

/// Supervisor verdict for the current round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorDecision {
    /// Run another round of research
    Continue,
    /// Stop researching and synthesize
    Complete,
}

/// Decides after each round whether research should continue
pub struct ResearchSupervisor {
    provider: Arc<dyn LlmProvider>,
    max_iterations: u32,
    notes_context: usize,
    raw_notes_context: usize,
}

impl ResearchSupervisor {
    /// Create a supervisor bound by the configured iteration cap
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: &ResearchConfig) -> Self {
        Self {
            provider,
            max_iterations: config.max_researcher_iterations,
            notes_context: 5,
            raw_notes_context: 10,
        }
    }

    /// Decide whether to continue. Each call that consults the model
    /// increments the iteration counter and records the model's answer
    /// in the message history so synthesis can see the supervisor's
    /// reasoning. At the cap the decision is complete without touching
    /// the counter, so it never exceeds the configured maximum.
    pub async fn decide(&self, state: &mut SupervisorState) -> SupervisorDecision {
        if state.iteration >= self.max_iterations {
            debug!(iteration = state.iteration, "iteration cap reached");
            return SupervisorDecision::Complete;
        }
        state.iteration += 1;

        let prompt = prompts::supervisor_prompt(
            &state.brief,
            state.last_notes(self.notes_context),
            state.last_raw_notes(self.raw_notes_context),
        );
        let request = CompletionRequest::new(
            self.provider.default_model(),
            vec![
                Message::system(prompts::SUPERVISOR_SYSTEM),
                Message::user(prompt),
            ],
        );

        match self.provider.complete(request).await {
            Ok(response) => {
                let decision = parse_decision(&response.content);
                debug!(iteration = state.iteration, ?decision, "supervisor decided");
                state
                    .message_history
                    .push(ConversationMessage::assistant(response.content.trim()));
                decision
            }
            Err(e) => {
                warn!(error = %e, "supervisor call failed, continuing research");
                SupervisorDecision::Continue
            }
        }
    }
}

/// Parse a free-form supervisor answer into a decision.
///
/// Checks explicit `decision:` markers first, then phrasing that names
/// further research topics, then completion language. Anything else
/// continues research.
#[must_use]
pub fn parse_decision(text: &str) -> SupervisorDecision {
    let lower = text.to_lowercase();

    for line in lower.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("decision:") {
            let rest = rest.trim();
            if rest.starts_with("complete") || rest.starts_with("done") {
                return SupervisorDecision::Complete;
            }
            if rest.starts_with("continue") || rest.starts_with("research") {
                return SupervisorDecision::Continue;
            }
        }
    }

    if lower
        .lines()
        .any(|l| l.contains("research") && l.contains("topic"))
    {
        return SupervisorDecision::Continue;
    }

    if lower.contains("complete") || lower.contains("sufficient") {
        return SupervisorDecision::Complete;
    }

    SupervisorDecision::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_explicit_marker() {
        assert_eq!(
            parse_decision("Decision: complete\nThe notes cover everything."),
            SupervisorDecision::Complete
        );
        assert_eq!(
            parse_decision("decision: continue"),
            SupervisorDecision::Continue
        );
    }

    #[test]
    fn test_parse_topic_phrasing_beats_completion_words() {
        let text = "Coverage is nearly sufficient, but one research topic remains: pricing.";
        assert_eq!(parse_decision(text), SupervisorDecision::Continue);
    }

    #[test]
    fn test_parse_completion_language() {
        assert_eq!(
            parse_decision("The collected notes are sufficient to answer."),
            SupervisorDecision::Complete
        );
    }

    #[test]
    fn test_parse_default_is_continue() {
        assert_eq!(
            parse_decision("Hmm, interesting question."),
            SupervisorDecision::Continue
        );
    }
}
