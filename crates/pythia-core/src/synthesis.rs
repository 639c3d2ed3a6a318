//! Final report synthesis
//!
//! Assembles everything the run collected into one prompt and asks the
//! model for the final report. Content assembly is pure and fully
//! deterministic; a model failure produces an error report that still
//! names what was collected, so the caller always gets text back.

use std::sync::Arc;

use tracing::warn;

use pythia_llm::{CompletionRequest, LlmProvider, Message};

use crate::prompts;
use crate::types::SupervisorState;

const RAW_NOTE_FILL_THRESHOLD: usize = 2;
const RAW_NOTE_FILL_MAX: usize = 5;
const RAW_NOTE_MIN_LEN: usize = 50;
const RAW_NOTE_TRUNCATE: usize = 1000;
const ASSISTANT_CONTEXT: usize = 3;

/// Writes the final report from the supervisor state
pub struct SynthesisStage {
    provider: Arc<dyn LlmProvider>,
}

impl SynthesisStage {
    /// Create the stage over the engine's provider
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Produce the final report text. Never fails: a model error yields
    /// a deterministic error report instead.
    pub async fn run(&self, state: &SupervisorState) -> String {
        let content = assemble_content(state);
        let request = CompletionRequest::new(
            self.provider.default_model(),
            vec![
                Message::system(prompts::SYNTHESIS_SYSTEM),
                Message::user(prompts::synthesis_prompt(&state.brief, &content)),
            ],
        );

        match self.provider.complete(request).await {
            Ok(response) if !response.content.trim().is_empty() => {
                response.content.trim().to_string()
            }
            Ok(_) => {
                warn!("synthesis returned empty text");
                error_report(state, "the model returned an empty report")
            }
            Err(e) => {
                warn!(error = %e, "synthesis failed");
                error_report(state, &e.to_string())
            }
        }
    }
}

/// Assemble the research content block for the synthesis prompt.
///
/// All processed notes go in verbatim, followed by the supervisor's
/// recent reasoning. Raw notes are only pulled in as filler when fewer
/// than two processed notes exist.
#[must_use]
pub fn assemble_content(state: &SupervisorState) -> String {
    let mut sections: Vec<String> = Vec::new();

    if !state.notes.is_empty() {
        sections.push(format!("Research notes:\n\n{}", state.notes.join("\n\n---\n\n")));
    }

    let reasoning: Vec<&str> = state
        .last_assistant_messages(ASSISTANT_CONTEXT)
        .into_iter()
        .map(|m| m.content.as_str())
        .collect();
    if !reasoning.is_empty() {
        sections.push(format!("Supervisor assessments:\n\n{}", reasoning.join("\n\n")));
    }

    if state.notes.len() < RAW_NOTE_FILL_THRESHOLD {
        let filler: Vec<String> = state
            .raw_notes
            .iter()
            .filter(|n| n.len() > RAW_NOTE_MIN_LEN)
            .take(RAW_NOTE_FILL_MAX)
            .map(|n| truncate(n, RAW_NOTE_TRUNCATE))
            .collect();
        if !filler.is_empty() {
            sections.push(format!("Raw research notes:\n\n{}", filler.join("\n\n")));
        }
    }

    if sections.is_empty() {
        return prompts::NO_RESEARCH_CONTENT.to_string();
    }
    sections.join("\n\n")
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

fn error_report(state: &SupervisorState, error: &str) -> String {
    format!(
        "# Research Report Unavailable\n\n\
         The final report could not be generated: {}.\n\n\
         Research did run for this request: {} processed note(s) and {} raw \
         note(s) were collected on the topic below.\n\n\
         > {}",
        error,
        state.notes.len(),
        state.raw_notes.len(),
        state.brief
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(notes: &[&str], raw: &[&str]) -> SupervisorState {
        let mut state = SupervisorState::new("brief".to_string(), Vec::new());
        for n in notes {
            state.add_note((*n).to_string());
        }
        for r in raw {
            state.add_raw_note((*r).to_string());
        }
        state
    }

    #[test]
    fn test_assemble_includes_all_notes() {
        let state = state_with(&["alpha note", "beta note", "gamma note"], &[]);
        let content = assemble_content(&state);
        assert!(content.contains("alpha note"));
        assert!(content.contains("beta note"));
        assert!(content.contains("gamma note"));
    }

    #[test]
    fn test_assemble_raw_filler_only_when_notes_sparse() {
        let long_raw = "r".repeat(60);
        let sparse = state_with(&["only note"], &[long_raw.as_str()]);
        assert!(assemble_content(&sparse).contains(&long_raw));

        let rich = state_with(&["one", "two"], &[long_raw.as_str()]);
        assert!(!assemble_content(&rich).contains(&long_raw));
    }

    #[test]
    fn test_assemble_filters_short_raw_notes() {
        let state = state_with(&[], &["tiny"]);
        assert!(!assemble_content(&state).contains("tiny"));
    }

    #[test]
    fn test_assemble_truncates_long_raw_notes() {
        let huge = "x".repeat(2000);
        let state = state_with(&[], &[huge.as_str()]);
        let content = assemble_content(&state);
        assert!(content.len() < 1500);
        assert!(content.contains("..."));
    }

    #[test]
    fn test_assemble_empty_state_placeholder() {
        let state = state_with(&[], &[]);
        assert_eq!(assemble_content(&state), prompts::NO_RESEARCH_CONTENT);
    }

    #[test]
    fn test_error_report_names_counts_and_brief() {
        let state = state_with(&["n1"], &["r1", "r2"]);
        let report = error_report(&state, "timeout");
        assert!(report.contains("timeout"));
        assert!(report.contains("1 processed note"));
        assert!(report.contains("2 raw note"));
        assert!(report.contains("brief"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "héllo wörld";
        let out = truncate(text, 3);
        assert!(out.ends_with("..."));
    }
}
