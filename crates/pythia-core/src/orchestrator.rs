//! Research run orchestration
//!
//! Drives a full research turn through its stages: clarification,
//! supervised research rounds, and synthesis. Emits progress events
//! with a live todo list as each stage starts and finishes. The run
//! always terminates with text; every stage below it degrades rather
//! than errors.

use std::sync::Arc;

use tracing::{debug, info};

use pythia_llm::LlmProvider;
use pythia_tools::CapabilityRegistry;

use crate::clarify::{ClarifyOutcome, ClarifyStage};
use crate::config::ResearchConfig;
use crate::delegation::ResearchDelegator;
use crate::events::{EventSink, RunStatus};
use crate::supervisor::{ResearchSupervisor, SupervisorDecision};
use crate::synthesis::SynthesisStage;
use crate::types::{ConversationMessage, SupervisorState, TodoItem, TodoStatus};

const NOTES_SUFFICIENT: usize = 10;

/// Terminal outcome of a research run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Status the run ended in
    pub status: RunStatus,
    /// Final text: clarifying question or research report
    pub text: String,
}

/// Runs the clarify / research / synthesize pipeline for one turn
pub struct ResearchOrchestrator {
    clarify: ClarifyStage,
    supervisor: ResearchSupervisor,
    delegator: ResearchDelegator,
    synthesis: SynthesisStage,
}

impl ResearchOrchestrator {
    /// Create an orchestrator from the engine's shared components
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        registry: Arc<CapabilityRegistry>,
        config: &ResearchConfig,
    ) -> Self {
        Self {
            clarify: ClarifyStage::new(Arc::clone(&provider), config),
            supervisor: ResearchSupervisor::new(Arc::clone(&provider), config),
            delegator: ResearchDelegator::new(
                Arc::clone(&provider),
                Arc::clone(&registry),
                config.clone(),
            ),
            synthesis: SynthesisStage::new(provider),
        }
    }

    /// Run a full research turn over the conversation history.
    ///
    /// Ends in `Clarifying` when a question goes back to the user and
    /// in `Complete` otherwise, including when synthesis had to fall
    /// back to an error report.
    pub async fn run(
        &self,
        history: &[ConversationMessage],
        sink: &EventSink,
    ) -> RunOutcome {
        let mut todos = starting_todos();

        sink.progress_with_todos(
            "Reviewing your request...",
            Some(RunStatus::Clarifying),
            todos.clone(),
        );
        set_status(&mut todos, 0, TodoStatus::InProgress);

        let brief = match self.clarify.run(history).await {
            ClarifyOutcome::Question(question) => {
                debug!("run ends early with a clarifying question");
                return RunOutcome {
                    status: RunStatus::Clarifying,
                    text: question,
                };
            }
            ClarifyOutcome::Brief(brief) => brief,
        };
        set_status(&mut todos, 0, TodoStatus::Completed);
        set_status(&mut todos, 1, TodoStatus::InProgress);
        info!(brief_len = brief.len(), "research brief prepared");

        sink.progress_with_todos(
            "Planning the research...",
            Some(RunStatus::Planning),
            todos.clone(),
        );

        let mut state = SupervisorState::new(brief, history.to_vec());
        loop {
            if state.notes.len() >= NOTES_SUFFICIENT {
                debug!(notes = state.notes.len(), "note threshold reached");
                break;
            }
            match self.supervisor.decide(&mut state).await {
                SupervisorDecision::Complete => break,
                SupervisorDecision::Continue => {
                    sink.progress_with_todos(
                        format!("Research round {}...", state.iteration),
                        Some(RunStatus::Researching),
                        todos.clone(),
                    );
                    let topics = self.delegator.run_round(&mut state).await;
                    sink.progress(
                        format!(
                            "Completed research on {} topic(s), {} note(s) so far",
                            topics.len(),
                            state.notes.len()
                        ),
                        Some(RunStatus::Researching),
                    );
                }
            }
        }
        set_status(&mut todos, 1, TodoStatus::Completed);
        set_status(&mut todos, 2, TodoStatus::InProgress);

        sink.progress_with_todos(
            "Writing the final report...",
            Some(RunStatus::Synthesizing),
            todos.clone(),
        );
        let report = self.synthesis.run(&state).await;
        set_status(&mut todos, 2, TodoStatus::Completed);
        sink.progress_with_todos("Report ready", Some(RunStatus::Complete), todos);

        RunOutcome {
            status: RunStatus::Complete,
            text: report,
        }
    }
}

fn starting_todos() -> Vec<TodoItem> {
    vec![
        TodoItem::new("Understand the request", "Understanding the request"),
        TodoItem::new("Gather research", "Gathering research"),
        TodoItem::new("Write the report", "Writing the report"),
    ]
}

fn set_status(todos: &mut [TodoItem], index: usize, status: TodoStatus) {
    if let Some(todo) = todos.get_mut(index) {
        todo.status = status;
    }
}
