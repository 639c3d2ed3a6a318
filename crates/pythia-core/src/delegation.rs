//! Research round delegation
//!
//! One round of the research loop: generate the next topics from the
//! brief and recent notes, fan workers out over them with a bounded
//! concurrency cap, and fold every outcome back into the supervisor
//! state. The join is all-settled: one worker failing or panicking
//! costs that topic a raw note, never the round.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use pythia_llm::{CompletionRequest, LlmProvider, Message};
use pythia_tools::CapabilityRegistry;

use crate::config::ResearchConfig;
use crate::prompts;
use crate::types::SupervisorState;
use crate::worker::{forced_search_tool, ResearchWorker};

const TOPIC_NOTES_CONTEXT: usize = 2;

/// Fans research workers out over the topics a round needs
pub struct ResearchDelegator {
    provider: Arc<dyn LlmProvider>,
    registry: Arc<CapabilityRegistry>,
    config: ResearchConfig,
}

impl ResearchDelegator {
    /// Create a delegator from the engine's shared components
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        registry: Arc<CapabilityRegistry>,
        config: ResearchConfig,
    ) -> Self {
        Self {
            provider,
            registry,
            config,
        }
    }

    /// Run one round: pick topics, research them concurrently, record
    /// the results in `state`. Returns the topics that were researched.
    pub async fn run_round(&self, state: &mut SupervisorState) -> Vec<String> {
        let topics = self.generate_topics(state).await;
        debug!(count = topics.len(), "delegating research round");

        // A hashtag in the request pins every worker to one search tool.
        let forced = forced_search_tool(&state.brief).map(str::to_string);

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_research_units));
        let mut handles = Vec::with_capacity(topics.len());

        for topic in &topics {
            let permits = Arc::clone(&semaphore);
            let worker = ResearchWorker::new(
                Arc::clone(&self.provider),
                Arc::clone(&self.registry),
                &self.config,
            )
            .with_forced_tool(forced.clone());
            let topic = topic.clone();
            handles.push(tokio::spawn(async move {
                // Acquire can only fail if the semaphore is closed, which
                // never happens here; treat it as a skipped topic.
                let _permit = permits.acquire_owned().await;
                worker.research(&topic).await
            }));
        }

        let joined = futures::future::join_all(handles).await;
        for (joined, topic) in joined.into_iter().zip(topics.iter()) {
            match joined {
                Ok(Ok(output)) => {
                    state.add_note(output.summary);
                    for raw in output.raw_notes {
                        state.add_raw_note(raw);
                    }
                }
                Ok(Err(e)) => {
                    warn!(topic = %topic, error = %e, "research worker failed");
                    state.add_raw_note(format!("research on '{}' failed: {}", topic, e));
                }
                Err(e) => {
                    warn!(topic = %topic, error = %e, "research task panicked or was cancelled");
                    state.add_raw_note(format!("research on '{}' was aborted: {}", topic, e));
                }
            }
        }

        topics
    }

    /// Generate 2-3 topics for the round, degrading to the brief itself
    async fn generate_topics(&self, state: &SupervisorState) -> Vec<String> {
        let request = CompletionRequest::new(
            self.provider.default_model(),
            vec![
                Message::system(prompts::TOPICS_SYSTEM),
                Message::user(prompts::topics_prompt(
                    &state.brief,
                    state.last_notes(TOPIC_NOTES_CONTEXT),
                )),
            ],
        );

        match self.provider.complete(request).await {
            Ok(response) => {
                let topics = crate::worker::parse_queries(&response.content);
                if topics.is_empty() {
                    vec![state.brief.clone()]
                } else {
                    topics.into_iter().take(3).collect()
                }
            }
            Err(e) => {
                warn!(error = %e, "topic generation failed, researching brief directly");
                vec![state.brief.clone()]
            }
        }
    }
}
