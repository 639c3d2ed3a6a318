//! Research engine facade
//!
//! Ties router, orchestrator, and tool agent together behind one
//! entrypoint. `handle` returns the final text and emits exactly one
//! terminal result event; nothing in the turn can surface an error to
//! the caller once the engine is constructed.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use pythia_llm::{CompletionRequest, LlmProvider, Message};
use pythia_tools::CapabilityRegistry;

use crate::config::ResearchConfig;
use crate::error::Result;
use crate::events::{AgentEvent, EventSink, RunStatus};
use crate::orchestrator::ResearchOrchestrator;
use crate::prompts;
use crate::router::{MessageRouter, Route};
use crate::tool_agent::ToolAgent;
use crate::types::ConversationMessage;

/// One turn's worth of input for the engine
#[derive(Debug, Clone, Default)]
pub struct EngineRequest {
    /// The user's latest message
    pub message: String,
    /// Prior conversation, oldest first, excluding `message`
    pub history: Vec<ConversationMessage>,
    /// Optional remembered context about the user
    pub memory_context: Option<String>,
}

impl EngineRequest {
    /// Build a request for a single message with no history
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Entry point for research turns
pub struct ResearchEngine {
    provider: Arc<dyn LlmProvider>,
    router: MessageRouter,
    orchestrator: ResearchOrchestrator,
    tool_agent: ToolAgent,
}

impl ResearchEngine {
    /// Create an engine. This is the only fallible surface: an invalid
    /// config is rejected here so every later call can degrade to text.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        registry: Arc<CapabilityRegistry>,
        config: ResearchConfig,
    ) -> Result<Self> {
        config.ensure_valid()?;

        Ok(Self {
            provider: Arc::clone(&provider),
            router: MessageRouter::new(Arc::clone(&provider), Arc::clone(&registry)),
            orchestrator: ResearchOrchestrator::new(
                Arc::clone(&provider),
                Arc::clone(&registry),
                &config,
            ),
            tool_agent: ToolAgent::new(provider, registry),
        })
    }

    /// Handle one turn. Emits progress on `sink`, ends with exactly one
    /// result event, and returns the same final text.
    pub async fn handle(&self, request: &EngineRequest, sink: &EventSink) -> String {
        let route = self.router.route(&request.message).await;
        info!(route = route_kind(&route), "message routed");

        let (text, status) = match route {
            Route::Research => {
                let mut history = request.history.clone();
                history.push(ConversationMessage::user(&request.message));
                let outcome = self.orchestrator.run(&history, sink).await;
                (outcome.text, outcome.status)
            }
            Route::ToolAgent => {
                sink.progress("Looking that up...", None);
                (self.tool_agent.answer(&request.message).await, RunStatus::Complete)
            }
            Route::DirectResponse { reply: Some(reply) } => (reply, RunStatus::Complete),
            Route::DirectResponse { reply: None } => (
                self.direct_response(&request.message, request.memory_context.as_deref())
                    .await,
                RunStatus::Complete,
            ),
        };

        sink.result(text.clone(), status);
        text
    }

    /// Handle a turn as an event stream. The receiver sees progress
    /// events followed by exactly one result event, even if the task
    /// itself dies.
    pub fn handle_streaming(
        self: Arc<Self>,
        request: EngineRequest,
    ) -> mpsc::UnboundedReceiver<AgentEvent> {
        let (sink, rx) = EventSink::channel();
        tokio::spawn(async move {
            let engine = Arc::clone(&self);
            let inner_sink = sink.clone();
            let task = tokio::spawn(async move {
                engine.handle(&request, &inner_sink).await;
            });
            if let Err(e) = task.await {
                warn!(error = %e, "research turn aborted");
                sink.result(
                    format!("Something went wrong while handling that: {}", e),
                    RunStatus::Error,
                );
            }
        });
        rx
    }

    /// Answer directly from the model, degrading to a static apology
    async fn direct_response(&self, message: &str, memory_context: Option<&str>) -> String {
        let request = CompletionRequest::new(
            self.provider.default_model(),
            vec![Message::user(prompts::direct_response_prompt(
                message,
                memory_context,
            ))],
        );

        match self.provider.complete(request).await {
            Ok(response) if !response.content.trim().is_empty() => {
                response.content.trim().to_string()
            }
            Ok(_) => prompts::DIRECT_FALLBACK_REPLY.to_string(),
            Err(e) => {
                warn!(error = %e, "direct response failed");
                format!(
                    "I couldn't reach the language model to answer that ({}). \
                     Please try again in a moment.",
                    e
                )
            }
        }
    }
}

fn route_kind(route: &Route) -> &'static str {
    match route {
        Route::Research => "research",
        Route::ToolAgent => "tool_agent",
        Route::DirectResponse { .. } => "direct_response",
    }
}
