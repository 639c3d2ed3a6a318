//! Pythia research engine
//!
//! Core orchestration for the Pythia assistant: message routing,
//! clarification, supervised multi-round research with concurrent
//! workers, and report synthesis. Model access goes through
//! [`pythia_llm::LlmProvider`] and tool access through
//! [`pythia_tools::CapabilityRegistry`], so both can be swapped in
//! tests.
//!
//! The engine's contract is that a turn always ends in text: stages
//! degrade to fallbacks instead of returning errors, and the only
//! fallible call is constructing [`ResearchEngine`] with a bad config.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clarify;
pub mod config;
pub mod delegation;
pub mod engine;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod prompts;
pub mod router;
pub mod supervisor;
pub mod synthesis;
pub mod tool_agent;
pub mod types;
pub mod validator;
pub mod worker;

pub use clarify::{ClarificationDecision, ClarifyOutcome, ClarifyStage};
pub use config::{ConfigViolation, ResearchConfig, SearchPreference};
pub use delegation::ResearchDelegator;
pub use engine::{EngineRequest, ResearchEngine};
pub use error::{Error, Result};
pub use events::{AgentEvent, EventSink, RunStatus};
pub use orchestrator::{ResearchOrchestrator, RunOutcome};
pub use router::{MessageRouter, Route};
pub use supervisor::{ResearchSupervisor, SupervisorDecision};
pub use types::{ConversationMessage, ResearchTask, SupervisorState, TodoItem, TodoStatus};
pub use worker::{forced_search_tool, ResearchWorker, WorkerOutput};
pub use validator::{StructuredOutputValidator, ValidatorOutcome};
