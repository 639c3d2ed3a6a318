//! Run-scoped data types
//!
//! Conversation history, supervisor state, per-topic research tasks, and
//! the display-only todo list.

use chrono::{DateTime, Utc};
use pythia_llm::{Message, MessageRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A message in the run's conversation history. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Who authored the message
    pub role: MessageRole,
    /// Message text
    pub content: String,
    /// When the message was created
    pub timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    /// Create a user message stamped now
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant message stamped now
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Convert to an LLM message (drops the timestamp)
    #[must_use]
    pub fn to_llm(&self) -> Message {
        Message {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// The last user message in a history, if any
#[must_use]
pub fn last_user_message(history: &[ConversationMessage]) -> Option<&ConversationMessage> {
    history.iter().rev().find(|m| m.role == MessageRole::User)
}

/// State owned by the orchestrator for the lifetime of one research run
#[derive(Debug, Clone)]
pub struct SupervisorState {
    /// The research brief produced by the clarification stage
    pub brief: String,
    /// Compressed worker summaries, append-only
    pub notes: Vec<String>,
    /// Raw findings and error notes, append-only
    pub raw_notes: Vec<String>,
    /// Supervisor cycle counter, monotonically non-decreasing
    pub iteration: u32,
    /// Conversation history plus supervisor decisions made during the run
    pub message_history: Vec<ConversationMessage>,
}

impl SupervisorState {
    /// Create state for a new run
    #[must_use]
    pub fn new(brief: impl Into<String>, history: Vec<ConversationMessage>) -> Self {
        Self {
            brief: brief.into(),
            notes: Vec::new(),
            raw_notes: Vec::new(),
            iteration: 0,
            message_history: history,
        }
    }

    /// Append a processed note
    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Append a raw note
    pub fn add_raw_note(&mut self, note: impl Into<String>) {
        self.raw_notes.push(note.into());
    }

    /// The last `n` processed notes, oldest first
    #[must_use]
    pub fn last_notes(&self, n: usize) -> &[String] {
        let start = self.notes.len().saturating_sub(n);
        &self.notes[start..]
    }

    /// The last `n` raw notes, oldest first
    #[must_use]
    pub fn last_raw_notes(&self, n: usize) -> &[String] {
        let start = self.raw_notes.len().saturating_sub(n);
        &self.raw_notes[start..]
    }

    /// The last `n` assistant-authored messages, oldest first
    #[must_use]
    pub fn last_assistant_messages(&self, n: usize) -> Vec<&ConversationMessage> {
        let mut messages: Vec<&ConversationMessage> = self
            .message_history
            .iter()
            .rev()
            .filter(|m| m.role == MessageRole::Assistant)
            .take(n)
            .collect();
        messages.reverse();
        messages
    }
}

/// Per-topic research task, owned by exactly one worker invocation
#[derive(Debug, Clone)]
pub struct ResearchTask {
    /// The topic under research
    pub topic: String,
    /// Counted tool calls so far
    pub tool_call_iterations: u32,
    /// Structured findings (`Query: ...\nResults: ...`)
    pub findings: Vec<String>,
    /// Raw result text and error notes
    pub raw_notes: Vec<String>,
}

impl ResearchTask {
    /// Create a task for one topic
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            tool_call_iterations: 0,
            findings: Vec::new(),
            raw_notes: Vec::new(),
        }
    }
}

/// Display status of a todo item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    /// Not started
    Pending,
    /// Currently running
    InProgress,
    /// Finished
    Completed,
}

/// A progress-display todo item. No engine invariant depends on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique id
    pub id: Uuid,
    /// What the step does, imperative form
    pub content: String,
    /// Current status
    pub status: TodoStatus,
    /// Present-continuous label shown while in progress
    pub active_form: String,
    /// Optional grouping category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl TodoItem {
    /// Create a pending todo item
    #[must_use]
    pub fn new(content: impl Into<String>, active_form: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            status: TodoStatus::Pending,
            active_form: active_form.into(),
            category: None,
        }
    }
}
