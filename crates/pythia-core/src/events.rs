//! Progress event channel
//!
//! The engine reports progress as a finite, single-consumer sequence of
//! events terminated by exactly one `result` event. Emission is
//! infallible: a dropped receiver silently discards events instead of
//! failing the producing stage.

use crate::types::TodoItem;
use serde::Serialize;
use tokio::sync::mpsc;

/// High-level status of a run, carried on progress events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// Deciding whether the request needs clarification
    Clarifying,
    /// Planning the next research topics
    Planning,
    /// Research workers are running
    Researching,
    /// Producing the final report
    Synthesizing,
    /// Run finished with a final artifact
    Complete,
    /// Run finished on the degraded error path
    Error,
}

/// One event in the progress stream
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Intermediate progress update
    Progress {
        /// Human-readable progress text
        content: String,
        /// Current run status, if it changed
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<RunStatus>,
        /// Current todo list snapshot, for display only
        #[serde(skip_serializing_if = "Option::is_none")]
        todos: Option<Vec<TodoItem>>,
    },
    /// Terminal event carrying the run's single text artifact
    Result {
        /// The final text
        content: String,
        /// Terminal status
        status: RunStatus,
    },
}

/// Infallible event emitter shared by all stages of one run
#[derive(Clone)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<AgentEvent>>,
}

impl EventSink {
    /// Create a sink that forwards events to the given channel
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<AgentEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Create a sink that discards every event
    #[must_use]
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Create a sink together with its receiving end
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AgentEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Emit a progress event
    pub fn progress(&self, content: impl Into<String>, status: Option<RunStatus>) {
        self.emit(AgentEvent::Progress {
            content: content.into(),
            status,
            todos: None,
        });
    }

    /// Emit a progress event with a todo list snapshot
    pub fn progress_with_todos(
        &self,
        content: impl Into<String>,
        status: Option<RunStatus>,
        todos: Vec<TodoItem>,
    ) {
        self.emit(AgentEvent::Progress {
            content: content.into(),
            status,
            todos: Some(todos),
        });
    }

    /// Emit the terminal result event
    pub fn result(&self, content: impl Into<String>, status: RunStatus) {
        self.emit(AgentEvent::Result {
            content: content.into(),
            status,
        });
    }

    fn emit(&self, event: AgentEvent) {
        if let Some(tx) = &self.tx {
            // Receiver may already be gone; that is not the producer's problem
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = AgentEvent::Progress {
            content: "working".to_string(),
            status: Some(RunStatus::Researching),
            todos: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["status"], "RESEARCHING");
        assert!(json.get("todos").is_none());

        let result = AgentEvent::Result {
            content: "done".to_string(),
            status: RunStatus::Complete,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "result");
        assert_eq!(json["status"], "COMPLETE");
    }

    #[tokio::test]
    async fn test_sink_delivers_in_order() {
        let (sink, mut rx) = EventSink::channel();
        sink.progress("one", None);
        sink.result("two", RunStatus::Complete);
        drop(sink);

        match rx.recv().await.unwrap() {
            AgentEvent::Progress { content, .. } => assert_eq!(content, "one"),
            other => panic!("unexpected event: {:?}", other),
        }
        match rx.recv().await.unwrap() {
            AgentEvent::Result { content, status } => {
                assert_eq!(content, "two");
                assert_eq!(status, RunStatus::Complete);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_disabled_sink_does_not_panic() {
        let sink = EventSink::disabled();
        sink.progress("ignored", None);
        sink.result("ignored", RunStatus::Error);
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.progress("nobody listening", None);
    }
}
