//! Pythia LLM - LLM provider abstraction
//!
//! This crate provides the model-invocation seam for the Pythia research
//! engine:
//! - Provider: the `LlmProvider` trait every backend implements
//! - Completion: request/response types for one model call
//! - Ollama: local Ollama provider (OpenAI-compatible chat API)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod message;
pub mod ollama;
pub mod provider;

pub use completion::{CompletionRequest, CompletionResponse, TokenUsage};
pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use ollama::{OllamaConfig, OllamaProvider};
pub use provider::LlmProvider;
