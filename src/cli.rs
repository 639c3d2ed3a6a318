//! CLI commands
//!
//! - `ask`: run one research turn, streaming progress to the terminal
//! - `capabilities`: list the registered capabilities

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use pythia_core::{
    AgentEvent, EngineRequest, ResearchConfig, ResearchEngine, SearchPreference,
};
use pythia_llm::{LlmProvider, OllamaProvider};
use pythia_tools::builtins::default_registry;

/// Pythia research assistant CLI
#[derive(Parser, Debug)]
#[command(name = "pythia")]
#[command(about = "Deep-research assistant")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a question and stream the research progress
    Ask {
        /// The question or research request
        message: String,

        /// Skip the clarification stage
        #[arg(long)]
        no_clarify: bool,

        /// Maximum supervisor iterations (1-10)
        #[arg(long, default_value_t = 3)]
        max_iterations: u32,

        /// Maximum concurrent research workers (1-20)
        #[arg(long, default_value_t = 3)]
        concurrency: usize,

        /// Tool call budget per research worker (1-30)
        #[arg(long, default_value_t = 10)]
        tool_calls: u32,

        /// Prefer document search over web search
        #[arg(long)]
        prefer_documents: bool,
    },
    /// List the registered capabilities
    Capabilities,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Ask {
            message,
            no_clarify,
            max_iterations,
            concurrency,
            tool_calls,
            prefer_documents,
        }) => {
            let config = ResearchConfig::new()
                .with_clarification(!no_clarify)
                .with_researcher_iterations(max_iterations)
                .with_concurrent_research_units(concurrency)
                .with_react_tool_calls(tool_calls)
                .with_search_preference(if prefer_documents {
                    SearchPreference::Documents
                } else {
                    SearchPreference::Auto
                });
            ask(message, config).await
        }
        Some(Commands::Capabilities) => {
            capabilities();
            Ok(())
        }
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

async fn ask(message: String, config: ResearchConfig) -> Result<()> {
    let provider = Arc::new(OllamaProvider::from_env().context("failed to create provider")?);
    if !provider.is_available().await {
        anyhow::bail!(
            "Ollama is not reachable; set OLLAMA_BASE_URL or start a local instance"
        );
    }
    info!(provider = provider.name(), "engine starting");

    let registry = Arc::new(default_registry());
    let engine = Arc::new(
        ResearchEngine::new(provider, registry, config).context("invalid configuration")?,
    );

    let mut rx = engine.handle_streaming(EngineRequest::new(message));
    while let Some(event) = rx.recv().await {
        match event {
            AgentEvent::Progress { content, status, .. } => match status {
                Some(status) => eprintln!("[{:?}] {}", status, content),
                None => eprintln!("{}", content),
            },
            AgentEvent::Result { content, .. } => {
                println!("{}", content);
            }
        }
    }
    Ok(())
}

fn capabilities() {
    let registry = default_registry();
    let mut definitions = registry.list_definitions();
    definitions.sort_by(|a, b| a.name.cmp(&b.name));
    for definition in definitions {
        let state = if definition.enabled { "enabled" } else { "disabled" };
        println!(
            "{:<16} [{:^8}] ({}) {}",
            definition.name,
            definition.category.as_str(),
            state,
            definition.description
        );
    }
}
