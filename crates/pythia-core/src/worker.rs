//! Per-topic research worker
//!
//! A worker covers one research topic: it generates search queries,
//! runs them through the best available search capability under a
//! tool-call budget, and compresses what it found into a single note.
//! Tool failures cost nothing against the budget but the outer loop is
//! bounded by iteration count as well, so a failing tool cannot spin
//! the worker forever.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use pythia_llm::{CompletionRequest, LlmProvider, Message};
use pythia_tools::{CapabilityCategory, CapabilityRegistry};

use crate::config::{ResearchConfig, SearchPreference};
use crate::error::Result;
use crate::prompts;
use crate::types::ResearchTask;

const QUERIES_PER_ITERATION: usize = 3;
const MIN_QUERY_LEN: usize = 5;
const EARLY_STOP_FINDINGS: usize = 3;
const ITERATION_PAUSE: Duration = Duration::from_secs(1);

/// What a worker brings back for its topic
#[derive(Debug, Clone)]
pub struct WorkerOutput {
    /// The topic this worker covered
    pub topic: String,
    /// Compressed summary of the findings
    pub summary: String,
    /// Unprocessed notes, including tool error records
    pub raw_notes: Vec<String>,
}

/// Researches a single topic with a bounded tool-call budget
pub struct ResearchWorker {
    provider: Arc<dyn LlmProvider>,
    registry: Arc<CapabilityRegistry>,
    max_tool_calls: u32,
    search_preference: SearchPreference,
    forced_tool: Option<String>,
}

impl ResearchWorker {
    /// Create a worker from the engine's shared components
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        registry: Arc<CapabilityRegistry>,
        config: &ResearchConfig,
    ) -> Self {
        Self {
            provider,
            registry,
            max_tool_calls: config.max_react_tool_calls,
            search_preference: config.search_preference,
            forced_tool: None,
        }
    }

    /// Force a specific search capability ahead of the priority order.
    ///
    /// The override only applies when that capability is actually
    /// registered and enabled; otherwise tool selection proceeds as
    /// usual.
    #[must_use]
    pub fn with_forced_tool(mut self, tool: Option<String>) -> Self {
        self.forced_tool = tool;
        self
    }

    /// Research the topic and compress the findings into a summary.
    ///
    /// The returned `Result` exists for the task-join seam; the body
    /// degrades internally and in practice always returns `Ok`.
    pub async fn research(&self, topic: &str) -> Result<WorkerOutput> {
        let Some(tool_name) = self.pick_search_tool() else {
            debug!(topic = %topic, "no search capability available for worker");
            return Ok(WorkerOutput {
                topic: topic.to_string(),
                summary: format!(
                    "No search tools were available to research topic: {}",
                    topic
                ),
                raw_notes: vec!["no search capability available".to_string()],
            });
        };

        let mut task = ResearchTask::new(topic);
        let mut iterations: u32 = 0;

        // Failed tool calls are not counted against the budget, so the
        // loop is additionally bounded by outer iterations.
        while task.tool_call_iterations < self.max_tool_calls && iterations < self.max_tool_calls {
            if iterations > 0 {
                tokio::time::sleep(ITERATION_PAUSE).await;
            }
            iterations += 1;

            let queries = self.generate_queries(topic, &task.findings).await;
            for query in queries.into_iter().take(QUERIES_PER_ITERATION) {
                if task.tool_call_iterations >= self.max_tool_calls {
                    break;
                }
                let input = serde_json::json!({ "input": query });
                match self.registry.invoke(&tool_name, input).await {
                    Ok(result) => {
                        task.tool_call_iterations += 1;
                        let rendered = render_tool_result(&result);
                        task.findings
                            .push(format!("Query: {}\nResults: {}", query, rendered));
                        task.raw_notes
                            .push(format!("[{}] {}: {}", tool_name, query, rendered));
                    }
                    Err(e) => {
                        warn!(tool = %tool_name, query = %query, error = %e, "search call failed");
                        task.raw_notes
                            .push(format!("[{}] {} failed: {}", tool_name, query, e));
                    }
                }
            }

            if task.findings.len() >= EARLY_STOP_FINDINGS {
                break;
            }
        }

        let summary = self.compress(topic, &task.findings).await;
        Ok(WorkerOutput {
            topic: task.topic,
            summary,
            raw_notes: task.raw_notes,
        })
    }

    /// Pick the search tool to use for this run.
    ///
    /// A forced hashtag override wins when its capability is available,
    /// then well-known names in a fixed order, reordered when the
    /// config asks for document-first search, then any enabled search
    /// capability.
    fn pick_search_tool(&self) -> Option<String> {
        let mut available = self.registry.list_by_category(CapabilityCategory::Search);
        if available.is_empty() {
            return None;
        }
        available.sort();

        if let Some(forced) = &self.forced_tool {
            if available.iter().any(|a| a == forced) {
                return Some(forced.clone());
            }
            debug!(tool = %forced, "forced search tool unavailable, using priority order");
        }

        let priority: &[&str] = match self.search_preference {
            SearchPreference::Documents => {
                &["document_search", "wiki_search", "web_search", "brave_search"]
            }
            _ => &["web_search", "brave_search", "document_search", "wiki_search"],
        };

        for name in priority {
            if available.iter().any(|a| a == name) {
                return Some((*name).to_string());
            }
        }
        available.into_iter().next()
    }

    /// Generate search queries for the topic, degrading to the topic itself
    async fn generate_queries(&self, topic: &str, findings: &[String]) -> Vec<String> {
        let request = CompletionRequest::new(
            self.provider.default_model(),
            vec![
                Message::system(prompts::QUERIES_SYSTEM),
                Message::user(prompts::queries_prompt(topic, findings)),
            ],
        );

        match self.provider.complete(request).await {
            Ok(response) => {
                let queries = parse_queries(&response.content);
                if queries.is_empty() {
                    vec![topic.to_string()]
                } else {
                    queries
                }
            }
            Err(e) => {
                warn!(error = %e, "query generation failed, searching topic directly");
                vec![topic.to_string()]
            }
        }
    }

    /// Compress findings into one summary, degrading to concatenation
    async fn compress(&self, topic: &str, findings: &[String]) -> String {
        if findings.is_empty() {
            return prompts::no_findings_summary(topic);
        }

        let request = CompletionRequest::new(
            self.provider.default_model(),
            vec![
                Message::system(prompts::COMPRESSION_SYSTEM),
                Message::user(prompts::compression_prompt(topic, findings)),
            ],
        );

        match self.provider.complete(request).await {
            Ok(response) if !response.content.trim().is_empty() => {
                response.content.trim().to_string()
            }
            Ok(_) => naive_summary(topic, findings),
            Err(e) => {
                warn!(error = %e, "compression failed, returning raw findings");
                naive_summary(topic, findings)
            }
        }
    }
}

/// Search capability forced by a hashtag in the request text.
///
/// `#web`, `#brave` and `#search` map to a specific search tool that
/// workers will use ahead of the usual priority order. The first
/// hashtag found wins.
#[must_use]
pub fn forced_search_tool(text: &str) -> Option<&'static str> {
    for token in text.split_whitespace() {
        let token = token.trim_end_matches(['.', ',', ':', ';', '!', '?']);
        match token.to_lowercase().as_str() {
            "#web" => return Some("web_search"),
            "#brave" => return Some("brave_search"),
            "#search" => return Some("document_search"),
            _ => {}
        }
    }
    None
}

/// Split model output into usable query lines
#[must_use]
pub fn parse_queries(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim().trim_start_matches(['-', '*', '•']).trim())
        .map(|l| {
            // strip "1." / "2)" enumeration prefixes
            let stripped = l
                .trim_start_matches(|c: char| c.is_ascii_digit())
                .trim_start_matches(['.', ')'])
                .trim();
            stripped.to_string()
        })
        .filter(|l| l.len() >= MIN_QUERY_LEN)
        .filter(|l| {
            let lower = l.to_lowercase();
            !lower.starts_with("here are") && !lower.ends_with(':')
        })
        .collect()
}

fn render_tool_result(result: &serde_json::Value) -> String {
    match result.as_str() {
        Some(s) => s.to_string(),
        None => result.to_string(),
    }
}

fn naive_summary(topic: &str, findings: &[String]) -> String {
    format!("Findings for {}:\n\n{}", topic, findings.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_queries_strips_enumeration() {
        let text = "1. rust async runtimes\n2) tokio vs async-std\n- smol runtime review";
        let queries = parse_queries(text);
        assert_eq!(
            queries,
            vec![
                "rust async runtimes",
                "tokio vs async-std",
                "smol runtime review"
            ]
        );
    }

    #[test]
    fn test_parse_queries_drops_short_and_preamble() {
        let text = "Here are some queries:\nab\nproper query here";
        let queries = parse_queries(text);
        assert_eq!(queries, vec!["proper query here"]);
    }

    #[test]
    fn test_parse_queries_empty_input() {
        assert!(parse_queries("").is_empty());
        assert!(parse_queries("\n\n").is_empty());
    }

    #[test]
    fn test_render_tool_result_prefers_plain_string() {
        assert_eq!(render_tool_result(&serde_json::json!("hello")), "hello");
        assert_eq!(
            render_tool_result(&serde_json::json!({"a": 1})),
            "{\"a\":1}"
        );
    }

    #[test]
    fn test_forced_search_tool_hashtags() {
        assert_eq!(forced_search_tool("#web rust releases"), Some("web_search"));
        assert_eq!(
            forced_search_tool("look into this #brave, please"),
            Some("brave_search")
        );
        assert_eq!(
            forced_search_tool("#search internal design notes"),
            Some("document_search")
        );
    }

    #[test]
    fn test_forced_search_tool_ignores_plain_text() {
        assert_eq!(forced_search_tool("web search for rust"), None);
        assert_eq!(forced_search_tool("the #webinar schedule"), None);
        assert_eq!(forced_search_tool(""), None);
    }

    #[test]
    fn test_forced_search_tool_first_hashtag_wins() {
        assert_eq!(
            forced_search_tool("#brave then #web"),
            Some("brave_search")
        );
    }

    #[test]
    fn test_naive_summary_contains_everything() {
        let s = naive_summary("t", &["one".to_string(), "two".to_string()]);
        assert!(s.contains("one") && s.contains("two") && s.contains('t'));
    }
}
