//! Message routing
//!
//! Classifies each incoming message into one of three handling paths.
//! Classification asks the model first and falls back to a keyword
//! heuristic when the model is unavailable or keeps answering
//! off-category, so routing itself can never fail a turn.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use pythia_llm::{CompletionRequest, LlmProvider, Message};
use pythia_tools::{CapabilityCategory, CapabilityRegistry};

use crate::prompts;
use crate::validator::strip_reasoning;

const CLASSIFY_ATTEMPTS: u32 = 3;
const CLASSIFY_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Handling path for an incoming message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Multi-step supervised research
    Research,
    /// Single tool lookup
    ToolAgent,
    /// Answer directly; `reply` is set when routing already produced the text
    DirectResponse {
        /// Pre-computed reply, when the router degraded to a canned answer
        reply: Option<String>,
    },
}

/// Classifies messages and checks capability availability for the route
pub struct MessageRouter {
    provider: Arc<dyn LlmProvider>,
    registry: Arc<CapabilityRegistry>,
}

impl MessageRouter {
    /// Create a router over the given provider and capability registry
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, registry: Arc<CapabilityRegistry>) -> Self {
        Self { provider, registry }
    }

    /// Route a message, degrading to heuristics and availability fallbacks.
    ///
    /// Never fails: the worst case is a direct response explaining what is
    /// unavailable.
    pub async fn route(&self, message: &str) -> Route {
        let route = match self.classify(message).await {
            Some(route) => route,
            None => {
                debug!("classification exhausted, using heuristic routing");
                heuristic_route(message)
            }
        };
        self.check_availability(message, route)
    }

    /// Ask the model to classify the message, retrying a few times
    async fn classify(&self, message: &str) -> Option<Route> {
        for attempt in 1..=CLASSIFY_ATTEMPTS {
            if attempt > 1 {
                tokio::time::sleep(CLASSIFY_RETRY_DELAY).await;
            }

            let request = CompletionRequest::new(
                self.provider.default_model(),
                vec![
                    Message::system(prompts::CLASSIFY_SYSTEM),
                    Message::user(prompts::classification_prompt(message)),
                ],
            );

            match self.provider.complete(request).await {
                Ok(response) => {
                    let answer = strip_reasoning(&response.content).to_lowercase();
                    let answer = answer.trim();
                    if answer.starts_with("research") {
                        return Some(Route::Research);
                    }
                    if answer.starts_with("tool_agent") || answer.starts_with("tool agent") {
                        return Some(Route::ToolAgent);
                    }
                    if answer.starts_with("direct_response")
                        || answer.starts_with("direct response")
                    {
                        return Some(Route::DirectResponse { reply: None });
                    }
                    warn!(attempt, answer = %answer, "unrecognized classification answer");
                }
                Err(e) => {
                    warn!(attempt, error = %e, "classification request failed");
                }
            }
        }
        None
    }

    /// Downgrade routes whose required capabilities are missing
    fn check_availability(&self, message: &str, route: Route) -> Route {
        match route {
            Route::Research => {
                if self.registry.has_category(CapabilityCategory::Search) {
                    Route::Research
                } else {
                    Route::DirectResponse {
                        reply: Some(
                            "I can't run research right now because no search \
                             capability is available. I can still answer from \
                             general knowledge if that helps."
                                .to_string(),
                        ),
                    }
                }
            }
            Route::ToolAgent => {
                let category = detect_tool_category(message);
                if self.registry.has_category(category) {
                    Route::ToolAgent
                } else {
                    Route::DirectResponse {
                        reply: Some(format!(
                            "I don't have a {} capability available right now, \
                             so I can't look that up for you.",
                            category_noun(category)
                        )),
                    }
                }
            }
            direct => direct,
        }
    }
}

/// Keyword-based routing used when model classification is unavailable
#[must_use]
pub fn heuristic_route(message: &str) -> Route {
    let lower = message.to_lowercase();

    const TOOL_KEYWORDS: &[&str] = &[
        "weather",
        "temperature",
        "forecast",
        "map",
        "directions",
        "search for",
        "look up",
        "latest news",
    ];
    if TOOL_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Route::ToolAgent;
    }

    const RESEARCH_KEYWORDS: &[&str] = &[
        "research",
        "explain",
        "analyze",
        "analyse",
        "compare",
        "investigate",
        "in depth",
        "comprehensive",
    ];
    if RESEARCH_KEYWORDS.iter().any(|k| lower.contains(k)) || message.len() > 80 {
        return Route::Research;
    }

    Route::DirectResponse {
        reply: Some(prompts::DIRECT_FALLBACK_REPLY.to_string()),
    }
}

/// Guess which capability category a tool-style question needs
#[must_use]
pub fn detect_tool_category(message: &str) -> CapabilityCategory {
    let lower = message.to_lowercase();
    if ["weather", "temperature", "forecast", "humidity"]
        .iter()
        .any(|k| lower.contains(k))
    {
        CapabilityCategory::Weather
    } else if ["map", "directions", "route to", "distance to"]
        .iter()
        .any(|k| lower.contains(k))
    {
        CapabilityCategory::Map
    } else {
        CapabilityCategory::Search
    }
}

fn category_noun(category: CapabilityCategory) -> &'static str {
    match category {
        CapabilityCategory::Search => "search",
        CapabilityCategory::Weather => "weather",
        CapabilityCategory::Map => "map",
        CapabilityCategory::Utility => "utility",
    }
}
