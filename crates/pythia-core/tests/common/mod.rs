//! Shared test doubles: a scripted model provider and fake capabilities.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use pythia_llm::{CompletionRequest, CompletionResponse, LlmProvider};
use pythia_tools::{Capability, CapabilityCategory, CapabilityDefinition, CapabilityRegistry};

/// Provider that replays a fixed script of responses.
///
/// Pops one scripted entry per `complete` call; when the script runs
/// out it serves `default_reply` if set, otherwise an API error. Every
/// prompt is recorded for later inspection.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, String>>>,
    default_reply: Option<String>,
    pub calls: AtomicU32,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<&str, &str>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            default_reply: None,
            calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Provider whose script never runs out: `reply` after the script ends.
    pub fn with_default(script: Vec<Result<&str, &str>>, reply: &str) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            default_reply: Some(reply.to_string()),
            calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Provider where every call fails.
    pub fn always_err(message: &str) -> Arc<Self> {
        let mut script = Vec::new();
        for _ in 0..64 {
            script.push(Err(message));
        }
        Self::new(script)
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn available_models(&self) -> Vec<String> {
        vec!["scripted-model".to_string()]
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: CompletionRequest) -> pythia_llm::Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let rendered = request
            .messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(rendered);

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(content)) => Ok(CompletionResponse {
                content,
                usage: None,
                finish_reason: Some("stop".to_string()),
                model: "scripted-model".to_string(),
            }),
            Some(Err(message)) => Err(pythia_llm::Error::Api(message)),
            None => match &self.default_reply {
                Some(reply) => Ok(CompletionResponse {
                    content: reply.clone(),
                    usage: None,
                    finish_reason: Some("stop".to_string()),
                    model: "scripted-model".to_string(),
                }),
                None => Err(pythia_llm::Error::Api("script exhausted".to_string())),
            },
        }
    }
}

/// Search capability that always returns the same text.
pub struct StaticSearchCapability {
    definition: CapabilityDefinition,
    result: String,
    pub invocations: AtomicU32,
}

impl StaticSearchCapability {
    pub fn new(result: &str) -> Arc<Self> {
        Self::named("web_search", result)
    }

    /// Same fake under a different registered name.
    pub fn named(name: &str, result: &str) -> Arc<Self> {
        Arc::new(Self {
            definition: CapabilityDefinition::new(name, "fake search")
                .with_category(CapabilityCategory::Search),
            result: result.to_string(),
            invocations: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl Capability for StaticSearchCapability {
    fn definition(&self) -> &CapabilityDefinition {
        &self.definition
    }

    async fn invoke(
        &self,
        _input: serde_json::Value,
    ) -> pythia_tools::Result<serde_json::Value> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::Value::String(self.result.clone()))
    }
}

/// Weather capability that always returns the same text.
pub struct StaticWeatherCapability {
    definition: CapabilityDefinition,
    result: String,
    pub invocations: AtomicU32,
}

impl StaticWeatherCapability {
    pub fn new(result: &str) -> Arc<Self> {
        Arc::new(Self {
            definition: CapabilityDefinition::new("weather", "fake weather lookup")
                .with_category(CapabilityCategory::Weather),
            result: result.to_string(),
            invocations: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl Capability for StaticWeatherCapability {
    fn definition(&self) -> &CapabilityDefinition {
        &self.definition
    }

    async fn invoke(
        &self,
        _input: serde_json::Value,
    ) -> pythia_tools::Result<serde_json::Value> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::Value::String(self.result.clone()))
    }
}

/// Search capability whose every invocation returns an error.
pub struct FailingSearchCapability {
    definition: CapabilityDefinition,
}

impl FailingSearchCapability {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            definition: CapabilityDefinition::new("web_search", "broken search")
                .with_category(CapabilityCategory::Search),
        })
    }
}

#[async_trait]
impl Capability for FailingSearchCapability {
    fn definition(&self) -> &CapabilityDefinition {
        &self.definition
    }

    async fn invoke(
        &self,
        _input: serde_json::Value,
    ) -> pythia_tools::Result<serde_json::Value> {
        Err(pythia_tools::Error::Execution(
            "upstream search is down".to_string(),
        ))
    }
}

/// Search capability whose every invocation panics, to exercise the
/// all-settled join in delegation.
pub struct PanickingCapability {
    definition: CapabilityDefinition,
}

impl PanickingCapability {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            definition: CapabilityDefinition::new("web_search", "panicking search")
                .with_category(CapabilityCategory::Search),
        })
    }
}

#[async_trait]
impl Capability for PanickingCapability {
    fn definition(&self) -> &CapabilityDefinition {
        &self.definition
    }

    async fn invoke(
        &self,
        _input: serde_json::Value,
    ) -> pythia_tools::Result<serde_json::Value> {
        panic!("capability blew up");
    }
}

/// Search capability whose first invocation panics and the rest succeed,
/// so one worker in a round dies while the others finish.
pub struct FirstCallPanicsCapability {
    definition: CapabilityDefinition,
    calls: AtomicU32,
}

impl FirstCallPanicsCapability {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            definition: CapabilityDefinition::new("web_search", "flaky search")
                .with_category(CapabilityCategory::Search),
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl Capability for FirstCallPanicsCapability {
    fn definition(&self) -> &CapabilityDefinition {
        &self.definition
    }

    async fn invoke(
        &self,
        _input: serde_json::Value,
    ) -> pythia_tools::Result<serde_json::Value> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("first search call blew up");
        }
        Ok(serde_json::Value::String("recovered result".to_string()))
    }
}

/// Search capability that tracks how many invocations overlap in time.
pub struct GaugeCapability {
    definition: CapabilityDefinition,
    current: AtomicUsize,
    pub max_observed: AtomicUsize,
}

impl GaugeCapability {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            definition: CapabilityDefinition::new("web_search", "concurrency gauge")
                .with_category(CapabilityCategory::Search),
            current: AtomicUsize::new(0),
            max_observed: AtomicUsize::new(0),
        })
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_observed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Capability for GaugeCapability {
    fn definition(&self) -> &CapabilityDefinition {
        &self.definition
    }

    async fn invoke(
        &self,
        _input: serde_json::Value,
    ) -> pythia_tools::Result<serde_json::Value> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_observed.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(serde_json::Value::String("gauged result".to_string()))
    }
}

/// Registry with a single capability in it.
pub fn registry_with(capability: Arc<dyn Capability>) -> Arc<CapabilityRegistry> {
    let mut registry = CapabilityRegistry::new();
    registry.register(capability);
    Arc::new(registry)
}

/// Registry with no capabilities at all.
pub fn empty_registry() -> Arc<CapabilityRegistry> {
    Arc::new(CapabilityRegistry::new())
}
