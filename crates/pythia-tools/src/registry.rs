//! Registry - capability registration and discovery
//!
//! Capabilities are registered with metadata and can be queried by name or
//! category. The registry is constructed explicitly and passed into the
//! engine at construction time; there is no global state.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Capability category for lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityCategory {
    /// Search operations (web search, document search)
    Search,
    /// Weather lookups
    Weather,
    /// Map / location lookups
    Map,
    /// Everything else
    Utility,
}

impl CapabilityCategory {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Weather => "weather",
            Self::Map => "map",
            Self::Utility => "utility",
        }
    }
}

impl std::fmt::Display for CapabilityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Capability metadata and input schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityDefinition {
    /// Unique capability name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON schema for the invoke input
    pub schema: serde_json::Value,
    /// Category
    pub category: CapabilityCategory,
    /// Whether the capability is enabled
    pub enabled: bool,
}

impl CapabilityDefinition {
    /// Create a new capability definition
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
            category: CapabilityCategory::Utility,
            enabled: true,
        }
    }

    /// Set the input schema
    #[must_use]
    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = schema;
        self
    }

    /// Set the category
    #[must_use]
    pub fn with_category(mut self, category: CapabilityCategory) -> Self {
        self.category = category;
        self
    }

    /// Set enabled status
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Trait for capability implementations
#[async_trait::async_trait]
pub trait Capability: Send + Sync {
    /// Get the capability definition
    fn definition(&self) -> &CapabilityDefinition;

    /// Invoke the capability with the given input
    ///
    /// Returns either a text value or a structured value; may fail per
    /// call. The engine treats any error as data, never as control flow.
    async fn invoke(&self, input: serde_json::Value) -> Result<serde_json::Value>;
}

/// Registry for managing capabilities
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Arc<dyn Capability>>,
    definitions: HashMap<String, CapabilityDefinition>,
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            capabilities: HashMap::new(),
            definitions: HashMap::new(),
        }
    }

    /// Register a capability
    pub fn register(&mut self, capability: Arc<dyn Capability>) {
        let def = capability.definition();
        let name = def.name.clone();
        debug!(capability = %name, category = %def.category, "Registering capability");
        self.definitions.insert(name.clone(), def.clone());
        self.capabilities.insert(name, capability);
    }

    /// Get a capability by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(name).cloned()
    }

    /// Get a capability definition by name
    #[must_use]
    pub fn get_definition(&self, name: &str) -> Option<&CapabilityDefinition> {
        self.definitions.get(name)
    }

    /// Check if a capability exists
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    /// List all capability names
    #[must_use]
    pub fn list_names(&self) -> Vec<String> {
        self.capabilities.keys().cloned().collect()
    }

    /// List all definitions
    #[must_use]
    pub fn list_definitions(&self) -> Vec<&CapabilityDefinition> {
        self.definitions.values().collect()
    }

    /// List enabled capability names in a category
    #[must_use]
    pub fn list_by_category(&self, category: CapabilityCategory) -> Vec<String> {
        self.definitions
            .values()
            .filter(|d| d.category == category && d.enabled)
            .map(|d| d.name.clone())
            .collect()
    }

    /// Check whether any enabled capability exists in a category
    #[must_use]
    pub fn has_category(&self, category: CapabilityCategory) -> bool {
        !self.list_by_category(category).is_empty()
    }

    /// Enable a capability
    pub fn enable(&mut self, name: &str) -> bool {
        if let Some(def) = self.definitions.get_mut(name) {
            def.enabled = true;
            true
        } else {
            false
        }
    }

    /// Disable a capability
    pub fn disable(&mut self, name: &str) -> bool {
        if let Some(def) = self.definitions.get_mut(name) {
            def.enabled = false;
            true
        } else {
            false
        }
    }

    /// Capability count
    #[must_use]
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Check if the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Invoke a capability by name with the given input
    pub async fn invoke(&self, name: &str, input: serde_json::Value) -> Result<serde_json::Value> {
        let capability = self
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        if !self
            .definitions
            .get(name)
            .map(|d| d.enabled)
            .unwrap_or(false)
        {
            return Err(Error::Disabled(name.to_string()));
        }

        capability.invoke(input).await
    }
}
