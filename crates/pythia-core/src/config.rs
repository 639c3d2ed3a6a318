//! Engine configuration
//!
//! `ResearchConfig` is an immutable per-run snapshot of the engine's
//! bounded knobs. Validation reports every violated constraint; it never
//! silently clamps a value.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Which capability class the research workers prefer for search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPreference {
    /// Take whatever search capability is available (priority order)
    Auto,
    /// Prefer live web search capabilities
    Web,
    /// Prefer local document search capabilities
    Documents,
}

impl SearchPreference {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Web => "web",
            Self::Documents => "documents",
        }
    }
}

/// A single violated configuration constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigViolation {
    /// Name of the offending knob
    pub field: &'static str,
    /// What the constraint is and what value was given
    pub message: String,
}

impl std::fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Immutable per-run engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Validator retry budget (1-10)
    pub max_structured_output_retries: u32,
    /// Enable/disable the clarification stage
    pub allow_clarification: bool,
    /// Research fan-out width (1-20)
    pub max_concurrent_research_units: usize,
    /// Supervisor cycle budget (1-10)
    pub max_researcher_iterations: u32,
    /// Per-topic tool-call budget (1-30)
    pub max_react_tool_calls: u32,
    /// Which search capability class to prefer
    pub search_preference: SearchPreference,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_structured_output_retries: 3,
            allow_clarification: true,
            max_concurrent_research_units: 3,
            max_researcher_iterations: 3,
            max_react_tool_calls: 10,
            search_preference: SearchPreference::Auto,
        }
    }
}

impl ResearchConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the validator retry budget
    #[must_use]
    pub fn with_structured_output_retries(mut self, retries: u32) -> Self {
        self.max_structured_output_retries = retries;
        self
    }

    /// Enable or disable the clarification stage
    #[must_use]
    pub fn with_clarification(mut self, allow: bool) -> Self {
        self.allow_clarification = allow;
        self
    }

    /// Set the fan-out width
    #[must_use]
    pub fn with_concurrent_research_units(mut self, units: usize) -> Self {
        self.max_concurrent_research_units = units;
        self
    }

    /// Set the supervisor cycle budget
    #[must_use]
    pub fn with_researcher_iterations(mut self, iterations: u32) -> Self {
        self.max_researcher_iterations = iterations;
        self
    }

    /// Set the per-topic tool-call budget
    #[must_use]
    pub fn with_react_tool_calls(mut self, calls: u32) -> Self {
        self.max_react_tool_calls = calls;
        self
    }

    /// Set the search capability preference
    #[must_use]
    pub fn with_search_preference(mut self, preference: SearchPreference) -> Self {
        self.search_preference = preference;
        self
    }

    /// Validate every bounded knob, returning the complete list of
    /// violated constraints. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigViolation> {
        let mut violations = Vec::new();

        if !(1..=10).contains(&self.max_structured_output_retries) {
            violations.push(ConfigViolation {
                field: "max_structured_output_retries",
                message: format!(
                    "must be between 1 and 10, got {}",
                    self.max_structured_output_retries
                ),
            });
        }

        if !(1..=20).contains(&self.max_concurrent_research_units) {
            violations.push(ConfigViolation {
                field: "max_concurrent_research_units",
                message: format!(
                    "must be between 1 and 20, got {}",
                    self.max_concurrent_research_units
                ),
            });
        }

        if !(1..=10).contains(&self.max_researcher_iterations) {
            violations.push(ConfigViolation {
                field: "max_researcher_iterations",
                message: format!(
                    "must be between 1 and 10, got {}",
                    self.max_researcher_iterations
                ),
            });
        }

        if !(1..=30).contains(&self.max_react_tool_calls) {
            violations.push(ConfigViolation {
                field: "max_react_tool_calls",
                message: format!("must be between 1 and 30, got {}", self.max_react_tool_calls),
            });
        }

        violations
    }

    /// Validate and convert any violations into a configuration error
    pub fn ensure_valid(&self) -> Result<()> {
        let violations = self.validate();
        if violations.is_empty() {
            Ok(())
        } else {
            let joined = violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            Err(Error::Configuration(joined))
        }
    }
}
