//! Builtin capabilities
//!
//! These are the concrete capabilities the binary registers by default.
//! The engine only ever sees them through the `Capability` trait.

pub mod weather;
pub mod web_search;

pub use weather::WeatherCapability;
pub use web_search::WebSearchCapability;

use crate::registry::CapabilityRegistry;
use std::sync::Arc;

/// Build a registry with all builtin capabilities registered
#[must_use]
pub fn default_registry() -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::new();
    registry.register(Arc::new(WebSearchCapability::new()));
    registry.register(Arc::new(WeatherCapability::new()));
    registry
}
