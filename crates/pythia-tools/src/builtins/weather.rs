//! Weather capability — wttr.in text API (no API key required)

use crate::error::{Error, Result};
use crate::registry::{Capability, CapabilityCategory, CapabilityDefinition};
use std::time::Duration;
use tracing::debug;

/// HTTP timeout for the weather request
const WEATHER_TIMEOUT: Duration = Duration::from_secs(10);

/// Weather lookup via the wttr.in one-line text format.
pub struct WeatherCapability {
    client: reqwest::Client,
    definition: CapabilityDefinition,
}

impl WeatherCapability {
    /// Create a new weather capability.
    #[must_use]
    pub fn new() -> Self {
        let definition = CapabilityDefinition::new(
            "weather",
            "Get current weather conditions for a location. \
             Input is a city or place name.",
        )
        .with_category(CapabilityCategory::Weather)
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "input": {
                    "type": "string",
                    "description": "City or place name, e.g. 'Paris'"
                }
            },
            "required": ["input"]
        }));

        let client = reqwest::Client::builder()
            .timeout(WEATHER_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self { client, definition }
    }
}

impl Default for WeatherCapability {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Capability for WeatherCapability {
    fn definition(&self) -> &CapabilityDefinition {
        &self.definition
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<serde_json::Value> {
        let location = input
            .get("input")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::InvalidInput("Missing 'input' parameter".to_string()))?;

        // %l = location, %C = condition, %t = temperature, %h = humidity, %w = wind
        let url = format!(
            "https://wttr.in/{}?format=%l:+%C,+%t,+humidity+%h,+wind+%w",
            location.replace(' ', "+")
        );

        debug!(location = %location, "Fetching weather");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("weather request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Execution(format!(
                "weather service returned status {}",
                response.status()
            )));
        }

        let report = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(serde_json::json!({
            "location": location,
            "report": report.trim(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition() {
        let capability = WeatherCapability::new();
        let def = capability.definition();
        assert_eq!(def.name, "weather");
        assert_eq!(def.category, CapabilityCategory::Weather);
    }

    #[tokio::test]
    async fn test_missing_location() {
        let capability = WeatherCapability::new();
        assert!(capability.invoke(serde_json::json!({})).await.is_err());
        assert!(capability
            .invoke(serde_json::json!({"input": "   "}))
            .await
            .is_err());
    }
}
