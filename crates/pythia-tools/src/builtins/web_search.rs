//! Web search capability — DuckDuckGo HTML scraping (no API key required)

use crate::error::{Error, Result};
use crate::registry::{Capability, CapabilityCategory, CapabilityDefinition};
use regex::Regex;
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum number of search results to return
const MAX_RESULTS_CAP: usize = 10;

/// Default number of results
const DEFAULT_MAX_RESULTS: usize = 5;

/// HTTP timeout for the search request
const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

/// User-Agent header to avoid bot blocking
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A single search result entry.
#[derive(Debug, Clone, serde::Serialize)]
struct SearchResult {
    title: String,
    url: String,
    snippet: String,
}

/// DuckDuckGo HTML-based web search capability.
///
/// Callers pass only a `query` string — the capability builds the request
/// internally, so query text never has to be URL-escaped upstream.
pub struct WebSearchCapability {
    client: reqwest::Client,
    definition: CapabilityDefinition,
}

impl WebSearchCapability {
    /// Create a new web search capability.
    #[must_use]
    pub fn new() -> Self {
        let definition = CapabilityDefinition::new(
            "web_search",
            "Search the web using DuckDuckGo. Returns titles, URLs, and snippets. \
             Use this for real-time information like news, prices, and any query \
             that requires up-to-date web results.",
        )
        .with_category(CapabilityCategory::Search)
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "input": {
                    "type": "string",
                    "description": "Search query string"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return (1-10, default 5)"
                }
            },
            "required": ["input"]
        }));

        let client = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self { client, definition }
    }

    /// Fetch and parse DuckDuckGo HTML search results.
    ///
    /// Uses POST to avoid the CAPTCHA DuckDuckGo shows for GET requests
    /// with non-ASCII queries.
    async fn fetch_results(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        debug!(query = %query, "Fetching DuckDuckGo search results");

        let response = self
            .client
            .post("https://html.duckduckgo.com/html/")
            .header("Referer", "https://html.duckduckgo.com/")
            .form(&[("q", query)])
            .send()
            .await
            .map_err(|e| Error::Network(format!("search request failed: {}", e)))?;

        let html = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if html.contains("anomaly-modal") {
            warn!("DuckDuckGo returned CAPTCHA page — bot detection triggered");
            return Err(Error::Network(
                "DuckDuckGo CAPTCHA triggered; search temporarily blocked".to_string(),
            ));
        }

        parse_search_results(&html, max_results)
    }
}

impl Default for WebSearchCapability {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Capability for WebSearchCapability {
    fn definition(&self) -> &CapabilityDefinition {
        &self.definition
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<serde_json::Value> {
        let query = input
            .get("input")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidInput("Missing 'input' parameter".to_string()))?;

        if query.trim().is_empty() {
            return Err(Error::InvalidInput("Query must not be empty".to_string()));
        }

        let max_results = input
            .get("max_results")
            .and_then(|v| v.as_u64())
            .map(|n| (n as usize).clamp(1, MAX_RESULTS_CAP))
            .unwrap_or(DEFAULT_MAX_RESULTS);

        let results = self.fetch_results(query, max_results).await?;
        let total = results.len();

        Ok(serde_json::json!({
            "query": query,
            "results": results,
            "total": total,
        }))
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Parse search results from DuckDuckGo HTML.
fn parse_search_results(html: &str, max_results: usize) -> Result<Vec<SearchResult>> {
    // DuckDuckGo wraps each result in <div class="result ...">
    // Title:   <a class="result__a" href="...">TITLE</a>
    // Snippet: <a class="result__snippet">SNIPPET</a>
    let title_re = Regex::new(r#"<a[^>]+class="result__a"[^>]+href="([^"]*)"[^>]*>(.*?)</a>"#)
        .expect("title regex");
    let snippet_re =
        Regex::new(r#"<a[^>]+class="result__snippet"[^>]*>(.*?)</a>"#).expect("snippet regex");

    let titles: Vec<(String, String)> = title_re
        .captures_iter(html)
        .map(|cap| {
            let raw_url = cap.get(1).map_or("", |m| m.as_str());
            let url = extract_real_url(raw_url);
            let title = strip_html_tags(cap.get(2).map_or("", |m| m.as_str()));
            (url, title)
        })
        .collect();

    let snippets: Vec<String> = snippet_re
        .captures_iter(html)
        .map(|cap| strip_html_tags(cap.get(1).map_or("", |m| m.as_str())))
        .collect();

    let results: Vec<SearchResult> = titles
        .into_iter()
        .enumerate()
        .take(max_results)
        .map(|(i, (url, title))| SearchResult {
            title,
            url,
            snippet: snippets.get(i).cloned().unwrap_or_default(),
        })
        .filter(|r| !r.url.is_empty() && !r.title.is_empty())
        .collect();

    Ok(results)
}

/// DuckDuckGo wraps URLs in a redirect: `//duckduckgo.com/l/?uddg=REAL_URL&...`
/// Extract the actual destination URL.
fn extract_real_url(raw: &str) -> String {
    if let Some(pos) = raw.find("uddg=") {
        let rest = &raw[pos + 5..];
        let end = rest.find('&').unwrap_or(rest.len());
        percent_decode(&rest[..end])
    } else {
        raw.to_string()
    }
}

/// Minimal percent-decoding for redirect URLs.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(byte) = u8::from_str_radix(&s[i + 1..i + 3], 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Remove HTML tags and decode common HTML entities.
fn strip_html_tags(s: &str) -> String {
    let tag_re = Regex::new(r"<[^>]+>").expect("tag regex");
    let stripped = tag_re.replace_all(s, "");
    stripped
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_tags() {
        assert_eq!(strip_html_tags("<b>hello</b> world"), "hello world");
        assert_eq!(strip_html_tags("a &amp; b"), "a & b");
        assert_eq!(strip_html_tags("no tags"), "no tags");
    }

    #[test]
    fn test_extract_real_url() {
        let raw = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=abc";
        assert_eq!(extract_real_url(raw), "https://example.com");

        // Direct URL (no redirect)
        assert_eq!(extract_real_url("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_parse_empty_html() {
        let results = parse_search_results("", 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_parse_sample_html() {
        let html = r#"
            <div class="result">
                <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com">Example Title</a>
                <a class="result__snippet">This is a snippet about example.</a>
            </div>
        "#;
        let results = parse_search_results(html, 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Example Title");
        assert_eq!(results[0].url, "https://example.com");
        assert_eq!(results[0].snippet, "This is a snippet about example.");
    }

    #[test]
    fn test_definition() {
        let capability = WebSearchCapability::new();
        let def = capability.definition();
        assert_eq!(def.name, "web_search");
        assert_eq!(def.category, CapabilityCategory::Search);
    }

    #[tokio::test]
    async fn test_missing_query() {
        let capability = WebSearchCapability::new();
        let result = capability.invoke(serde_json::json!({})).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_query() {
        let capability = WebSearchCapability::new();
        let result = capability.invoke(serde_json::json!({"input": "  "})).await;
        assert!(result.is_err());
    }
}
