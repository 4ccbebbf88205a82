//! Live web search backed by the Tavily API.
//!
//! The model requests `search_web` for anything time-sensitive (weather,
//! opening hours, events). Queries are enriched with the property's
//! locality so "weather tomorrow" searches near the guest, not globally.
//!
//! Failures here are never fatal: the orchestrator converts any error into
//! a neutral empty-result message.

use async_trait::async_trait;
use innkeep_core::error::SearchError;
use innkeep_core::tool::{Tool, ToolResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// How many results the search backend is asked for.
pub const DEFAULT_MAX_RESULTS: u32 = 3;

/// Thin client for the Tavily search API.
pub struct WebSearchClient {
    base_url: String,
    api_key: String,
    locality: String,
    max_results: u32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct SearchRequestBody<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: u32,
    include_answer: bool,
}

#[derive(Deserialize)]
struct SearchResponseBody {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchResultEntry>,
}

#[derive(Deserialize)]
struct SearchResultEntry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    url: String,
}

impl WebSearchClient {
    pub fn new(
        api_key: impl Into<String>,
        locality: impl Into<String>,
        max_results: u32,
    ) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SearchError::Network(e.to_string()))?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            locality: locality.into(),
            max_results,
            client,
        })
    }

    /// Override the API base URL (for tests / proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The query actually sent to the backend. Already-localized queries
    /// are passed through unchanged.
    fn enrich_query(&self, query: &str) -> String {
        let lower = query.to_lowercase();
        let already_localized = self
            .locality
            .split_whitespace()
            .any(|word| word.len() > 3 && lower.contains(&word.to_lowercase()));
        if already_localized {
            query.to_string()
        } else {
            format!("{query} {locality}", locality = self.locality)
        }
    }

    /// Run one search and format the result for the model.
    pub async fn search(&self, query: &str) -> Result<String, SearchError> {
        if self.api_key.is_empty() {
            return Err(SearchError::NotConfigured(
                "search API key not set".to_string(),
            ));
        }

        let enriched = self.enrich_query(query);
        debug!(query = %enriched, "web search");

        let body = SearchRequestBody {
            api_key: &self.api_key,
            query: &enriched,
            search_depth: "basic",
            max_results: self.max_results,
            include_answer: true,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let parsed: SearchResponseBody = response
            .json()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        Ok(format_results(&parsed))
    }
}

/// Render the backend response as plain text for the model. Prefers the
/// synthesized answer; falls back to result snippets. Never errors: an
/// empty result set becomes an explicit "no results" line.
fn format_results(response: &SearchResponseBody) -> String {
    let mut out = String::new();

    if let Some(answer) = response.answer.as_deref() {
        if !answer.trim().is_empty() {
            out.push_str(answer.trim());
        }
    }

    if out.is_empty() {
        if response.results.is_empty() {
            return "No results found.".to_string();
        }
        for entry in &response.results {
            out.push_str(&format!("- {}: {}\n", entry.title, entry.content));
        }
    }

    let sources: Vec<&str> = response
        .results
        .iter()
        .map(|r| r.url.as_str())
        .filter(|u| !u.is_empty())
        .collect();
    if !sources.is_empty() {
        out.push_str("\n\nSources:\n");
        for url in sources {
            out.push_str(&format!("- {url}\n"));
        }
    }

    out.trim_end().to_string()
}

/// The `search_web` tool exposed to the model.
pub struct WebSearchTool {
    client: WebSearchClient,
}

impl WebSearchTool {
    pub fn new(client: WebSearchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "search_web"
    }

    fn description(&self) -> &str {
        "Search the live web for current information: weather forecasts, \
         opening hours, prices, and events. Use for anything time-sensitive \
         that the house knowledge base cannot answer."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query, in any language"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, SearchError> {
        let query = arguments["query"].as_str().unwrap_or_default();
        if query.trim().is_empty() {
            return Ok(ToolResult {
                call_id: String::new(),
                success: false,
                output: "No results found.".to_string(),
            });
        }

        let output = self.client.search(query).await?;
        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> WebSearchClient {
        WebSearchClient::new("tvly-test", "Interlaken Switzerland", 3).unwrap()
    }

    #[test]
    fn query_is_enriched_with_locality() {
        let enriched = client().enrich_query("weather tomorrow");
        assert_eq!(enriched, "weather tomorrow Interlaken Switzerland");
    }

    #[test]
    fn localized_query_is_not_double_enriched() {
        let enriched = client().enrich_query("Restaurants in Interlaken");
        assert_eq!(enriched, "Restaurants in Interlaken");
    }

    #[test]
    fn answer_is_preferred_over_snippets() {
        let response = SearchResponseBody {
            answer: Some("Sunny, around 24 degrees.".into()),
            results: vec![SearchResultEntry {
                title: "Weather".into(),
                content: "Forecast details".into(),
                url: "https://example.com/weather".into(),
            }],
        };
        let text = format_results(&response);
        assert!(text.starts_with("Sunny, around 24 degrees."));
        assert!(text.contains("https://example.com/weather"));
        assert!(!text.contains("- Weather:"));
    }

    #[test]
    fn snippets_used_without_answer() {
        let response = SearchResponseBody {
            answer: None,
            results: vec![
                SearchResultEntry {
                    title: "Harder Kulm".into(),
                    content: "Open daily from 9:00.".into(),
                    url: "https://example.com/kulm".into(),
                },
                SearchResultEntry {
                    title: "Funicular".into(),
                    content: "Runs every 30 minutes.".into(),
                    url: String::new(),
                },
            ],
        };
        let text = format_results(&response);
        assert!(text.contains("- Harder Kulm: Open daily from 9:00."));
        assert!(text.contains("- Funicular: Runs every 30 minutes."));
        assert!(text.contains("https://example.com/kulm"));
    }

    #[test]
    fn empty_results_are_explicit() {
        let response = SearchResponseBody {
            answer: None,
            results: vec![],
        };
        assert_eq!(format_results(&response), "No results found.");
    }

    #[tokio::test]
    async fn missing_api_key_is_not_configured() {
        let client = WebSearchClient::new("", "Interlaken Switzerland", 3).unwrap();
        let err = client.search("weather").await.unwrap_err();
        assert!(matches!(err, SearchError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn blank_query_short_circuits() {
        let tool = WebSearchTool::new(client());
        let result = tool
            .execute(serde_json::json!({ "query": "  " }))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.output, "No results found.");
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        let unreachable = client().with_base_url("http://127.0.0.1:1");
        let err = unreachable.search("weather").await.unwrap_err();
        assert!(matches!(err, SearchError::Network(_)));
    }
}
