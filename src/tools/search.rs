use super::Tool;
use crate::error::ToolError;
use reqwest::Client;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

pub const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct WebSearchArgs {
    /// What to search the web for
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

pub struct WebSearchTool {
    client: Client,
    api_key: String,
    endpoint: String,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(api_key: impl Into<String>, max_results: usize) -> Result<Self, reqwest::Error> {
        Self::with_endpoint(api_key, TAVILY_SEARCH_URL, max_results)
    }

    pub fn with_endpoint(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        max_results: usize,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            max_results,
        })
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ToolError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({
                "api_key": self.api_key,
                "query": query,
                "max_results": self.max_results
            }))
            .send()
            .await
            .map_err(|e| ToolError::Search(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            return Err(ToolError::Search(format!("{status}: {body}")));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| ToolError::Search(e.to_string()))?;

        let mut results = parsed.results;
        results.truncate(self.max_results);
        Ok(results)
    }
}

#[async_trait::async_trait]
impl Tool for WebSearchTool {
    type Args = WebSearchArgs;
    const NAME: &'static str = "web_search";

    fn description(&self) -> &'static str {
        "Search the web for current information such as token contract addresses, prices and market news"
    }

    async fn call(&self, args: WebSearchArgs) -> Result<Value, ToolError> {
        let results = self.search(&args.query).await?;
        Ok(json!(results))
    }
}
