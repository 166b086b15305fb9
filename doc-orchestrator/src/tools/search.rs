//! Tavily web search client

use doc_orchestrator_sdk::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::error::ToolResult;
use crate::pipeline::types::Source;
use crate::tools::llm::{build_client, check_status};
use crate::tools::SearchProvider;

const TAVILY_BASE_URL: &str = "https://api.tavily.com";

#[derive(Debug, Clone)]
pub struct TavilySearch {
    client: Client,
    api_key: String,
    search_depth: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: f64,
}

impl From<TavilyResult> for Source {
    fn from(result: TavilyResult) -> Self {
        Source::new(result.title, result.url, result.content).with_score(result.score)
    }
}

impl TavilySearch {
    pub fn new(
        api_key: impl Into<String>,
        search_depth: impl Into<String>,
        timeout: Duration,
    ) -> ToolResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key: api_key.into(),
            search_depth: search_depth.into(),
            base_url: TAVILY_BASE_URL.to_string(),
        })
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    async fn search(&self, query: &str, max_results: usize) -> ToolResult<Vec<Source>> {
        debug!(query, max_results, "tavily search");

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&json!({
                "api_key": self.api_key,
                "query": query,
                "max_results": max_results.max(1),
                "search_depth": self.search_depth,
            }))
            .send()
            .await?;
        let response = check_status("tavily", response).await?;
        let body: TavilyResponse = response.json().await?;

        Ok(body
            .results
            .into_iter()
            .take(max_results.max(1))
            .map(Source::from)
            .collect())
    }
}
