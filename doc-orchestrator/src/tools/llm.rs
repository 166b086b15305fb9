//! LLM gateways over HTTP
//!
//! Both gateways expose the same `(system, user, temperature) -> text`
//! contract. Missing text in a response is returned as an empty string.

use doc_orchestrator_sdk::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::error::{ToolError, ToolResult};
use crate::tools::LlmGateway;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Turn a non-success response into a [`ToolError::Provider`]
pub(crate) async fn check_status(
    provider: &'static str,
    response: reqwest::Response,
) -> ToolResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ToolError::Provider {
        provider,
        status: status.as_u16(),
        body,
    })
}

pub(crate) fn build_client(timeout: Duration) -> ToolResult<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

// ============================================================================
// Gemini
// ============================================================================

/// Google Gemini `generateContent` client
#[derive(Debug, Clone)]
pub struct GeminiGateway {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiResponse {
    /// Text parts of the first candidate, concatenated
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl GeminiGateway {
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";

    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> ToolResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    /// Point the gateway at a different endpoint (proxies, local mocks)
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn model_path(&self) -> String {
        if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        }
    }
}

#[async_trait]
impl LlmGateway for GeminiGateway {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> ToolResult<String> {
        // Gemini takes a single prompt; the system prompt leads it
        let full_prompt = format!("{}\n\n{}", system_prompt, user_prompt);
        let url = format!("{}/{}:generateContent", self.base_url, self.model_path());

        debug!(model = %self.model, temperature, prompt_len = full_prompt.len(), "gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({
                "contents": [{ "parts": [{ "text": full_prompt }] }],
                "generationConfig": { "temperature": temperature },
            }))
            .send()
            .await?;
        let response = check_status("gemini", response).await?;
        let body: GeminiResponse = response.json().await?;

        Ok(body.into_text())
    }
}

// ============================================================================
// Anthropic
// ============================================================================

/// Anthropic Messages API client
#[derive(Debug, Clone)]
pub struct AnthropicGateway {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicResponse {
    /// Concatenated `text` blocks; thinking and tool blocks are dropped
    fn into_text(self) -> String {
        self.content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect()
    }
}

impl AnthropicGateway {
    pub const DEFAULT_MODEL: &'static str = "claude-sonnet-4-5";

    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
        timeout: Duration,
    ) -> ToolResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key: api_key.into(),
            model: model.into(),
            max_tokens,
            base_url: ANTHROPIC_BASE_URL.to_string(),
        })
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LlmGateway for AnthropicGateway {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> ToolResult<String> {
        // Messages API accepts 0.0..=1.0
        let temperature = temperature.clamp(0.0, 1.0);
        debug!(model = %self.model, temperature, prompt_len = user_prompt.len(), "anthropic request");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "system": system_prompt,
                "temperature": temperature,
                "messages": [{ "role": "user", "content": user_prompt }],
            }))
            .send()
            .await?;
        let response = check_status("anthropic", response).await?;
        let body: AnthropicResponse = response.json().await?;

        Ok(body.into_text())
    }
}
