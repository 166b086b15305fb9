//! Google Docs renderer
//!
//! Creates an empty document, then inserts the body with a single
//! `batchUpdate`. Obtaining the OAuth access token is left to the caller.

use doc_orchestrator_sdk::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::error::{ToolError, ToolResult};
use crate::tools::llm::{build_client, check_status};
use crate::tools::{HostedDocRenderer, HostedDocument};

const DOCS_BASE_URL: &str = "https://docs.googleapis.com/v1";

#[derive(Debug, Clone)]
pub struct GoogleDocsRenderer {
    client: Client,
    access_token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDocument {
    #[serde(default)]
    document_id: Option<String>,
}

/// Public URL of a Google Doc
pub fn document_url(document_id: &str) -> String {
    format!("https://docs.google.com/document/d/{}", document_id)
}

impl GoogleDocsRenderer {
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> ToolResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            access_token: access_token.into(),
            base_url: DOCS_BASE_URL.to_string(),
        })
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl HostedDocRenderer for GoogleDocsRenderer {
    async fn create(&self, title: &str, content: &str) -> ToolResult<HostedDocument> {
        let response = self
            .client
            .post(format!("{}/documents", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&json!({ "title": title }))
            .send()
            .await?;
        let response = check_status("google docs", response).await?;
        let created: CreatedDocument = response.json().await?;
        let document_id = created.document_id.ok_or_else(|| ToolError::InvalidResponse {
            provider: "google docs",
            message: "create response has no documentId".to_string(),
        })?;

        debug!(document_id = %document_id, "document created");

        if !content.is_empty() {
            let response = self
                .client
                .post(format!(
                    "{}/documents/{}:batchUpdate",
                    self.base_url, document_id
                ))
                .bearer_auth(&self.access_token)
                .json(&json!({
                    "requests": [{
                        "insertText": {
                            "location": { "index": 1 },
                            "text": content,
                        }
                    }]
                }))
                .send()
                .await?;
            check_status("google docs", response).await?;
        }

        Ok(HostedDocument {
            url: document_url(&document_id),
            id: document_id,
            title: title.to_string(),
        })
    }
}
