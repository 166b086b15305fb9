//! Collaborators the pipeline calls but does not own.
//!
//! Every tool is an async trait object so phases can be driven by real HTTP
//! clients in production and by scripted stubs in tests:
//! - **llm**: text completion (Gemini, Anthropic)
//! - **search**: web search returning ranked snippets (Tavily)
//! - **filesystem**: local file reads
//! - **pdf**: PDF rendering (printpdf)
//! - **hosted_doc**: hosted document creation (Google Docs)

pub mod filesystem;
pub mod hosted_doc;
pub mod llm;
pub mod pdf;
pub mod search;

use doc_orchestrator_sdk::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ToolResult;
use crate::pipeline::types::Source;

pub use filesystem::LocalFileReader;
pub use hosted_doc::GoogleDocsRenderer;
pub use llm::{AnthropicGateway, GeminiGateway};
pub use pdf::PrintPdfRenderer;
pub use search::TavilySearch;

/// A single text-completion call
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Returns the completion text; an empty completion is `""`, never absent.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> ToolResult<String>;
}

/// Web search returning ranked snippets
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> ToolResult<Vec<Source>>;
}

/// Body of a file read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Binary(Vec<u8>),
}

/// Result of [`FileReader::read`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileData {
    pub path: PathBuf,
    pub content: FileContent,
    pub size: usize,
}

impl FileData {
    pub fn is_binary(&self) -> bool {
        matches!(self.content, FileContent::Binary(_))
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            FileContent::Text(text) => Some(text),
            FileContent::Binary(_) => None,
        }
    }
}

/// Local file access
#[async_trait]
pub trait FileReader: Send + Sync {
    /// Fails with [`crate::error::ToolError::NotFound`] for a missing path.
    async fn read(&self, path: &str) -> ToolResult<FileData>;
}

/// Where a rendered PDF ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPdf {
    pub file_path: PathBuf,
    pub filename: String,
    pub size: u64,
}

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, content: &str, filename: &str, title: &str) -> ToolResult<RenderedPdf>;
}

/// A document created on a hosting service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedDocument {
    pub id: String,
    pub url: String,
    pub title: String,
}

#[async_trait]
pub trait HostedDocRenderer: Send + Sync {
    async fn create(&self, title: &str, content: &str) -> ToolResult<HostedDocument>;
}
