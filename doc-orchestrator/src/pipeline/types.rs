//! Data structures handed between pipeline phases.
//!
//! Every value here is an immutable snapshot once it leaves the phase that
//! produced it:
//!
//! 1. **RawData** - search results collected by the research phase
//! 2. **StructuredNotes** - LLM-condensed notes from the summary phase
//! 3. **Draft** - one versioned candidate document from the writer phase
//! 4. **QcFeedback** - the review verdict for exactly one draft
//! 5. **FinalOutput** - the terminal artifact returned to the caller

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::error::{PipelineError, Result};

/// Free-form metadata attached to notes, drafts and outputs.
pub type Metadata = serde_json::Map<String, Value>;

// ============================================================================
// Request Types
// ============================================================================

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Pdf,
    #[serde(alias = "google_docs")]
    HostedDoc,
}

/// Returned by the strict [`FromStr`] decode of [`OutputFormat`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown output format '{0}' (expected text, pdf or hosted_doc)")]
pub struct UnknownFormat(pub String);

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Text, OutputFormat::Pdf, OutputFormat::HostedDoc];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Pdf => "pdf",
            OutputFormat::HostedDoc => "hosted_doc",
        }
    }

    /// Decode a format string, falling back to [`OutputFormat::Text`] for
    /// anything unrecognized.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or(OutputFormat::Text)
    }
}

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "pdf" => Ok(OutputFormat::Pdf),
            "hosted_doc" | "google_docs" => Ok(OutputFormat::HostedDoc),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller wants: a topic and the format to deliver it in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub topic: String,
    pub format: OutputFormat,
}

impl DocumentRequest {
    /// Build a request, rejecting an empty topic.
    pub fn new(topic: impl Into<String>, format: OutputFormat) -> Result<Self> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "topic must not be empty".to_string(),
            ));
        }
        Ok(Self { topic, format })
    }
}

// ============================================================================
// Research Types
// ============================================================================

/// A single search hit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub content: String,

    #[serde(default, alias = "score")]
    pub relevance_score: f64,
}

impl Source {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            relevance_score: 0.0,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.relevance_score = score;
        self
    }
}

/// Raw data collected from research
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawData {
    /// Results of every successful query, in query order then result order
    #[serde(default)]
    pub sources: Vec<Source>,

    /// Queries that were issued
    #[serde(default)]
    pub search_queries: Vec<String>,
}

impl RawData {
    /// Wrap pasted text as a single source so it can be summarized directly.
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            sources: vec![Source::new("Pasted Content", "", content)],
            search_queries: Vec::new(),
        }
    }
}

// ============================================================================
// Summary / Writing Types
// ============================================================================

/// Structured notes from the summary phase
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructuredNotes {
    /// Main summary of the research
    pub summary: String,

    /// Key points extracted from the summary
    #[serde(default)]
    pub key_points: Vec<String>,

    /// URLs of sources that contributed content
    #[serde(default)]
    pub sources: Vec<String>,

    #[serde(default)]
    pub metadata: Metadata,
}

/// A versioned document body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub content: String,

    /// Starts at 1, assigned by the orchestrator
    pub version: u32,

    #[serde(default)]
    pub metadata: Metadata,
}

/// Tone and length guidance for blog-style writing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleInstructions {
    pub tone: String,
    pub target_words: u32,
    pub include_intro: bool,
    pub include_conclusion: bool,
}

impl Default for StyleInstructions {
    fn default() -> Self {
        Self {
            tone: "Professional".to_string(),
            target_words: 1000,
            include_intro: true,
            include_conclusion: true,
        }
    }
}

impl StyleInstructions {
    /// Render the instructions as a prompt section.
    pub fn render(&self, topic: &str) -> String {
        format!(
            "Write a blog post about: {topic}\n\
             Tone: {}\n\
             Target length: {} words\n\
             Include introduction: {}\n\
             Include conclusion: {}\n\
             Make it engaging, well-structured, and suitable for a blog audience.",
            self.tone,
            self.target_words,
            yes_no(self.include_intro),
            yes_no(self.include_conclusion),
        )
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Verdict of one quality check
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QcFeedback {
    pub approved: bool,

    /// Revision guidance; `None` when the draft was approved on its merits
    #[serde(default)]
    pub feedback: Option<String>,

    #[serde(default)]
    pub issues: Vec<String>,

    /// Set when approval came from the iteration cap, not the reviewer
    #[serde(default)]
    pub forced_approval: bool,
}

// ============================================================================
// Output Types
// ============================================================================

/// Where the final document lives; exactly one per output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Artifact {
    Content(String),
    FilePath(PathBuf),
    Url(String),
}

/// The terminal artifact returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalOutput {
    pub format: OutputFormat,

    #[serde(flatten)]
    pub artifact: Artifact,

    #[serde(default)]
    pub metadata: Metadata,
}

impl FinalOutput {
    pub fn content(&self) -> Option<&str> {
        match &self.artifact {
            Artifact::Content(content) => Some(content),
            _ => None,
        }
    }

    pub fn file_path(&self) -> Option<&PathBuf> {
        match &self.artifact {
            Artifact::FilePath(path) => Some(path),
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.artifact {
            Artifact::Url(url) => Some(url),
            _ => None,
        }
    }
}
