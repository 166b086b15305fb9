//! Error types for the document pipeline.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Identity of a collaborator, used to say which tool failed or is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Llm,
    Search,
    FileReader,
    PdfRenderer,
    HostedDocRenderer,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tool::Llm => "LLM gateway",
            Tool::Search => "search provider",
            Tool::FileReader => "file reader",
            Tool::PdfRenderer => "PDF renderer",
            Tool::HostedDocRenderer => "hosted document renderer",
        };
        f.write_str(name)
    }
}

/// Errors raised by collaborators (LLM, search, files, renderers).
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Always stored without its request URL
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("{provider} returned HTTP {status}: {body}")]
    Provider {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {provider}: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },

    #[error("render failed: {0}")]
    Render(String),
}

// Request URLs are stripped before wrapping
impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        ToolError::Http(err.without_url())
    }
}

impl ToolError {
    /// True for the "file not found" condition of the file reader.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ToolError::NotFound(_))
    }
}

/// Errors while building or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors surfaced by the pipeline to its caller.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A phase needs a collaborator that was never provided.
    #[error("{tool} is not configured")]
    ToolNotConfigured { tool: Tool },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A collaborator call failed and the phase does not recover from it.
    #[error("{tool} call failed: {source}")]
    Tool {
        tool: Tool,
        #[source]
        source: ToolError,
    },
}

impl PipelineError {
    pub fn tool(tool: Tool, source: ToolError) -> Self {
        PipelineError::Tool { tool, source }
    }

    /// True for errors caused by missing or invalid setup rather than a failed call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PipelineError::ToolNotConfigured { .. } | PipelineError::Config(_)
        )
    }
}

/// Result type for collaborator calls.
pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
