//! Phase 5: Formatting
//!
//! Maps the final draft into a [`FinalOutput`] for the requested format.
//! Text needs no collaborator; PDF and hosted documents fail with
//! [`PipelineError::ToolNotConfigured`] when their renderer is absent.

use doc_orchestrator_sdk::{async_trait, log_agent_complete, log_agent_failed, log_agent_start};
use serde_json::json;
use std::sync::Arc;

use crate::error::{PipelineError, Result, Tool};
use crate::pipeline::messages::{AgentMessage, AgentRole, FormattingInput, PhaseAgent};
use crate::pipeline::types::{Artifact, Draft, FinalOutput, Metadata, OutputFormat};
use crate::tools::{HostedDocRenderer, PdfRenderer};

/// Longest filename stem derived from a topic
pub const MAX_FILENAME_LEN: usize = 50;

const DEFAULT_FILENAME: &str = "document";
const DEFAULT_TITLE: &str = "Document";

/// Derive a filesystem-safe filename stem from a topic.
///
/// Lowercases, turns spaces into `_`, drops everything outside
/// `[a-z0-9_.-]` and truncates to [`MAX_FILENAME_LEN`].
pub fn sanitize_filename(topic: &str) -> String {
    let stem: String = topic
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.'))
        .take(MAX_FILENAME_LEN)
        .collect();

    if stem.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        stem
    }
}

fn base_metadata(topic: &str, draft: &Draft) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("topic".to_string(), json!(topic));
    metadata.insert("version".to_string(), json!(draft.version));
    metadata
}

pub struct FormattingAgent {
    pdf: Option<Arc<dyn PdfRenderer>>,
    hosted_docs: Option<Arc<dyn HostedDocRenderer>>,
}

impl FormattingAgent {
    pub fn new(
        pdf: Option<Arc<dyn PdfRenderer>>,
        hosted_docs: Option<Arc<dyn HostedDocRenderer>>,
    ) -> Self {
        Self { pdf, hosted_docs }
    }

    /// Formats this agent can produce with its current renderers
    pub fn supported_formats(&self) -> Vec<OutputFormat> {
        OutputFormat::ALL
            .into_iter()
            .filter(|format| match format {
                OutputFormat::Text => true,
                OutputFormat::Pdf => self.pdf.is_some(),
                OutputFormat::HostedDoc => self.hosted_docs.is_some(),
            })
            .collect()
    }

    async fn format(&self, input: &FormattingInput) -> Result<FinalOutput> {
        let FormattingInput {
            draft,
            topic,
            format,
        } = input;
        let mut metadata = base_metadata(topic, draft);

        let artifact = match format {
            OutputFormat::Text => Artifact::Content(draft.content.clone()),

            OutputFormat::Pdf => {
                let renderer = self.pdf.as_ref().ok_or(PipelineError::ToolNotConfigured {
                    tool: Tool::PdfRenderer,
                })?;
                let rendered = renderer
                    .render(&draft.content, &sanitize_filename(topic), topic)
                    .await
                    .map_err(|e| PipelineError::tool(Tool::PdfRenderer, e))?;

                metadata.insert("filename".to_string(), json!(rendered.filename));
                metadata.insert("size".to_string(), json!(rendered.size));
                Artifact::FilePath(rendered.file_path)
            }

            OutputFormat::HostedDoc => {
                let renderer =
                    self.hosted_docs
                        .as_ref()
                        .ok_or(PipelineError::ToolNotConfigured {
                            tool: Tool::HostedDocRenderer,
                        })?;
                let title = if topic.trim().is_empty() {
                    DEFAULT_TITLE
                } else {
                    topic.as_str()
                };
                let document = renderer
                    .create(title, &draft.content)
                    .await
                    .map_err(|e| PipelineError::tool(Tool::HostedDocRenderer, e))?;

                metadata.insert("document_id".to_string(), json!(document.id));
                metadata.insert("title".to_string(), json!(document.title));
                Artifact::Url(document.url)
            }
        };

        Ok(FinalOutput {
            format: *format,
            artifact,
            metadata,
        })
    }
}

#[async_trait]
impl PhaseAgent for FormattingAgent {
    type Input = FormattingInput;
    type Output = FinalOutput;

    fn role(&self) -> AgentRole {
        AgentRole::Formatting
    }

    async fn process(&self, message: AgentMessage<FormattingInput>) -> Result<FinalOutput> {
        let agent = self.role();
        let input = message.data;

        log_agent_start!(
            "format",
            agent,
            format!("Formatting draft v{} as {}", input.draft.version, input.format)
        );

        match self.format(&input).await {
            Ok(output) => {
                log_agent_complete!("format", agent, output.format);
                Ok(output)
            }
            Err(e) => {
                log_agent_failed!("format", agent, &e);
                Err(e)
            }
        }
    }
}
