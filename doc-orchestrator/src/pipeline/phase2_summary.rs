//! Phase 2: Summary
//!
//! Condenses research results (and optional local files) into
//! [`StructuredNotes`] with two LLM calls: a prose summary, then key points
//! extracted from that summary.

use doc_orchestrator_sdk::{async_trait, log_agent_complete, log_agent_failed, log_agent_start};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result, Tool};
use crate::pipeline::messages::{AgentMessage, AgentRole, PhaseAgent, SummaryInput};
use crate::pipeline::types::{Metadata, RawData, StructuredNotes};
use crate::tools::{FileReader, LlmGateway};

const SUMMARY_TEMPERATURE: f32 = 0.5;
const KEY_POINTS_TEMPERATURE: f32 = 0.3;

const SECTION_SEPARATOR: &str = "\n---\n\n";

const SUMMARY_SYSTEM_PROMPT: &str = "You are a summarization expert. Analyze the provided research \
content and create a comprehensive structured summary. Extract key points and organize the \
information clearly. Return a well-structured summary with main points and insights.";

const KEY_POINTS_SYSTEM_PROMPT: &str =
    "Extract key points from text. Return only the points, one per line.";

/// Research content joined into one corpus, plus the contributing URLs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Corpus {
    pub text: String,
    pub source_urls: Vec<String>,
}

/// Join every source with content into one corpus.
///
/// Sources with empty content are left out entirely. URLs are de-duplicated
/// in first-seen order and empty URLs are not listed.
pub fn build_corpus(raw_data: &RawData) -> Corpus {
    let mut sections = Vec::new();
    let mut source_urls: Vec<String> = Vec::new();

    for source in raw_data.sources.iter().filter(|s| !s.content.is_empty()) {
        sections.push(format!(
            "Source: {}\nURL: {}\n\n{}\n",
            source.title, source.url, source.content
        ));
        if !source.url.is_empty() && !source_urls.contains(&source.url) {
            source_urls.push(source.url.clone());
        }
    }

    Corpus {
        text: sections.join(SECTION_SEPARATOR),
        source_urls,
    }
}

/// One key point per non-empty line
pub fn parse_key_points(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct SummaryAgent {
    llm: Arc<dyn LlmGateway>,
    files: Arc<dyn FileReader>,
}

impl SummaryAgent {
    pub fn new(llm: Arc<dyn LlmGateway>, files: Arc<dyn FileReader>) -> Self {
        Self { llm, files }
    }

    /// Text of every readable local file; binary files and read errors are skipped.
    async fn read_local_files(&self, paths: &[PathBuf]) -> String {
        let mut local = String::new();

        for path in paths {
            let shown = path.display().to_string();
            match self.files.read(&shown).await {
                Ok(data) => match data.text() {
                    Some(text) => {
                        local.push_str(&format!("\n\nLocal File: {}\n{}\n", shown, text));
                    }
                    None => debug!(path = %shown, "skipping binary file"),
                },
                Err(e) => warn!(path = %shown, error = %e, "failed to read local file, skipping"),
            }
        }

        local
    }

    async fn summarize(&self, corpus: &str, local: &str) -> Result<(String, Vec<String>)> {
        let user_prompt = format!(
            "Research Content:\n{}\n{}\n\nCreate a structured summary with:\n\
             1. A comprehensive summary paragraph\n\
             2. Key points (as a bulleted list)\n\
             3. Important insights and findings",
            corpus, local
        );
        let summary = self
            .llm
            .complete(SUMMARY_SYSTEM_PROMPT, &user_prompt, SUMMARY_TEMPERATURE)
            .await
            .map_err(|e| PipelineError::tool(Tool::Llm, e))?;

        let key_points_prompt = format!(
            "From the following summary, extract the key points as a simple list, one point per line:\n\n{}\n\nKey points:",
            summary
        );
        let key_points = self
            .llm
            .complete(
                KEY_POINTS_SYSTEM_PROMPT,
                &key_points_prompt,
                KEY_POINTS_TEMPERATURE,
            )
            .await
            .map_err(|e| PipelineError::tool(Tool::Llm, e))?;

        Ok((summary, parse_key_points(&key_points)))
    }
}

#[async_trait]
impl PhaseAgent for SummaryAgent {
    type Input = SummaryInput;
    type Output = StructuredNotes;

    fn role(&self) -> AgentRole {
        AgentRole::Summary
    }

    async fn process(&self, message: AgentMessage<SummaryInput>) -> Result<StructuredNotes> {
        let agent = self.role();
        let SummaryInput {
            raw_data,
            local_files,
        } = message.data;

        log_agent_start!(
            "summary",
            agent,
            format!(
                "Summarizing {} sources and {} local files",
                raw_data.sources.len(),
                local_files.len()
            )
        );

        let corpus = build_corpus(&raw_data);
        let local = self.read_local_files(&local_files).await;

        let (summary, key_points) = match self.summarize(&corpus.text, &local).await {
            Ok(result) => result,
            Err(e) => {
                log_agent_failed!("summary", agent, &e);
                return Err(e);
            }
        };

        let mut metadata = Metadata::new();
        metadata.insert("num_sources".to_string(), json!(corpus.source_urls.len()));
        metadata.insert("search_queries".to_string(), json!(raw_data.search_queries));

        log_agent_complete!("summary", agent, format!("{} key points", key_points.len()));

        Ok(StructuredNotes {
            summary,
            key_points,
            sources: corpus.source_urls,
            metadata,
        })
    }
}
