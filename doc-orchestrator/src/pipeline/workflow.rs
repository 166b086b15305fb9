//! Orchestration of the document pipeline
//!
//! The [`Orchestrator`] drives the fixed phase sequence:
//!
//! 1. **Research** - generate queries and collect search results
//! 2. **Summary** - condense results (plus local files) into notes
//! 3. **Writing** and 4. **Quality Check** - the bounded revision loop
//! 5. **Formatting** - turn the last draft into the requested artifact
//!
//! Every collaborator is injected through [`OrchestratorBuilder`]. The
//! orchestrator holds no per-run state, so one instance can serve concurrent
//! runs.
//!
//! # Examples
//!
//! ```no_run
//! use doc_orchestrator::{Orchestrator, OrchestratorConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = OrchestratorConfig::from_env()?;
//! let orchestrator = Orchestrator::from_config(&config)?;
//!
//! let output = orchestrator.run("Quantum Computing", "text", &[]).await?;
//! println!("{}", output.content().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use doc_orchestrator_sdk::{
    log_iteration, log_phase_complete, log_phase_complete_console, log_phase_failed,
    log_phase_start, log_phase_start_console, log_review_verdict, log_run_complete,
    log_run_start, log_warning, RunHandle,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{LlmProvider, OrchestratorConfig, DEFAULT_MAX_ITERATIONS};
use crate::error::{ConfigError, PipelineError, Result, Tool};
use crate::pipeline::messages::{
    AgentMessage, AgentRole, FormattingInput, Phase, PhaseAgent, QcInput, ResearchInput,
    SummaryInput, WriterInput, TOTAL_PHASES,
};
use crate::pipeline::phase1_research::ResearchAgent;
use crate::pipeline::phase2_summary::SummaryAgent;
use crate::pipeline::phase3_write::WriterAgent;
use crate::pipeline::phase4_qc::QcAgent;
use crate::pipeline::phase5_format::FormattingAgent;
use crate::pipeline::qc_verdict::{ApprovalMatch, QcVerdictParser};
use crate::pipeline::types::{
    DocumentRequest, Draft, FinalOutput, OutputFormat, QcFeedback, RawData, StructuredNotes,
    StyleInstructions,
};
use crate::tools::{
    AnthropicGateway, FileReader, GeminiGateway, GoogleDocsRenderer, HostedDocRenderer,
    LlmGateway, LocalFileReader, PdfRenderer, PrintPdfRenderer, SearchProvider, TavilySearch,
};

/// Everything a completed run produced, oldest draft first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run: RunHandle,
    pub notes: StructuredNotes,
    /// One entry per loop iteration; versions are 1, 2, ... in order
    pub drafts: Vec<Draft>,
    /// `reviews[i]` is the verdict on `drafts[i]`
    pub reviews: Vec<QcFeedback>,
    pub output: FinalOutput,
}

impl RunReport {
    pub fn iterations(&self) -> u32 {
        self.drafts.len() as u32
    }

    /// The draft that was formatted
    pub fn final_draft(&self) -> Option<&Draft> {
        self.drafts.last()
    }
}

/// A single-pass blog post request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogRequest {
    pub topic: String,
    #[serde(default)]
    pub style: StyleInstructions,
}

impl BlogRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            style: StyleInstructions::default(),
        }
    }

    pub fn style(mut self, style: StyleInstructions) -> Self {
        self.style = style;
        self
    }
}

/// Result of [`Orchestrator::write_blog`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub draft: Draft,
    pub review: QcFeedback,
    pub notes: StructuredNotes,
}

pub struct Orchestrator {
    research: ResearchAgent,
    summary: SummaryAgent,
    writer: WriterAgent,
    qc: QcAgent,
    formatting: FormattingAgent,
}

/// Collects collaborators for an [`Orchestrator`]
///
/// The LLM gateway and search provider are required. The file reader
/// defaults to a [`LocalFileReader`] rooted at the working directory;
/// renderers are optional and only checked when their format is requested.
pub struct OrchestratorBuilder {
    llm: Option<Arc<dyn LlmGateway>>,
    search: Option<Arc<dyn SearchProvider>>,
    file_reader: Option<Arc<dyn FileReader>>,
    pdf: Option<Arc<dyn PdfRenderer>>,
    hosted_docs: Option<Arc<dyn HostedDocRenderer>>,
    max_iterations: u32,
    approval_match: ApprovalMatch,
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self {
            llm: None,
            search: None,
            file_reader: None,
            pdf: None,
            hosted_docs: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            approval_match: ApprovalMatch::default(),
        }
    }
}

impl OrchestratorBuilder {
    pub fn llm(mut self, llm: Arc<dyn LlmGateway>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn file_reader(mut self, file_reader: Arc<dyn FileReader>) -> Self {
        self.file_reader = Some(file_reader);
        self
    }

    pub fn pdf_renderer(mut self, pdf: Arc<dyn PdfRenderer>) -> Self {
        self.pdf = Some(pdf);
        self
    }

    pub fn hosted_doc_renderer(mut self, hosted_docs: Arc<dyn HostedDocRenderer>) -> Self {
        self.hosted_docs = Some(hosted_docs);
        self
    }

    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn approval_match(mut self, approval_match: ApprovalMatch) -> Self {
        self.approval_match = approval_match;
        self
    }

    /// Build concrete collaborators from configuration.
    pub fn from_config(config: &OrchestratorConfig) -> Result<Self> {
        config.validate()?;

        let llm: Arc<dyn LlmGateway> = match config.llm.provider {
            LlmProvider::Gemini => Arc::new(
                GeminiGateway::new(&config.llm.api_key, config.model(), config.llm.timeout())
                    .map_err(|e| PipelineError::tool(Tool::Llm, e))?,
            ),
            LlmProvider::Anthropic => Arc::new(
                AnthropicGateway::new(
                    &config.llm.api_key,
                    config.model(),
                    config.llm.max_tokens,
                    config.llm.timeout(),
                )
                .map_err(|e| PipelineError::tool(Tool::Llm, e))?,
            ),
        };

        let mut builder = Self::default()
            .llm(llm)
            .file_reader(Arc::new(LocalFileReader::new(
                config.base_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
            )))
            .pdf_renderer(Arc::new(PrintPdfRenderer::new(config.output_dir.clone())))
            .max_iterations(config.max_iterations)
            .approval_match(config.approval_match);

        if let Some(search) = &config.search {
            let provider =
                TavilySearch::new(&search.api_key, &search.search_depth, search.timeout())
                    .map_err(|e| PipelineError::tool(Tool::Search, e))?;
            builder = builder.search(Arc::new(provider));
        }

        if let Some(docs) = &config.hosted_docs {
            let renderer = GoogleDocsRenderer::new(&docs.access_token, docs.timeout())
                .map_err(|e| PipelineError::tool(Tool::HostedDocRenderer, e))?;
            builder = builder.hosted_doc_renderer(Arc::new(renderer));
        }

        Ok(builder)
    }

    pub fn build(self) -> Result<Orchestrator> {
        let llm = self
            .llm
            .ok_or(PipelineError::ToolNotConfigured { tool: Tool::Llm })?;
        let search = self
            .search
            .ok_or(PipelineError::ToolNotConfigured { tool: Tool::Search })?;
        if self.max_iterations == 0 {
            return Err(ConfigError::Invalid {
                field: "max_iterations",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        let file_reader = self
            .file_reader
            .unwrap_or_else(|| Arc::new(LocalFileReader::new(".")));

        Ok(Orchestrator {
            research: ResearchAgent::new(llm.clone(), search),
            summary: SummaryAgent::new(llm.clone(), file_reader),
            writer: WriterAgent::new(llm.clone()),
            qc: QcAgent::new(llm)
                .max_iterations(self.max_iterations)
                .parser(QcVerdictParser::new(self.approval_match)),
            formatting: FormattingAgent::new(self.pdf, self.hosted_docs),
        })
    }
}

/// Run one phase between start/complete (or failed) events.
async fn in_phase<T, F>(phase: Phase, description: &str, work: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    log_phase_start!(phase.number(), phase.name(), TOTAL_PHASES);
    log_phase_start_console!(phase.number(), phase.name(), description);

    match work.await {
        Ok(value) => {
            log_phase_complete!(phase.number(), phase.name());
            log_phase_complete_console!(phase.number());
            Ok(value)
        }
        Err(e) => {
            log_phase_failed!(phase.number(), phase.name(), &e);
            Err(e)
        }
    }
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    pub fn from_config(config: &OrchestratorConfig) -> Result<Self> {
        OrchestratorBuilder::from_config(config)?.build()
    }

    /// Writer/QC round trips before the draft is force-approved
    pub fn max_iterations(&self) -> u32 {
        self.qc.max_iterations_value()
    }

    pub fn supported_formats(&self) -> Vec<OutputFormat> {
        self.formatting.supported_formats()
    }

    /// Generate a document from a topic and an untyped format string.
    ///
    /// Unknown formats fall back to text; a blank topic is rejected.
    pub async fn run(
        &self,
        topic: &str,
        format: &str,
        local_files: &[PathBuf],
    ) -> Result<FinalOutput> {
        let request = DocumentRequest::new(topic, OutputFormat::parse_lenient(format))?;
        self.process(request, local_files).await
    }

    pub async fn process(
        &self,
        request: DocumentRequest,
        local_files: &[PathBuf],
    ) -> Result<FinalOutput> {
        Ok(self.process_with_report(request, local_files).await?.output)
    }

    /// Full run keeping every draft and review.
    pub async fn process_with_report(
        &self,
        request: DocumentRequest,
        local_files: &[PathBuf],
    ) -> Result<RunReport> {
        let run = RunHandle::new(&request.topic);
        log_run_start!(run.id, &request.topic, request.format);
        info!(run_id = %run.id, topic = %request.topic, format = %request.format, "starting run");

        let raw_data = self.research(&request).await?;
        let notes = self.summarize(raw_data, local_files.to_vec()).await?;
        self.finish(run, request, notes).await
    }

    /// Skip research and summary, starting from previously saved notes.
    pub async fn run_from_notes(
        &self,
        request: DocumentRequest,
        notes: StructuredNotes,
    ) -> Result<RunReport> {
        let run = RunHandle::new(&request.topic);
        log_run_start!(run.id, &request.topic, request.format);
        info!(run_id = %run.id, "resuming from saved notes");

        self.finish(run, request, notes).await
    }

    /// Research and summarize a topic without writing anything.
    pub async fn summarize_topic(&self, topic: &str) -> Result<StructuredNotes> {
        let request = DocumentRequest::new(topic, OutputFormat::Text)?;
        let raw_data = self.research(&request).await?;
        self.summarize(raw_data, Vec::new()).await
    }

    /// Summarize pasted text directly; no search queries are issued.
    pub async fn summarize_text(&self, text: &str) -> Result<StructuredNotes> {
        if text.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "text to summarize must not be empty".to_string(),
            ));
        }
        self.summarize(RawData::from_text(text), Vec::new()).await
    }

    /// Research a topic and write one styled blog post with a single review.
    pub async fn write_blog(&self, request: BlogRequest) -> Result<BlogPost> {
        let document = DocumentRequest::new(&request.topic, OutputFormat::Text)?;
        let raw_data = self.research(&document).await?;
        let notes = Arc::new(self.summarize(raw_data, Vec::new()).await?);

        let input = WriterInput::new(notes.clone(), &document.topic, document.format)
            .style(request.style);
        let draft = in_phase(Phase::Writing, "Writing blog post", async {
            self.writer
                .process(AgentMessage::new(AgentRole::Summary, AgentRole::Writer, input))
                .await
        })
        .await?;

        let review = in_phase(Phase::Qc, "Reviewing blog post", async {
            self.qc
                .process(AgentMessage::new(
                    AgentRole::Writer,
                    AgentRole::Qc,
                    QcInput {
                        draft: draft.clone(),
                        topic: document.topic.clone(),
                        format: document.format,
                    },
                ))
                .await
        })
        .await?;
        log_review_verdict!(draft.version, review.approved, review.issues.len());

        Ok(BlogPost {
            draft,
            review,
            notes: Arc::try_unwrap(notes).unwrap_or_else(|shared| (*shared).clone()),
        })
    }

    async fn research(&self, request: &DocumentRequest) -> Result<RawData> {
        let message = AgentMessage::new(
            AgentRole::Orchestrator,
            AgentRole::Research,
            ResearchInput {
                topic: request.topic.clone(),
                format: request.format,
            },
        );

        let raw_data = in_phase(
            Phase::Research,
            "Generating search queries and collecting sources",
            self.research.process(message),
        )
        .await?;

        debug!(
            sources = raw_data.sources.len(),
            queries = raw_data.search_queries.len(),
            "research finished"
        );
        Ok(raw_data)
    }

    async fn summarize(
        &self,
        raw_data: RawData,
        local_files: Vec<PathBuf>,
    ) -> Result<StructuredNotes> {
        let message = AgentMessage::new(
            AgentRole::Research,
            AgentRole::Summary,
            SummaryInput {
                raw_data,
                local_files,
            },
        );

        in_phase(
            Phase::Summary,
            "Condensing sources into structured notes",
            self.summary.process(message),
        )
        .await
    }

    /// Revision loop plus formatting, shared by fresh and resumed runs.
    async fn finish(
        &self,
        run: RunHandle,
        request: DocumentRequest,
        notes: StructuredNotes,
    ) -> Result<RunReport> {
        let notes = Arc::new(notes);
        let (drafts, reviews) = self.revise(notes.clone(), &request).await?;

        let Some(final_draft) = drafts.last().cloned() else {
            return Err(PipelineError::InvalidInput(
                "revision loop produced no draft".to_string(),
            ));
        };

        let message = AgentMessage::new(
            AgentRole::Qc,
            AgentRole::Formatting,
            FormattingInput {
                draft: final_draft,
                topic: request.topic.clone(),
                format: request.format,
            },
        );
        let output = in_phase(
            Phase::Formatting,
            format!("Producing {} output", request.format).as_str(),
            self.formatting.process(message),
        )
        .await?;

        log_run_complete!(run.id, output.format, drafts.len() as u32);
        info!(run_id = %run.id, iterations = drafts.len(), "run complete");

        Ok(RunReport {
            run,
            notes: Arc::try_unwrap(notes).unwrap_or_else(|shared| (*shared).clone()),
            drafts,
            reviews,
            output,
        })
    }

    /// Writer/QC loop; stops on approval or at `max_iterations`.
    async fn revise(
        &self,
        notes: Arc<StructuredNotes>,
        request: &DocumentRequest,
    ) -> Result<(Vec<Draft>, Vec<QcFeedback>)> {
        let max_iterations = self.max_iterations();

        log_phase_start!(Phase::Writing.number(), Phase::Writing.name(), TOTAL_PHASES);
        log_phase_start!(Phase::Qc.number(), Phase::Qc.name(), TOTAL_PHASES);
        log_phase_start_console!(
            format!("{}-{}", Phase::Writing.number(), Phase::Qc.number()),
            "Writing & Review",
            format!("Up to {} drafts", max_iterations)
        );

        let mut drafts = Vec::new();
        let mut reviews = Vec::new();
        let mut version = 1;
        let mut feedback: Option<String> = None;

        loop {
            match self
                .iterate(notes.clone(), request, version, feedback.take())
                .await
            {
                Ok((draft, review)) => {
                    let done = review.approved || version >= max_iterations;
                    if review.forced_approval {
                        log_warning!(
                            "Maximum iterations ({}) reached, using draft v{}",
                            max_iterations,
                            version
                        );
                    }
                    feedback = review.feedback.clone();
                    drafts.push(draft);
                    reviews.push(review);

                    if done {
                        break;
                    }
                    version += 1;
                }
                Err(e) => {
                    log_phase_failed!(Phase::Writing.number(), Phase::Writing.name(), &e);
                    log_phase_failed!(Phase::Qc.number(), Phase::Qc.name(), &e);
                    return Err(e);
                }
            }
        }

        log_phase_complete!(Phase::Writing.number(), Phase::Writing.name());
        log_phase_complete!(Phase::Qc.number(), Phase::Qc.name());
        log_phase_complete_console!(format!("{}-{}", Phase::Writing.number(), Phase::Qc.number()));

        Ok((drafts, reviews))
    }

    /// One writer call followed by exactly one review of that draft.
    async fn iterate(
        &self,
        notes: Arc<StructuredNotes>,
        request: &DocumentRequest,
        version: u32,
        feedback: Option<String>,
    ) -> Result<(Draft, QcFeedback)> {
        let from = if version == 1 {
            AgentRole::Summary
        } else {
            AgentRole::Qc
        };
        let input = WriterInput::new(notes, &request.topic, request.format)
            .version(version)
            .feedback(if version > 1 { feedback } else { None });

        let draft = self
            .writer
            .process(AgentMessage::new(from, AgentRole::Writer, input))
            .await?;

        let review = self
            .qc
            .process(
                AgentMessage::new(
                    AgentRole::Writer,
                    AgentRole::Qc,
                    QcInput {
                        draft: draft.clone(),
                        topic: request.topic.clone(),
                        format: request.format,
                    },
                )
                .with_metadata("version", version),
            )
            .await?;

        log_iteration!(
            version,
            review.approved,
            review.forced_approval,
            review.issues.len()
        );
        log_review_verdict!(version, review.approved, review.issues.len());

        Ok((draft, review))
    }
}
