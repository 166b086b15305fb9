//! Scripted collaborators for pipeline tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use doc_orchestrator::error::{ToolError, ToolResult};
use doc_orchestrator::pipeline::types::Source;
use doc_orchestrator::tools::hosted_doc::document_url;
use doc_orchestrator::tools::{
    FileContent, FileData, FileReader, HostedDocRenderer, HostedDocument, LlmGateway,
    PdfRenderer, RenderedPdf, SearchProvider,
};
use doc_orchestrator::{Orchestrator, OrchestratorBuilder};
use doc_orchestrator_sdk::async_trait;

pub const APPROVE: &str = "APPROVED: yes\nISSUES:\nFEEDBACK:\nReady to publish.";

/// A rejection whose feedback names the version it rejects
pub fn reject(version: usize) -> String {
    format!(
        "APPROVED: no\nISSUES:\n- Too shallow\n- Needs examples\nFEEDBACK:\nRevise v{}: add worked examples.",
        version
    )
}

/// Which pipeline step an LLM call belongs to, recognized by its system prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmStep {
    Queries,
    Summary,
    KeyPoints,
    Writer,
    Qc,
}

impl LlmStep {
    fn classify(system_prompt: &str) -> Self {
        if system_prompt.contains("research assistant") {
            LlmStep::Queries
        } else if system_prompt.contains("summarization expert") {
            LlmStep::Summary
        } else if system_prompt.starts_with("Extract key points") {
            LlmStep::KeyPoints
        } else if system_prompt.contains("quality assurance") {
            LlmStep::Qc
        } else {
            LlmStep::Writer
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmCall {
    pub step: LlmStep,
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
}

type QcScript = Box<dyn Fn(usize) -> String + Send + Sync>;

/// LLM stub answering each step from a script and recording every call
pub struct ScriptedLlm {
    queries: String,
    summary: String,
    key_points: String,
    /// Receives the 1-based review number
    qc: QcScript,
    failing: HashSet<LlmStep>,
    calls: Mutex<Vec<LlmCall>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self {
            queries: "query one\nquery two\nquery three".to_string(),
            summary: "A concise summary of the research.".to_string(),
            key_points: "First point\nSecond point".to_string(),
            qc: Box::new(|_| APPROVE.to_string()),
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(mut self, response: &str) -> Self {
        self.queries = response.to_string();
        self
    }

    pub fn summary(mut self, response: &str) -> Self {
        self.summary = response.to_string();
        self
    }

    pub fn key_points(mut self, response: &str) -> Self {
        self.key_points = response.to_string();
        self
    }

    pub fn qc(mut self, script: impl Fn(usize) -> String + Send + Sync + 'static) -> Self {
        self.qc = Box::new(script);
        self
    }

    pub fn always_reject(self) -> Self {
        self.qc(reject)
    }

    pub fn fail_on(mut self, step: LlmStep) -> Self {
        self.failing.insert(step);
        self
    }

    pub fn calls(&self) -> Vec<LlmCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, step: LlmStep) -> Vec<LlmCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.step == step)
            .collect()
    }

    pub fn count(&self, step: LlmStep) -> usize {
        self.calls_for(step).len()
    }
}

#[async_trait]
impl LlmGateway for ScriptedLlm {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> ToolResult<String> {
        let step = LlmStep::classify(system_prompt);
        let nth = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(LlmCall {
                step,
                system_prompt: system_prompt.to_string(),
                user_prompt: user_prompt.to_string(),
                temperature,
            });
            calls.iter().filter(|call| call.step == step).count()
        };

        if self.failing.contains(&step) {
            return Err(ToolError::Provider {
                provider: "scripted",
                status: 503,
                body: "unavailable".to_string(),
            });
        }

        Ok(match step {
            LlmStep::Queries => self.queries.clone(),
            LlmStep::Summary => self.summary.clone(),
            LlmStep::KeyPoints => self.key_points.clone(),
            LlmStep::Writer => format!("Draft content v{}", nth),
            LlmStep::Qc => (self.qc)(nth),
        })
    }
}

/// Search stub returning a fixed number of hits per query
pub struct StubSearch {
    per_query: usize,
    failing: HashSet<String>,
    searched: Mutex<Vec<(String, usize)>>,
}

impl StubSearch {
    pub fn new(per_query: usize) -> Self {
        Self {
            per_query,
            failing: HashSet::new(),
            searched: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    /// `(query, max_results)` for every call, in order
    pub fn searched(&self) -> Vec<(String, usize)> {
        self.searched.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for StubSearch {
    async fn search(&self, query: &str, max_results: usize) -> ToolResult<Vec<Source>> {
        self.searched
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));

        if self.failing.contains(query) {
            return Err(ToolError::Provider {
                provider: "stub search",
                status: 500,
                body: format!("search for '{}' failed", query),
            });
        }

        let slug = query.replace(' ', "-");
        Ok((1..=self.per_query.min(max_results))
            .map(|i| {
                Source::new(
                    format!("{} result {}", query, i),
                    format!("https://example.com/{}/{}", slug, i),
                    format!("Content about {} #{}", query, i),
                )
                .with_score(1.0 / i as f64)
            })
            .collect())
    }
}

/// In-memory file reader
#[derive(Default)]
pub struct StubFiles {
    files: HashMap<String, FileContent>,
}

impl StubFiles {
    pub fn text(mut self, path: &str, content: &str) -> Self {
        self.files
            .insert(path.to_string(), FileContent::Text(content.to_string()));
        self
    }

    pub fn binary(mut self, path: &str, bytes: &[u8]) -> Self {
        self.files
            .insert(path.to_string(), FileContent::Binary(bytes.to_vec()));
        self
    }
}

#[async_trait]
impl FileReader for StubFiles {
    async fn read(&self, path: &str) -> ToolResult<FileData> {
        let content = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| ToolError::NotFound(PathBuf::from(path)))?;
        let size = match &content {
            FileContent::Text(text) => text.len(),
            FileContent::Binary(bytes) => bytes.len(),
        };
        Ok(FileData {
            path: PathBuf::from(path),
            content,
            size,
        })
    }
}

/// `(content, filename, title)` per render call
#[derive(Default)]
pub struct RecordingPdf {
    pub calls: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl PdfRenderer for RecordingPdf {
    async fn render(&self, content: &str, filename: &str, title: &str) -> ToolResult<RenderedPdf> {
        self.calls.lock().unwrap().push((
            content.to_string(),
            filename.to_string(),
            title.to_string(),
        ));
        let filename = format!("{}.pdf", filename);
        Ok(RenderedPdf {
            file_path: PathBuf::from("/tmp/doc-orchestrator").join(&filename),
            filename,
            size: content.len() as u64,
        })
    }
}

/// `(title, content)` per create call
#[derive(Default)]
pub struct RecordingDocs {
    pub calls: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl HostedDocRenderer for RecordingDocs {
    async fn create(&self, title: &str, content: &str) -> ToolResult<HostedDocument> {
        self.calls
            .lock()
            .unwrap()
            .push((title.to_string(), content.to_string()));
        Ok(HostedDocument {
            id: "doc-123".to_string(),
            url: document_url("doc-123"),
            title: title.to_string(),
        })
    }
}

/// Builder wired with the given LLM and search stubs
pub fn builder(llm: &Arc<ScriptedLlm>, search: &Arc<StubSearch>) -> OrchestratorBuilder {
    Orchestrator::builder()
        .llm(llm.clone())
        .search(search.clone())
        .file_reader(Arc::new(StubFiles::default()))
}

pub fn orchestrator(llm: &Arc<ScriptedLlm>, search: &Arc<StubSearch>) -> Orchestrator {
    builder(llm, search).build().unwrap()
}
