//! Typed messages exchanged between the orchestrator and phase agents.
//!
//! Each phase transition has its own input struct; the envelope
//! [`AgentMessage`] derives its phase tag from the payload type so a message
//! can never claim one phase while carrying another phase's data.

use doc_orchestrator_sdk::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::pipeline::types::{
    Draft, Metadata, OutputFormat, RawData, StructuredNotes, StyleInstructions,
};

/// Number of phases in a full run
pub const TOTAL_PHASES: usize = 5;

/// One stage of the fixed pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Research,
    Summary,
    Writing,
    Qc,
    Formatting,
}

impl Phase {
    /// 1-based position in the pipeline
    pub fn number(&self) -> usize {
        match self {
            Phase::Research => 1,
            Phase::Summary => 2,
            Phase::Writing => 3,
            Phase::Qc => 4,
            Phase::Formatting => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Research => "Research",
            Phase::Summary => "Summary",
            Phase::Writing => "Writing",
            Phase::Qc => "Quality Check",
            Phase::Formatting => "Formatting",
        }
    }
}

/// Sender or recipient of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgentRole {
    User,
    Orchestrator,
    Research,
    Summary,
    Writer,
    Qc,
    Formatting,
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentRole::User => "User",
            AgentRole::Orchestrator => "Orchestrator",
            AgentRole::Research => "ResearchAgent",
            AgentRole::Summary => "SummaryAgent",
            AgentRole::Writer => "WriterAgent",
            AgentRole::Qc => "QCAgent",
            AgentRole::Formatting => "FormattingAgent",
        };
        f.write_str(name)
    }
}

/// Payload types that belong to a specific phase
pub trait PhaseInput {
    const PHASE: Phase;
}

/// Envelope for a hand-off between agents
#[derive(Debug, Clone)]
pub struct AgentMessage<T> {
    pub from: AgentRole,
    pub to: AgentRole,
    pub phase: Phase,
    pub data: T,
    pub metadata: Metadata,
}

impl<T: PhaseInput> AgentMessage<T> {
    pub fn new(from: AgentRole, to: AgentRole, data: T) -> Self {
        Self {
            from,
            to,
            phase: T::PHASE,
            data,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Anything that consumes one typed message and produces one typed result
#[async_trait]
pub trait PhaseAgent: Send + Sync {
    type Input: PhaseInput + Send + 'static;
    type Output: Send;

    fn role(&self) -> AgentRole;

    async fn process(&self, message: AgentMessage<Self::Input>) -> Result<Self::Output>;
}

// ============================================================================
// Phase Inputs
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResearchInput {
    pub topic: String,
    pub format: OutputFormat,
}

impl PhaseInput for ResearchInput {
    const PHASE: Phase = Phase::Research;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryInput {
    pub raw_data: RawData,
    pub local_files: Vec<PathBuf>,
}

impl PhaseInput for SummaryInput {
    const PHASE: Phase = Phase::Summary;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriterInput {
    /// Shared across every iteration of the revision loop
    pub notes: Arc<StructuredNotes>,
    pub topic: String,
    pub format: OutputFormat,
    /// Assigned by the caller, never by the writer
    pub version: u32,
    /// QC feedback on the previous version, if this is a revision
    pub feedback: Option<String>,
    pub style: Option<StyleInstructions>,
}

impl WriterInput {
    pub fn new(notes: Arc<StructuredNotes>, topic: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            notes,
            topic: topic.into(),
            format,
            version: 1,
            feedback: None,
            style: None,
        }
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn feedback(mut self, feedback: Option<String>) -> Self {
        self.feedback = feedback.filter(|f| !f.trim().is_empty());
        self
    }

    pub fn style(mut self, style: StyleInstructions) -> Self {
        self.style = Some(style);
        self
    }
}

impl PhaseInput for WriterInput {
    const PHASE: Phase = Phase::Writing;
}

#[derive(Debug, Clone, PartialEq)]
pub struct QcInput {
    pub draft: Draft,
    pub topic: String,
    pub format: OutputFormat,
}

impl PhaseInput for QcInput {
    const PHASE: Phase = Phase::Qc;
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormattingInput {
    pub draft: Draft,
    pub topic: String,
    pub format: OutputFormat,
}

impl FormattingInput {
    /// Build from an untyped format string; unknown values become text.
    pub fn from_raw(draft: Draft, topic: impl Into<String>, format: &str) -> Self {
        Self {
            draft,
            topic: topic.into(),
            format: OutputFormat::parse_lenient(format),
        }
    }
}

impl PhaseInput for FormattingInput {
    const PHASE: Phase = Phase::Formatting;
}
