//! Document pipeline
//!
//! Five phase agents chained by the [`Orchestrator`]: research, summary,
//! writing, quality check and formatting. Writing and quality check repeat
//! in a bounded revision loop.

pub mod cli;
pub mod messages;
pub mod phase1_research;
pub mod phase2_summary;
pub mod phase3_write;
pub mod phase4_qc;
pub mod phase5_format;
pub mod qc_verdict;
pub mod types;
pub mod workflow;

// Re-export commonly used types
pub use messages::{AgentMessage, AgentRole, Phase, PhaseAgent};
pub use phase5_format::sanitize_filename;
pub use qc_verdict::{ApprovalMatch, QcVerdictParser};
pub use types::{
    Artifact, DocumentRequest, Draft, FinalOutput, Metadata, OutputFormat, QcFeedback, RawData,
    Source, StructuredNotes, StyleInstructions,
};
pub use workflow::{BlogPost, BlogRequest, Orchestrator, OrchestratorBuilder, RunReport};
