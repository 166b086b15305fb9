//! Shared event types and logging macros for doc-orchestrator pipelines.
//!
//! Two channels are provided:
//! - [`PipelineLog`] events, serialized as JSON and written to stderr with the
//!   [`EVENT_PREFIX`] marker so a wrapping UI can follow a run
//! - console macros for human-readable progress on stdout

// Re-export async trait for convenience
pub use async_trait::async_trait;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marker written in front of every serialized [`PipelineLog`] line.
pub const EVENT_PREFIX: &str = "__PIPELINE_EVENT__:";

/// Identity of a single pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunHandle {
    pub id: Uuid,
    pub topic: String,
    pub started_at: DateTime<Utc>,
}

impl RunHandle {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }
}

/// Structured logging events emitted by the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineLog {
    /// Run started
    RunStarted {
        run_id: Uuid,
        topic: String,
        format: String,
    },
    /// Run finished and produced a final output
    RunCompleted {
        run_id: Uuid,
        format: String,
        iterations: u32,
    },
    /// Phase started
    PhaseStarted {
        phase: usize,
        name: String,
        total_phases: usize,
    },
    /// Phase completed
    PhaseCompleted { phase: usize, name: String },
    /// Phase failed
    PhaseFailed {
        phase: usize,
        name: String,
        error: String,
    },
    /// Task started
    TaskStarted {
        phase: usize,
        task_id: String,
        description: String,
        total_tasks: Option<usize>,
    },
    /// Task completed
    TaskCompleted {
        task_id: String,
        result: Option<String>,
    },
    /// Task failed
    TaskFailed { task_id: String, error: String },
    /// Agent started working on a message
    AgentStarted {
        task_id: String,
        agent_name: String,
        description: String,
    },
    /// Agent completed
    AgentCompleted {
        task_id: String,
        agent_name: String,
        result: Option<String>,
    },
    /// Agent failed
    AgentFailed {
        task_id: String,
        agent_name: String,
        error: String,
    },
    /// One writer/qc round trip finished
    IterationCompleted {
        version: u32,
        approved: bool,
        forced: bool,
        issues: usize,
    },
    /// State file created (intermediate outputs)
    StateFileCreated {
        phase: usize,
        file_path: String,
        description: String,
    },
}

impl PipelineLog {
    /// Emit this log event to stderr
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            use std::io::Write;
            eprintln!("{}{}", EVENT_PREFIX, json);
            let _ = std::io::stderr().flush();
        }
    }

    /// Parse a line previously written by [`PipelineLog::emit`]
    pub fn parse_line(line: &str) -> Option<Self> {
        let json = line.trim().strip_prefix(EVENT_PREFIX)?;
        serde_json::from_str(json).ok()
    }
}

#[macro_export]
macro_rules! log_run_start {
    ($run_id:expr, $topic:expr, $format:expr) => {
        $crate::PipelineLog::RunStarted {
            run_id: $run_id,
            topic: $topic.to_string(),
            format: $format.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_run_complete {
    ($run_id:expr, $format:expr, $iterations:expr) => {
        $crate::PipelineLog::RunCompleted {
            run_id: $run_id,
            format: $format.to_string(),
            iterations: $iterations,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_phase_start {
    ($phase:expr, $name:expr, $total:expr) => {
        $crate::PipelineLog::PhaseStarted {
            phase: $phase,
            name: $name.to_string(),
            total_phases: $total,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_phase_complete {
    ($phase:expr, $name:expr) => {
        $crate::PipelineLog::PhaseCompleted {
            phase: $phase,
            name: $name.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_phase_failed {
    ($phase:expr, $name:expr, $error:expr) => {
        $crate::PipelineLog::PhaseFailed {
            phase: $phase,
            name: $name.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_task_start {
    ($phase:expr, $task_id:expr, $desc:expr) => {
        $crate::PipelineLog::TaskStarted {
            phase: $phase,
            task_id: $task_id.to_string(),
            description: $desc.to_string(),
            total_tasks: None,
        }
        .emit();
    };
    ($phase:expr, $task_id:expr, $desc:expr, $total:expr) => {
        $crate::PipelineLog::TaskStarted {
            phase: $phase,
            task_id: $task_id.to_string(),
            description: $desc.to_string(),
            total_tasks: Some($total),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_task_complete {
    ($task_id:expr) => {
        $crate::PipelineLog::TaskCompleted {
            task_id: $task_id.to_string(),
            result: None,
        }
        .emit();
    };
    ($task_id:expr, $result:expr) => {
        $crate::PipelineLog::TaskCompleted {
            task_id: $task_id.to_string(),
            result: Some($result.to_string()),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_task_failed {
    ($task_id:expr, $error:expr) => {
        $crate::PipelineLog::TaskFailed {
            task_id: $task_id.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_agent_start {
    ($task_id:expr, $agent:expr, $desc:expr) => {
        $crate::PipelineLog::AgentStarted {
            task_id: $task_id.to_string(),
            agent_name: $agent.to_string(),
            description: $desc.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_agent_complete {
    ($task_id:expr, $agent:expr) => {
        $crate::PipelineLog::AgentCompleted {
            task_id: $task_id.to_string(),
            agent_name: $agent.to_string(),
            result: None,
        }
        .emit();
    };
    ($task_id:expr, $agent:expr, $result:expr) => {
        $crate::PipelineLog::AgentCompleted {
            task_id: $task_id.to_string(),
            agent_name: $agent.to_string(),
            result: Some($result.to_string()),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_agent_failed {
    ($task_id:expr, $agent:expr, $error:expr) => {
        $crate::PipelineLog::AgentFailed {
            task_id: $task_id.to_string(),
            agent_name: $agent.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_iteration {
    ($version:expr, $approved:expr, $forced:expr, $issues:expr) => {
        $crate::PipelineLog::IterationCompleted {
            version: $version,
            approved: $approved,
            forced: $forced,
            issues: $issues,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_state_file {
    ($phase:expr, $path:expr, $desc:expr) => {
        $crate::PipelineLog::StateFileCreated {
            phase: $phase,
            file_path: $path.to_string(),
            description: $desc.to_string(),
        }
        .emit();
    };
}

// ============================================================================
// Console Logging Macros
// ============================================================================
// Human-readable progress on stdout, complementing the structured
// PipelineLog events on stderr.
// ============================================================================

/// Logs the start of a pipeline phase with a header and description.
///
/// # Example
/// ```
/// use doc_orchestrator_sdk::log_phase_start_console;
/// log_phase_start_console!(1, "Research", "Generating search queries");
/// ```
///
/// Outputs:
/// ```text
/// ═══ PHASE 1: Research ═══
/// Generating search queries
/// ```
#[macro_export]
macro_rules! log_phase_start_console {
    ($phase:expr, $title:expr, $description:expr) => {
        println!("\x1b[1;36m═══ PHASE {}: {} ═══\x1b[0m", $phase, $title);
        println!("\x1b[36m{}\x1b[0m", $description);
    };
}

/// Logs the completion of a pipeline phase.
///
/// # Example
/// ```
/// use doc_orchestrator_sdk::log_phase_complete_console;
/// log_phase_complete_console!(1);
/// ```
#[macro_export]
macro_rules! log_phase_complete_console {
    ($phase:expr) => {
        println!("\x1b[32m✓ Phase {} complete\x1b[0m", $phase);
    };
}

/// Logs the QC verdict for one draft version.
///
/// # Example
/// ```
/// use doc_orchestrator_sdk::log_review_verdict;
/// log_review_verdict!(2, false, 3);
/// ```
///
/// Outputs:
/// ```text
/// Review of draft v2: ✗ needs revision (3 issues)
/// ```
#[macro_export]
macro_rules! log_review_verdict {
    ($version:expr, $approved:expr, $issues:expr) => {
        if $approved {
            println!(
                "\x1b[1mReview of draft v{}: \x1b[32m✓ approved\x1b[0m ({} issues)",
                $version, $issues
            );
        } else {
            println!(
                "\x1b[1mReview of draft v{}: \x1b[31m✗ needs revision\x1b[0m ({} issues)",
                $version, $issues
            );
        }
    };
}

/// Logs the number of items found.
///
/// # Example
/// ```
/// use doc_orchestrator_sdk::log_found;
/// log_found!(6, "sources");
/// ```
#[macro_export]
macro_rules! log_found {
    ($count:expr, $item_type:expr) => {
        println!("\x1b[36mFound {} {}\x1b[0m", $count, $item_type);
    };
}

/// Logs an informational message.
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        println!("\x1b[36mℹ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[36mℹ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a warning message.
///
/// # Example
/// ```
/// use doc_orchestrator_sdk::log_warning;
/// log_warning!("Maximum iterations reached");
/// ```
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs that a file has been saved.
#[macro_export]
macro_rules! log_file_saved {
    ($path:expr) => {
        println!("\x1b[32m✓ Saved: {}\x1b[0m", $path);
    };
}
