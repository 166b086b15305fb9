// Configuration module
pub mod config;

// Error types
pub mod error;

// Document pipeline module
pub mod pipeline;

// Collaborator traits and clients
pub mod tools;

pub use config::OrchestratorConfig;
pub use error::{PipelineError, Result, ToolError};
pub use pipeline::{Orchestrator, OrchestratorBuilder};
