//! CLI argument parsing for the document pipeline

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::OrchestratorConfig;
use crate::error::ConfigError;
use crate::pipeline::qc_verdict::ApprovalMatch;
use crate::pipeline::types::{OutputFormat, StyleInstructions};
use crate::pipeline::workflow::BlogRequest;

/// Turn a topic into a researched, reviewed document
#[derive(Parser, Debug, Clone)]
#[command(
    name = "doc-orchestrator",
    version,
    about = "Research → Summary → Write/Review → Format pipeline"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// YAML configuration file (defaults to environment variables)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug diagnostics on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the full pipeline and produce a document
    Generate(GenerateArgs),
    /// Research and summarize only, printing or saving the notes
    Summarize(SummarizeArgs),
    /// Write a single blog post with one review pass
    Blog(BlogArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct GenerateArgs {
    /// Topic to research and write about
    pub topic: String,

    /// Output format: text, pdf or hosted_doc (unknown values fall back to text)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Local file to include in the summary (repeatable)
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Saved notes YAML (from `summarize --output`); skips research and summary
    #[arg(long, value_name = "NOTES.yaml", conflicts_with = "files")]
    pub notes_file: Option<PathBuf>,

    /// Override the writer/review iteration cap
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Only accept `APPROVED: yes` at the start of a line
    #[arg(long)]
    pub strict_approval: bool,

    /// Write text output to this file instead of stdout (text format only)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GenerateArgs {
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::parse_lenient(&self.format)
    }

    /// Reject flag combinations that would otherwise be ignored.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.output.is_some() && self.output_format() != OutputFormat::Text {
            return Err(ConfigError::Invalid {
                field: "output",
                reason: format!(
                    "--output only applies to text; {} output is written by its renderer",
                    self.output_format()
                ),
            });
        }
        Ok(())
    }

    /// Apply command-line overrides on top of loaded configuration.
    pub fn apply(&self, config: &mut OrchestratorConfig) {
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        if self.strict_approval {
            config.approval_match = ApprovalMatch::LineAnchored;
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SummarizeArgs {
    /// Topic to research
    #[arg(required_unless_present = "text")]
    pub topic: Option<String>,

    /// Summarize this text instead of researching a topic
    #[arg(long, conflicts_with = "topic")]
    pub text: Option<String>,

    /// Where to save the notes as YAML
    #[arg(short, long, value_name = "NOTES.yaml")]
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct BlogArgs {
    /// Topic of the post
    pub topic: String,

    #[arg(long, default_value = "Professional")]
    pub tone: String,

    /// Target length in words
    #[arg(long, default_value = "1000")]
    pub length: u32,

    #[arg(long)]
    pub no_intro: bool,

    #[arg(long)]
    pub no_conclusion: bool,
}

impl From<BlogArgs> for BlogRequest {
    fn from(args: BlogArgs) -> Self {
        BlogRequest::new(args.topic).style(StyleInstructions {
            tone: args.tone,
            target_words: args.length,
            include_intro: !args.no_intro,
            include_conclusion: !args.no_conclusion,
        })
    }
}

impl Args {
    /// Load configuration from `--config` or the environment.
    pub fn load_config(&self) -> Result<OrchestratorConfig, ConfigError> {
        match &self.config {
            Some(path) => OrchestratorConfig::from_yaml_file(path),
            None => OrchestratorConfig::from_env(),
        }
    }
}
