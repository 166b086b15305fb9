//! Orchestrator configuration
//!
//! Configuration is assembled once at the top level from the environment
//! (after `.env` loading in the binary) or a YAML file, then passed down.
//! Nothing below this module reads the process environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::pipeline::qc_verdict::ApprovalMatch;

/// Writer/QC round trips before the reviewer is overridden
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Which LLM API to call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    #[default]
    Gemini,
    Anthropic,
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "anthropic" | "claude" => Ok(LlmProvider::Anthropic),
            other => Err(ConfigError::Invalid {
                field: "llm.provider",
                reason: format!("unknown provider '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,

    /// Provider default when unset
    #[serde(default)]
    pub model: Option<String>,

    pub api_key: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub api_key: String,

    #[serde(default = "default_search_depth")]
    pub search_depth: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostedDocsConfig {
    /// OAuth bearer token with the documents scope
    pub access_token: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl HostedDocsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Everything needed to build an [`crate::Orchestrator`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub llm: LlmConfig,

    /// Research cannot run without it
    #[serde(default)]
    pub search: Option<SearchConfig>,

    /// Only needed for the hosted_doc format
    #[serde(default)]
    pub hosted_docs: Option<HostedDocsConfig>,

    /// Where PDFs are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Base for relative local file paths (defaults to the working directory)
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    #[serde(default)]
    pub approval_match: ApprovalMatch,
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_search_depth() -> String {
    "advanced".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

/// Trim whitespace and one layer of surrounding quotes; empty becomes `None`
fn clean_value(value: String) -> Option<String> {
    let cleaned = value.trim().trim_matches(|c: char| c == '"' || c == '\'').trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

impl OrchestratorConfig {
    /// A minimal config around one LLM key, mostly useful for tests.
    pub fn new(llm: LlmConfig) -> Self {
        Self {
            llm,
            search: None,
            hosted_docs: None,
            output_dir: default_output_dir(),
            base_dir: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            approval_match: ApprovalMatch::default(),
        }
    }

    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    ///
    /// Recognized keys:
    /// - `DOC_ORCHESTRATOR_LLM` (`gemini` or `anthropic`; inferred from the
    ///   keys present when unset)
    /// - `GOOGLE_GEMINI_API_KEY` / `ANTHROPIC_API_KEY`
    /// - `DOC_ORCHESTRATOR_MODEL`
    /// - `TAVILY_API_KEY`
    /// - `GOOGLE_DOCS_ACCESS_TOKEN`
    /// - `DOC_ORCHESTRATOR_OUTPUT_DIR`
    /// - `DOC_ORCHESTRATOR_MAX_ITERATIONS`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).and_then(clean_value);

        let gemini_key = get("GOOGLE_GEMINI_API_KEY");
        let anthropic_key = get("ANTHROPIC_API_KEY");

        let provider = match get("DOC_ORCHESTRATOR_LLM") {
            Some(name) => name.parse()?,
            None if gemini_key.is_none() && anthropic_key.is_some() => LlmProvider::Anthropic,
            None => LlmProvider::Gemini,
        };

        let api_key = match provider {
            LlmProvider::Gemini => gemini_key.ok_or(ConfigError::MissingEnv("GOOGLE_GEMINI_API_KEY"))?,
            LlmProvider::Anthropic => anthropic_key.ok_or(ConfigError::MissingEnv("ANTHROPIC_API_KEY"))?,
        };

        let max_iterations = match get("DOC_ORCHESTRATOR_MAX_ITERATIONS") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                field: "max_iterations",
                reason: format!("'{}' is not a positive integer", value),
            })?,
            None => DEFAULT_MAX_ITERATIONS,
        };

        let config = Self {
            llm: LlmConfig {
                provider,
                model: get("DOC_ORCHESTRATOR_MODEL"),
                api_key,
                max_tokens: DEFAULT_MAX_TOKENS,
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            search: get("TAVILY_API_KEY").map(|api_key| SearchConfig {
                api_key,
                search_depth: default_search_depth(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            }),
            hosted_docs: get("GOOGLE_DOCS_ACCESS_TOKEN").map(|access_token| HostedDocsConfig {
                access_token,
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            }),
            output_dir: get("DOC_ORCHESTRATOR_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_output_dir),
            base_dir: None,
            max_iterations,
            approval_match: ApprovalMatch::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::Invalid {
                field: "max_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.llm.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "llm.api_key",
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(search) = &self.search {
            if search.api_key.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "search.api_key",
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Model name, falling back to the provider default
    pub fn model(&self) -> &str {
        match (&self.llm.model, self.llm.provider) {
            (Some(model), _) => model,
            (None, LlmProvider::Gemini) => crate::tools::GeminiGateway::DEFAULT_MODEL,
            (None, LlmProvider::Anthropic) => crate::tools::AnthropicGateway::DEFAULT_MODEL,
        }
    }
}
