//! Phase 4: Quality check
//!
//! Reviews one draft and returns exactly one [`QcFeedback`]. Once the draft
//! version reaches `max_iterations` a rejection is overridden into a forced
//! approval so the revision loop always terminates.

use doc_orchestrator_sdk::{async_trait, log_agent_complete, log_agent_failed, log_agent_start};
use std::sync::Arc;
use tracing::warn;

use crate::config::DEFAULT_MAX_ITERATIONS;
use crate::error::{PipelineError, Result, Tool};
use crate::pipeline::messages::{AgentMessage, AgentRole, PhaseAgent, QcInput};
use crate::pipeline::qc_verdict::QcVerdictParser;
use crate::pipeline::types::QcFeedback;
use crate::tools::LlmGateway;

pub use crate::pipeline::qc_verdict::ApprovalMatch;

const QC_TEMPERATURE: f32 = 0.3;

/// Feedback attached to a forced approval
pub const FORCED_APPROVAL_FEEDBACK: &str = "Maximum iterations reached. Approving current draft.";

const SYSTEM_PROMPT: &str = "You are a quality assurance expert for document review. Evaluate \
documents for clarity, completeness, accuracy, structure, and adherence to the topic. Provide \
constructive feedback for improvement.";

fn review_prompt(input: &QcInput) -> String {
    format!(
        "Topic: {}\nTarget Format: {}\nDraft Version: {}\n\nDraft Content:\n{}\n\n\
         Evaluate this draft and determine:\n\
         1. Is it approved for final formatting? (yes/no)\n\
         2. If not approved, what specific issues need to be addressed?\n\
         3. Provide constructive feedback for improvement.\n\n\
         Format your response as:\n\
         APPROVED: yes/no\n\
         ISSUES:\n\
         - [list specific issues]\n\
         FEEDBACK:\n\
         [detailed feedback]",
        input.topic, input.format, input.draft.version, input.draft.content
    )
}

pub struct QcAgent {
    llm: Arc<dyn LlmGateway>,
    parser: QcVerdictParser,
    max_iterations: u32,
}

impl QcAgent {
    pub fn new(llm: Arc<dyn LlmGateway>) -> Self {
        Self {
            llm,
            parser: QcVerdictParser::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Values below 1 are treated as 1.
    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn parser(mut self, parser: QcVerdictParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn max_iterations_value(&self) -> u32 {
        self.max_iterations
    }

    /// Override a rejection once the iteration cap is reached.
    fn apply_iteration_cap(&self, version: u32, mut verdict: QcFeedback) -> QcFeedback {
        if version >= self.max_iterations && !verdict.approved {
            warn!(version, max = self.max_iterations, "forcing approval at iteration cap");
            verdict.approved = true;
            verdict.forced_approval = true;
            verdict.feedback = Some(FORCED_APPROVAL_FEEDBACK.to_string());
        }
        verdict
    }
}

#[async_trait]
impl PhaseAgent for QcAgent {
    type Input = QcInput;
    type Output = QcFeedback;

    fn role(&self) -> AgentRole {
        AgentRole::Qc
    }

    async fn process(&self, message: AgentMessage<QcInput>) -> Result<QcFeedback> {
        let agent = self.role();
        let input = message.data;
        let version = input.draft.version;
        let task_id = format!("review_v{}", version);

        log_agent_start!(&task_id, agent, format!("Reviewing draft version {}", version));

        let response = match self
            .llm
            .complete(SYSTEM_PROMPT, &review_prompt(&input), QC_TEMPERATURE)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let e = PipelineError::tool(Tool::Llm, e);
                log_agent_failed!(&task_id, agent, &e);
                return Err(e);
            }
        };

        let verdict = self.apply_iteration_cap(version, self.parser.parse(&response));

        log_agent_complete!(
            &task_id,
            agent,
            match (verdict.approved, verdict.forced_approval) {
                (true, true) => "approved (forced)".to_string(),
                (true, false) => "approved".to_string(),
                (false, _) => format!("rejected with {} issues", verdict.issues.len()),
            }
        );

        Ok(verdict)
    }
}
