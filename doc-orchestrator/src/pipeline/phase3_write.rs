//! Phase 3: Writing
//!
//! Produces one [`Draft`] from the structured notes. The version number is
//! supplied by the caller; revisions carry the previous QC feedback.

use doc_orchestrator_sdk::{async_trait, log_agent_complete, log_agent_failed, log_agent_start};
use serde_json::json;
use std::sync::Arc;

use crate::error::{PipelineError, Result, Tool};
use crate::pipeline::messages::{AgentMessage, AgentRole, PhaseAgent, WriterInput};
use crate::pipeline::types::{Draft, Metadata};
use crate::tools::LlmGateway;

const WRITER_TEMPERATURE: f32 = 0.7;

/// Sources cited in the prompt
pub const MAX_PROMPT_SOURCES: usize = 5;

const DOCUMENT_PERSONA: &str = "You are an expert technical writer. Create well-structured, \
comprehensive documents based on research notes. Write in a clear, professional style with proper \
formatting, headings, and organization.";

const BLOG_PERSONA: &str = "You are an expert blog writer. Create engaging, well-structured blog \
posts based on research notes. Write in an engaging style with proper formatting, headings, and \
organization suitable for blog readers.";

/// Build the `(system, user)` prompt pair for one writer call
pub fn build_prompts(input: &WriterInput) -> (&'static str, String) {
    let notes = &input.notes;
    let key_points: Vec<String> = notes.key_points.iter().map(|kp| format!("- {}", kp)).collect();
    let sources: Vec<&str> = notes
        .sources
        .iter()
        .take(MAX_PROMPT_SOURCES)
        .map(String::as_str)
        .collect();

    let mut user_prompt = format!(
        "Topic: {}\nTarget Format: {}\n\nStructured Notes:\nSummary: {}\n\nKey Points:\n{}\n\nSources: {}\n",
        input.topic,
        input.format,
        notes.summary,
        key_points.join("\n"),
        sources.join(", "),
    );

    if let Some(style) = &input.style {
        user_prompt.push_str("\n\n");
        user_prompt.push_str(&style.render(&input.topic));
    }

    if let Some(feedback) = &input.feedback {
        user_prompt.push_str(&format!(
            "\n\nPrevious Feedback (for revision):\n{}\n\nPlease revise the draft addressing this feedback.",
            feedback
        ));
    }

    let system_prompt = if input.style.is_some() {
        BLOG_PERSONA
    } else {
        DOCUMENT_PERSONA
    };

    (system_prompt, user_prompt)
}

pub struct WriterAgent {
    llm: Arc<dyn LlmGateway>,
}

impl WriterAgent {
    pub fn new(llm: Arc<dyn LlmGateway>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl PhaseAgent for WriterAgent {
    type Input = WriterInput;
    type Output = Draft;

    fn role(&self) -> AgentRole {
        AgentRole::Writer
    }

    async fn process(&self, message: AgentMessage<WriterInput>) -> Result<Draft> {
        let agent = self.role();
        let input = message.data;
        let task_id = format!("draft_v{}", input.version);

        log_agent_start!(
            &task_id,
            agent,
            if input.feedback.is_some() {
                format!("Revising draft (version {})", input.version)
            } else {
                format!("Writing draft (version {})", input.version)
            }
        );

        let (system_prompt, user_prompt) = build_prompts(&input);
        let content = match self
            .llm
            .complete(system_prompt, &user_prompt, WRITER_TEMPERATURE)
            .await
        {
            Ok(content) => content,
            Err(e) => {
                let e = PipelineError::tool(Tool::Llm, e);
                log_agent_failed!(&task_id, agent, &e);
                return Err(e);
            }
        };

        let mut metadata = Metadata::new();
        metadata.insert("topic".to_string(), json!(input.topic));
        metadata.insert("format".to_string(), json!(input.format.as_str()));
        metadata.insert(
            "num_key_points".to_string(),
            json!(input.notes.key_points.len()),
        );

        log_agent_complete!(&task_id, agent, format!("{} chars", content.len()));

        Ok(Draft {
            content,
            version: input.version,
            metadata,
        })
    }
}
