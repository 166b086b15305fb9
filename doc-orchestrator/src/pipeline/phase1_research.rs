//! Phase 1: Research
//!
//! Turns a topic into search queries with the LLM, then runs each query
//! against the search provider one at a time.
//!
//! A failing query is logged and skipped; the phase only fails when the
//! query-generation call itself fails.

use doc_orchestrator_sdk::{
    async_trait, log_agent_complete, log_agent_failed, log_agent_start, log_task_complete,
    log_task_failed, log_task_start,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result, Tool};
use crate::pipeline::messages::{AgentMessage, AgentRole, PhaseAgent, ResearchInput};
use crate::pipeline::types::RawData;
use crate::tools::{LlmGateway, SearchProvider};

/// Upper bound on generated queries
pub const MAX_QUERIES: usize = 5;

/// Results requested per query
pub const RESULTS_PER_QUERY: usize = 3;

const QUERY_TEMPERATURE: f32 = 0.7;

const SYSTEM_PROMPT: &str = "You are a research assistant. Given a topic, generate effective search \
queries to gather comprehensive information. Return only a list of 3-5 search queries, one per line.";

/// Split an LLM response into at most [`MAX_QUERIES`] trimmed, non-empty queries.
///
/// Falls back to the topic itself when the response has no usable lines.
pub fn parse_queries(response: &str, topic: &str) -> Vec<String> {
    let queries: Vec<String> = response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_QUERIES)
        .map(str::to_string)
        .collect();

    if queries.is_empty() {
        vec![topic.trim().to_string()]
    } else {
        queries
    }
}

pub struct ResearchAgent {
    llm: Arc<dyn LlmGateway>,
    search: Arc<dyn SearchProvider>,
}

impl ResearchAgent {
    pub fn new(llm: Arc<dyn LlmGateway>, search: Arc<dyn SearchProvider>) -> Self {
        Self { llm, search }
    }

    async fn generate_queries(&self, topic: &str) -> Result<Vec<String>> {
        let user_prompt = format!("Topic: {}\n\nGenerate search queries:", topic);
        let response = self
            .llm
            .complete(SYSTEM_PROMPT, &user_prompt, QUERY_TEMPERATURE)
            .await
            .map_err(|e| PipelineError::tool(Tool::Llm, e))?;

        let queries = parse_queries(&response, topic);
        debug!(count = queries.len(), "generated search queries");
        Ok(queries)
    }
}

#[async_trait]
impl PhaseAgent for ResearchAgent {
    type Input = ResearchInput;
    type Output = RawData;

    fn role(&self) -> AgentRole {
        AgentRole::Research
    }

    async fn process(&self, message: AgentMessage<ResearchInput>) -> Result<RawData> {
        let agent = self.role();
        let topic = message.data.topic;

        log_agent_start!("research", agent, format!("Researching: {}", topic));

        let search_queries = match self.generate_queries(&topic).await {
            Ok(queries) => queries,
            Err(e) => {
                log_agent_failed!("research", agent, &e);
                return Err(e);
            }
        };

        let total = search_queries.len();
        let mut sources = Vec::new();

        for (i, query) in search_queries.iter().enumerate() {
            let task_id = format!("search_{}", i + 1);
            log_task_start!(
                message.phase.number(),
                &task_id,
                format!("Searching: {}", query),
                total
            );

            match self.search.search(query, RESULTS_PER_QUERY).await {
                Ok(results) => {
                    log_task_complete!(&task_id, format!("{} results", results.len()));
                    sources.extend(results);
                }
                Err(e) => {
                    warn!(query = %query, error = %e, "search query failed, skipping");
                    log_task_failed!(&task_id, &e);
                }
            }
        }

        log_agent_complete!(
            "research",
            agent,
            format!("{} sources from {} queries", sources.len(), total)
        );

        Ok(RawData {
            sources,
            search_queries,
        })
    }
}
