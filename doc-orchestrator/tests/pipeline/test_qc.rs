//! Tests for the quality-check phase

use std::sync::Arc;

use doc_orchestrator::pipeline::messages::{AgentMessage, AgentRole, PhaseAgent, QcInput};
use doc_orchestrator::pipeline::phase4_qc::{QcAgent, FORCED_APPROVAL_FEEDBACK};
use doc_orchestrator::pipeline::qc_verdict::{ApprovalMatch, QcVerdictParser};
use doc_orchestrator::pipeline::types::{Draft, Metadata, OutputFormat};

use super::common::{LlmStep, ScriptedLlm};

fn review(version: u32) -> AgentMessage<QcInput> {
    AgentMessage::new(
        AgentRole::Writer,
        AgentRole::Qc,
        QcInput {
            draft: Draft {
                content: format!("Body of v{}", version),
                version,
                metadata: Metadata::new(),
            },
            topic: "Rust".to_string(),
            format: OutputFormat::Text,
        },
    )
}

#[tokio::test]
async fn test_rejection_below_cap() {
    let llm = Arc::new(ScriptedLlm::new().always_reject());
    let agent = QcAgent::new(llm.clone());

    let verdict = agent.process(review(1)).await.unwrap();

    assert!(!verdict.approved);
    assert!(!verdict.forced_approval);
    assert_eq!(verdict.issues, vec!["Too shallow", "Needs examples"]);
    assert_eq!(
        verdict.feedback.as_deref(),
        Some("Revise v1: add worked examples.")
    );

    let calls = llm.calls_for(LlmStep::Qc);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].temperature, 0.3);
    assert!(calls[0].user_prompt.contains("Draft Version: 1"));
    assert!(calls[0].user_prompt.contains("Body of v1"));
}

#[tokio::test]
async fn test_forced_approval_at_version_three() {
    let llm = Arc::new(ScriptedLlm::new().qc(|_| "APPROVED: no".to_string()));
    let agent = QcAgent::new(llm);

    let verdict = agent.process(review(3)).await.unwrap();

    assert!(verdict.approved);
    assert!(verdict.forced_approval);
    assert_eq!(verdict.feedback.as_deref(), Some(FORCED_APPROVAL_FEEDBACK));
}

#[tokio::test]
async fn test_forced_approval_respects_custom_cap() {
    let llm = Arc::new(ScriptedLlm::new().always_reject());
    let agent = QcAgent::new(llm).max_iterations(5);

    assert!(!agent.process(review(3)).await.unwrap().approved);
    assert!(agent.process(review(5)).await.unwrap().forced_approval);
}

#[tokio::test]
async fn test_natural_approval() {
    let llm = Arc::new(ScriptedLlm::new());
    let agent = QcAgent::new(llm);

    let verdict = agent.process(review(1)).await.unwrap();

    assert!(verdict.approved);
    assert!(!verdict.forced_approval);
    assert_eq!(verdict.feedback, None);
}

#[tokio::test]
async fn test_line_anchored_parser_ignores_quoted_approval() {
    let response = "APPROVED: no\nFEEDBACK:\nI would say approved: yes once the intro is fixed.";
    let llm = Arc::new(ScriptedLlm::new().qc(move |_| response.to_string()));

    let substring = QcAgent::new(llm.clone());
    assert!(substring.process(review(1)).await.unwrap().approved);

    let anchored =
        QcAgent::new(llm).parser(QcVerdictParser::new(ApprovalMatch::LineAnchored));
    let verdict = anchored.process(review(1)).await.unwrap();
    assert!(!verdict.approved);
    assert_eq!(
        verdict.feedback.as_deref(),
        Some("I would say approved: yes once the intro is fixed.")
    );
}
