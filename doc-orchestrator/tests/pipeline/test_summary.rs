//! Tests for the summary phase

use std::path::PathBuf;
use std::sync::Arc;

use doc_orchestrator::pipeline::messages::{AgentMessage, AgentRole, PhaseAgent, SummaryInput};
use doc_orchestrator::pipeline::phase2_summary::SummaryAgent;
use doc_orchestrator::pipeline::types::{RawData, Source};

use super::common::{LlmStep, ScriptedLlm, StubFiles};

fn message(raw_data: RawData, local_files: Vec<PathBuf>) -> AgentMessage<SummaryInput> {
    AgentMessage::new(
        AgentRole::Research,
        AgentRole::Summary,
        SummaryInput {
            raw_data,
            local_files,
        },
    )
}

#[tokio::test]
async fn test_empty_input_still_summarizes() {
    let llm = Arc::new(ScriptedLlm::new().key_points(""));
    let agent = SummaryAgent::new(llm.clone(), Arc::new(StubFiles::default()));

    let notes = agent
        .process(message(RawData::default(), Vec::new()))
        .await
        .unwrap();

    assert_eq!(notes.summary, "A concise summary of the research.");
    assert!(notes.key_points.is_empty());
    assert!(notes.sources.is_empty());
    assert_eq!(notes.metadata["num_sources"], 0);

    assert_eq!(llm.count(LlmStep::Summary), 1);
    assert_eq!(llm.count(LlmStep::KeyPoints), 1);
}

#[tokio::test]
async fn test_two_calls_with_expected_temperatures() {
    let llm = Arc::new(ScriptedLlm::new().key_points("- one\n\n two \n"));
    let agent = SummaryAgent::new(llm.clone(), Arc::new(StubFiles::default()));

    let raw = RawData {
        sources: vec![Source::new("Intro", "https://a.example", "Alpha text")],
        search_queries: vec!["intro".to_string()],
    };
    let notes = agent.process(message(raw, Vec::new())).await.unwrap();

    let calls = llm.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].step, LlmStep::Summary);
    assert_eq!(calls[0].temperature, 0.5);
    assert!(calls[0]
        .user_prompt
        .contains("Source: Intro\nURL: https://a.example\n\nAlpha text"));
    assert_eq!(calls[1].step, LlmStep::KeyPoints);
    assert_eq!(calls[1].temperature, 0.3);
    assert!(calls[1].user_prompt.contains(&notes.summary));

    assert_eq!(notes.key_points, vec!["- one", "two"]);
    assert_eq!(notes.metadata["search_queries"][0], "intro");
}

#[tokio::test]
async fn test_sources_deduplicated_without_empty_content() {
    let llm = Arc::new(ScriptedLlm::new());
    let agent = SummaryAgent::new(llm, Arc::new(StubFiles::default()));

    let raw = RawData {
        sources: vec![
            Source::new("A", "https://a.example", "first"),
            Source::new("Empty", "https://empty.example", ""),
            Source::new("A dup", "https://a.example", "second"),
            Source::new("B", "https://b.example", "third"),
        ],
        search_queries: vec!["q".to_string()],
    };
    let notes = agent.process(message(raw, Vec::new())).await.unwrap();

    assert_eq!(notes.sources, vec!["https://a.example", "https://b.example"]);
    assert_eq!(notes.metadata["num_sources"], 2);
}

#[tokio::test]
async fn test_local_files_text_only() {
    let llm = Arc::new(ScriptedLlm::new());
    let files = StubFiles::default()
        .text("notes.md", "Local insight about qubits")
        .binary("image.png", &[0x89, 0x50, 0x4e, 0x47]);
    let agent = SummaryAgent::new(llm.clone(), Arc::new(files));

    let notes = agent
        .process(message(
            RawData::default(),
            vec![
                PathBuf::from("notes.md"),
                PathBuf::from("image.png"),
                PathBuf::from("missing.txt"),
            ],
        ))
        .await
        .unwrap();

    let prompt = &llm.calls_for(LlmStep::Summary)[0].user_prompt;
    assert!(prompt.contains("Local File: notes.md\nLocal insight about qubits"));
    assert!(!prompt.contains("image.png"));
    assert!(!prompt.contains("missing.txt"));
    assert!(notes.sources.is_empty());
}

#[tokio::test]
async fn test_pasted_text_source_has_no_url() {
    let llm = Arc::new(ScriptedLlm::new());
    let agent = SummaryAgent::new(llm.clone(), Arc::new(StubFiles::default()));

    let notes = agent
        .process(message(RawData::from_text("Pasted paragraph."), Vec::new()))
        .await
        .unwrap();

    assert!(notes.sources.is_empty());
    assert!(llm.calls_for(LlmStep::Summary)[0]
        .user_prompt
        .contains("Source: Pasted Content\nURL: \n\nPasted paragraph."));
}
