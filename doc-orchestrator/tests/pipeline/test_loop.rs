//! Tests for the writer/QC revision loop

use std::sync::Arc;

use doc_orchestrator::error::{ConfigError, PipelineError};
use doc_orchestrator::pipeline::phase4_qc::FORCED_APPROVAL_FEEDBACK;
use doc_orchestrator::pipeline::types::{DocumentRequest, OutputFormat, StructuredNotes};
use doc_orchestrator::pipeline::RunReport;

use super::common::{builder, orchestrator, reject, LlmStep, ScriptedLlm, StubSearch, APPROVE};

fn request() -> DocumentRequest {
    DocumentRequest::new("Quantum Computing", OutputFormat::Text).unwrap()
}

fn versions(report: &RunReport) -> Vec<u32> {
    report.drafts.iter().map(|d| d.version).collect()
}

#[tokio::test]
async fn test_approval_on_third_draft() {
    let llm = Arc::new(ScriptedLlm::new().qc(|n| if n < 3 { reject(n) } else { APPROVE.to_string() }));
    let search = Arc::new(StubSearch::new(1));
    let orchestrator = orchestrator(&llm, &search);

    let report = orchestrator.process_with_report(request(), &[]).await.unwrap();

    assert_eq!(versions(&report), vec![1, 2, 3]);
    assert_eq!(report.iterations(), 3);
    assert_eq!(report.output.content(), Some("Draft content v3"));

    let last = report.reviews.last().unwrap();
    assert!(last.approved);
    assert!(!last.forced_approval);
    assert_eq!(last.feedback, None);

    let writes = llm.calls_for(LlmStep::Writer);
    assert_eq!(writes.len(), 3);
    assert!(!writes[0].user_prompt.contains("Previous Feedback"));
    assert!(writes[1].user_prompt.contains("Revise v1: add worked examples."));
    assert!(writes[2].user_prompt.contains("Revise v2: add worked examples."));
    assert!(!writes[2].user_prompt.contains("Revise v1"));
}

#[tokio::test]
async fn test_each_draft_reviewed_once() {
    let llm = Arc::new(ScriptedLlm::new().qc(|n| if n < 2 { reject(n) } else { APPROVE.to_string() }));
    let search = Arc::new(StubSearch::new(1));
    let orchestrator = orchestrator(&llm, &search);

    let report = orchestrator.process_with_report(request(), &[]).await.unwrap();

    assert_eq!(report.drafts.len(), report.reviews.len());
    let reviews = llm.calls_for(LlmStep::Qc);
    assert_eq!(reviews.len(), 2);
    assert!(reviews[0].user_prompt.contains("Draft Version: 1"));
    assert!(reviews[0].user_prompt.contains("Draft content v1"));
    assert!(reviews[1].user_prompt.contains("Draft Version: 2"));
    assert!(reviews[1].user_prompt.contains("Draft content v2"));
}

#[tokio::test]
async fn test_always_rejected_stops_at_cap() {
    let llm = Arc::new(ScriptedLlm::new().always_reject());
    let search = Arc::new(StubSearch::new(1));
    let orchestrator = orchestrator(&llm, &search);

    let report = orchestrator.process_with_report(request(), &[]).await.unwrap();

    assert_eq!(llm.count(LlmStep::Writer), 3);
    assert_eq!(llm.count(LlmStep::Qc), 3);
    assert_eq!(versions(&report), vec![1, 2, 3]);
    assert_eq!(report.output.content(), Some("Draft content v3"));

    assert!(report.reviews[..2].iter().all(|r| !r.approved));
    let last = &report.reviews[2];
    assert!(last.approved);
    assert!(last.forced_approval);
    assert_eq!(last.feedback.as_deref(), Some(FORCED_APPROVAL_FEEDBACK));
}

#[tokio::test]
async fn test_first_draft_approved() {
    let llm = Arc::new(ScriptedLlm::new());
    let search = Arc::new(StubSearch::new(1));
    let orchestrator = orchestrator(&llm, &search);

    let report = orchestrator.process_with_report(request(), &[]).await.unwrap();

    assert_eq!(llm.count(LlmStep::Writer), 1);
    assert_eq!(versions(&report), vec![1]);
    assert!(!report.reviews[0].forced_approval);
}

#[tokio::test]
async fn test_single_iteration_cap() {
    let llm = Arc::new(ScriptedLlm::new().always_reject());
    let search = Arc::new(StubSearch::new(1));
    let orchestrator = builder(&llm, &search).max_iterations(1).build().unwrap();

    let report = orchestrator.process_with_report(request(), &[]).await.unwrap();

    assert_eq!(llm.count(LlmStep::Writer), 1);
    assert!(report.reviews[0].forced_approval);
    assert_eq!(report.output.content(), Some("Draft content v1"));
}

#[tokio::test]
async fn test_raised_cap_allows_more_revisions() {
    let llm = Arc::new(ScriptedLlm::new().always_reject());
    let search = Arc::new(StubSearch::new(1));
    let orchestrator = builder(&llm, &search).max_iterations(5).build().unwrap();
    assert_eq!(orchestrator.max_iterations(), 5);

    let report = orchestrator.process_with_report(request(), &[]).await.unwrap();

    assert_eq!(versions(&report), vec![1, 2, 3, 4, 5]);
    assert!(report.reviews[4].forced_approval);
}

#[test]
fn test_zero_iterations_rejected_at_build() {
    let llm = Arc::new(ScriptedLlm::new());
    let search = Arc::new(StubSearch::new(1));

    let result = builder(&llm, &search).max_iterations(0).build();

    assert!(matches!(
        result,
        Err(PipelineError::Config(ConfigError::Invalid {
            field: "max_iterations",
            ..
        }))
    ));
}

#[tokio::test]
async fn test_writer_failure_aborts_loop() {
    let llm = Arc::new(ScriptedLlm::new().fail_on(LlmStep::Writer));
    let search = Arc::new(StubSearch::new(1));
    let orchestrator = orchestrator(&llm, &search);

    let notes = StructuredNotes {
        summary: "Saved summary".to_string(),
        ..Default::default()
    };
    let result = orchestrator.run_from_notes(request(), notes).await;

    assert!(matches!(result, Err(PipelineError::Tool { .. })));
    assert_eq!(llm.count(LlmStep::Qc), 0);
}
