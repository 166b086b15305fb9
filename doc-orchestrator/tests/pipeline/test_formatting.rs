//! Tests for the formatting phase

use std::path::PathBuf;
use std::sync::Arc;

use doc_orchestrator::error::{PipelineError, Tool};
use doc_orchestrator::pipeline::messages::{AgentMessage, AgentRole, FormattingInput, PhaseAgent};
use doc_orchestrator::pipeline::phase5_format::FormattingAgent;
use doc_orchestrator::pipeline::types::{Draft, Metadata, OutputFormat};
use doc_orchestrator::tools::hosted_doc::document_url;

use super::common::{builder, RecordingDocs, RecordingPdf, ScriptedLlm, StubSearch};

fn draft() -> Draft {
    Draft {
        content: "Final body".to_string(),
        version: 2,
        metadata: Metadata::new(),
    }
}

fn message(topic: &str, format: OutputFormat) -> AgentMessage<FormattingInput> {
    AgentMessage::new(
        AgentRole::Qc,
        AgentRole::Formatting,
        FormattingInput {
            draft: draft(),
            topic: topic.to_string(),
            format,
        },
    )
}

#[tokio::test]
async fn test_text_never_touches_renderers() {
    let pdf = Arc::new(RecordingPdf::default());
    let docs = Arc::new(RecordingDocs::default());
    let agent = FormattingAgent::new(Some(pdf.clone()), Some(docs.clone()));

    let output = agent.process(message("Rust", OutputFormat::Text)).await.unwrap();

    assert_eq!(output.format, OutputFormat::Text);
    assert_eq!(output.content(), Some("Final body"));
    assert_eq!(output.metadata["topic"], "Rust");
    assert_eq!(output.metadata["version"], 2);
    assert!(pdf.calls.lock().unwrap().is_empty());
    assert!(docs.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_pdf_without_renderer() {
    let agent = FormattingAgent::new(None, None);

    let err = agent
        .process(message("Rust", OutputFormat::Pdf))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::ToolNotConfigured {
            tool: Tool::PdfRenderer
        }
    ));
}

#[tokio::test]
async fn test_pdf_uses_sanitized_filename() {
    let pdf = Arc::new(RecordingPdf::default());
    let agent = FormattingAgent::new(Some(pdf.clone()), None);

    let output = agent
        .process(message("AI / ML: Intro", OutputFormat::Pdf))
        .await
        .unwrap();

    assert_eq!(
        output.file_path(),
        Some(&PathBuf::from("/tmp/doc-orchestrator/ai__ml_intro.pdf"))
    );
    assert_eq!(output.content(), None);
    assert_eq!(output.metadata["filename"], "ai__ml_intro.pdf");
    assert_eq!(output.metadata["size"], 10);

    let calls = pdf.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "Final body");
    assert_eq!(calls[0].1, "ai__ml_intro");
    assert_eq!(calls[0].2, "AI / ML: Intro");
}

#[tokio::test]
async fn test_hosted_doc_returns_url() {
    let docs = Arc::new(RecordingDocs::default());
    let agent = FormattingAgent::new(None, Some(docs.clone()));

    let output = agent
        .process(message("Rust Ownership", OutputFormat::HostedDoc))
        .await
        .unwrap();

    assert_eq!(output.url(), Some(document_url("doc-123").as_str()));
    assert_eq!(output.metadata["document_id"], "doc-123");
    assert_eq!(output.metadata["title"], "Rust Ownership");
    assert_eq!(
        docs.calls.lock().unwrap()[0],
        ("Rust Ownership".to_string(), "Final body".to_string())
    );
}

#[tokio::test]
async fn test_hosted_doc_blank_topic_title() {
    let docs = Arc::new(RecordingDocs::default());
    let agent = FormattingAgent::new(None, Some(docs.clone()));

    let output = agent
        .process(message("  ", OutputFormat::HostedDoc))
        .await
        .unwrap();

    assert_eq!(output.metadata["title"], "Document");
    assert_eq!(docs.calls.lock().unwrap()[0].0, "Document");
}

#[tokio::test]
async fn test_hosted_doc_without_renderer() {
    let agent = FormattingAgent::new(Some(Arc::new(RecordingPdf::default())), None);

    let err = agent
        .process(message("Rust", OutputFormat::HostedDoc))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::ToolNotConfigured {
            tool: Tool::HostedDocRenderer
        }
    ));
}

#[tokio::test]
async fn test_unknown_format_string_becomes_text() {
    let agent = FormattingAgent::new(None, None);
    let input = FormattingInput::from_raw(draft(), "Rust", "docx");

    let output = agent
        .process(AgentMessage::new(AgentRole::Qc, AgentRole::Formatting, input))
        .await
        .unwrap();

    assert_eq!(output.format, OutputFormat::Text);
    assert_eq!(output.content(), Some("Final body"));
}

#[tokio::test]
async fn test_run_fails_late_without_pdf_renderer() {
    let llm = Arc::new(ScriptedLlm::new());
    let search = Arc::new(StubSearch::new(1));
    let orchestrator = builder(&llm, &search).build().unwrap();
    assert_eq!(orchestrator.supported_formats(), vec![OutputFormat::Text]);

    let err = orchestrator.run("Rust", "pdf", &[]).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::ToolNotConfigured {
            tool: Tool::PdfRenderer
        }
    ));
    assert!(err.is_configuration());
}

#[tokio::test]
async fn test_run_renders_pdf_through_builder() {
    let llm = Arc::new(ScriptedLlm::new());
    let search = Arc::new(StubSearch::new(1));
    let pdf = Arc::new(RecordingPdf::default());
    let docs = Arc::new(RecordingDocs::default());
    let orchestrator = builder(&llm, &search)
        .pdf_renderer(pdf.clone())
        .hosted_doc_renderer(docs)
        .build()
        .unwrap();
    assert_eq!(orchestrator.supported_formats(), OutputFormat::ALL.to_vec());

    let output = orchestrator.run("Rust", "PDF", &[]).await.unwrap();

    assert_eq!(output.format, OutputFormat::Pdf);
    assert_eq!(pdf.calls.lock().unwrap()[0].0, "Draft content v1");
}
