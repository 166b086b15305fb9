/*
┌─────────────────────────────────────────────────────────────────────────────┐
│                          DOCUMENT ORCHESTRATOR                              │
└─────────────────────────────────────────────────────────────────────────────┘

  Phase 1: RESEARCH        LLM generates ≤5 queries, each searched for ≤3 hits
         ↓
  Phase 2: SUMMARY         corpus (+ local files) → summary + key points
         ↓
  Phase 3/4: WRITE ⇄ QC    draft v1..vN, loop ends on approval or at the cap
         ↓
  Phase 5: FORMAT          text | pdf | hosted_doc

EXAMPLE COMMANDS:

  # Full pipeline, plain text to stdout
  doc-orchestrator generate "Quantum Computing"

  # PDF with local notes included
  doc-orchestrator generate "Rust async" --format pdf --file notes/async.md

  # Save notes, then write from them later
  doc-orchestrator summarize "Rust async" --output rust_notes.yaml
  doc-orchestrator generate "Rust async" --notes-file rust_notes.yaml

  # Blog post
  doc-orchestrator blog "Rust async" --tone Casual --length 800
*/

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::Path;
use tokio::fs;
use tracing_subscriber::EnvFilter;

use doc_orchestrator::pipeline::cli::{Args, BlogArgs, Command, GenerateArgs, SummarizeArgs};
use doc_orchestrator::pipeline::{Artifact, DocumentRequest, RunReport, StructuredNotes};
use doc_orchestrator::{Orchestrator, OrchestratorConfig};
use doc_orchestrator_sdk::{log_file_saved, log_found, log_info, log_state_file};

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("doc_orchestrator=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });

    // A second init (e.g. in tests) is not an error worth surfacing
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = args
        .load_config()
        .context("Failed to load configuration")?;

    match args.command {
        Command::Generate(generate) => {
            generate.check().context("Invalid arguments")?;
            generate.apply(&mut config);
            run_generate(&config, generate).await
        }
        Command::Summarize(summarize) => run_summarize(&config, summarize).await,
        Command::Blog(blog) => run_blog(&config, blog).await,
    }
}

async fn run_generate(config: &OrchestratorConfig, args: GenerateArgs) -> Result<()> {
    let orchestrator = Orchestrator::from_config(config).context("Failed to build pipeline")?;
    let request = DocumentRequest::new(&args.topic, args.output_format())?;

    let report = match &args.notes_file {
        Some(path) => {
            let notes = load_notes(path).await?;
            log_info!("Loaded notes from: {}", path.display());
            orchestrator.run_from_notes(request, notes).await?
        }
        None => {
            orchestrator
                .process_with_report(request, &args.files)
                .await?
        }
    };

    print_report(&report, args.output.as_deref()).await
}

async fn print_report(report: &RunReport, output: Option<&Path>) -> Result<()> {
    println!();
    println!(
        "Finished after {} draft(s){}",
        report.iterations(),
        if report.reviews.last().map(|r| r.forced_approval).unwrap_or(false) {
            " (approval forced at iteration cap)"
        } else {
            ""
        }
    );

    match &report.output.artifact {
        Artifact::Content(content) => match output {
            Some(path) => {
                fs::write(path, content)
                    .await
                    .with_context(|| format!("Failed to write output: {}", path.display()))?;
                log_file_saved!(path.display());
            }
            None => {
                println!("{}", "=".repeat(80));
                println!("{}", content);
            }
        },
        Artifact::FilePath(path) => {
            log_file_saved!(path.display());
        }
        Artifact::Url(url) => println!("Document: {}", url),
    }

    Ok(())
}

async fn run_summarize(config: &OrchestratorConfig, args: SummarizeArgs) -> Result<()> {
    let orchestrator = Orchestrator::from_config(config).context("Failed to build pipeline")?;

    let notes = match (&args.text, &args.topic) {
        (Some(text), _) => orchestrator.summarize_text(text).await?,
        (None, Some(topic)) => orchestrator.summarize_topic(topic).await?,
        (None, None) => anyhow::bail!("either a topic or --text is required"),
    };

    println!("\n{}\n", notes.summary);
    log_found!(notes.key_points.len(), "key points");
    for point in &notes.key_points {
        println!("  - {}", point);
    }

    let path = match args.output {
        Some(path) => path,
        None => {
            let timestamp = Local::now().format("%Y%m%d_%H%M%S");
            config
                .output_dir
                .join(format!("structured_notes_{}.yaml", timestamp))
        }
    };
    save_notes(&path, &notes).await?;
    log_state_file!(
        2,
        path.display(),
        "Structured notes for generate --notes-file"
    );

    Ok(())
}

async fn run_blog(config: &OrchestratorConfig, args: BlogArgs) -> Result<()> {
    let orchestrator = Orchestrator::from_config(config).context("Failed to build pipeline")?;
    let post = orchestrator.write_blog(args.into()).await?;

    println!("{}", "=".repeat(80));
    println!("{}", post.draft.content);
    println!("{}", "=".repeat(80));
    if !post.review.issues.is_empty() {
        log_found!(post.review.issues.len(), "review issues");
        for issue in &post.review.issues {
            println!("  - {}", issue);
        }
    }
    if let Some(feedback) = &post.review.feedback {
        println!("\nReview feedback:\n{}", feedback);
    }

    Ok(())
}

async fn load_notes(path: &Path) -> Result<StructuredNotes> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read notes file: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse notes YAML from: {}", path.display()))
}

async fn save_notes(path: &Path, notes: &StructuredNotes) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let yaml = serde_yaml::to_string(notes)?;
    fs::write(path, yaml)
        .await
        .with_context(|| format!("Failed to write notes file: {}", path.display()))?;
    log_file_saved!(path.display());
    Ok(())
}
