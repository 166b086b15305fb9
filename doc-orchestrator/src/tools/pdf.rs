//! PDF rendering with printpdf
//!
//! Layout: a bold title, then paragraphs split on
//! blank lines, word-wrapped to a fixed column count and paginated on US
//! letter pages.

use doc_orchestrator_sdk::async_trait;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ToolError, ToolResult};
use crate::tools::{PdfRenderer, RenderedPdf};

const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 25.4;
const TITLE_SIZE: f32 = 18.0;
const BODY_SIZE: f32 = 11.0;
const LINE_HEIGHT: f32 = 5.5;
const PARAGRAPH_GAP: f32 = 3.0;
const WRAP_COLUMNS: usize = 90;

/// One laid-out line of the document
#[derive(Debug, Clone, PartialEq, Eq)]
enum LayoutLine {
    Title(String),
    Body(String),
    ParagraphBreak,
}

/// Writes PDFs into an output directory
#[derive(Debug, Clone)]
pub struct PrintPdfRenderer {
    output_dir: PathBuf,
}

impl PrintPdfRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl PdfRenderer for PrintPdfRenderer {
    async fn render(&self, content: &str, filename: &str, title: &str) -> ToolResult<RenderedPdf> {
        let filename = if filename.ends_with(".pdf") {
            filename.to_string()
        } else {
            format!("{}.pdf", filename)
        };
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let file_path = self.output_dir.join(&filename);

        let lines = layout(title, content, WRAP_COLUMNS);
        let title = title.to_string();
        let target = file_path.clone();
        tokio::task::spawn_blocking(move || write_pdf(&title, &lines, &target))
            .await
            .map_err(|e| ToolError::Render(format!("render task failed: {}", e)))??;

        let size = tokio::fs::metadata(&file_path).await?.len();
        debug!(path = %file_path.display(), size, "pdf written");

        Ok(RenderedPdf {
            file_path,
            filename,
            size,
        })
    }
}

fn write_pdf(title: &str, lines: &[LayoutLine], path: &Path) -> ToolResult<()> {
    let doc_title = if title.is_empty() { "Document" } else { title };
    let (doc, page, layer) = PdfDocument::new(doc_title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let body_font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ToolError::Render(e.to_string()))?;
    let title_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ToolError::Render(e.to_string()))?;

    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT - MARGIN;
    let mut page_count = 1;

    for line in lines {
        let needed = match line {
            LayoutLine::Title(_) => LINE_HEIGHT * 2.0,
            LayoutLine::Body(_) => LINE_HEIGHT,
            LayoutLine::ParagraphBreak => PARAGRAPH_GAP,
        };
        if y - needed < MARGIN {
            page_count += 1;
            let (page, layer) = doc.add_page(
                Mm(PAGE_WIDTH),
                Mm(PAGE_HEIGHT),
                format!("Layer {}", page_count),
            );
            current = doc.get_page(page).get_layer(layer);
            y = PAGE_HEIGHT - MARGIN;
        }

        match line {
            LayoutLine::Title(text) => {
                y -= LINE_HEIGHT * 1.5;
                current.use_text(text.clone(), TITLE_SIZE, Mm(MARGIN), Mm(y), &title_font);
                y -= LINE_HEIGHT * 0.5;
            }
            LayoutLine::Body(text) => {
                y -= LINE_HEIGHT;
                current.use_text(text.clone(), BODY_SIZE, Mm(MARGIN), Mm(y), &body_font);
            }
            LayoutLine::ParagraphBreak => y -= PARAGRAPH_GAP,
        }
    }

    let file = File::create(path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| ToolError::Render(e.to_string()))
}

/// Split content into title, wrapped body lines and paragraph breaks.
fn layout(title: &str, content: &str, columns: usize) -> Vec<LayoutLine> {
    let mut lines = Vec::new();
    if !title.trim().is_empty() {
        lines.push(LayoutLine::Title(latin1(title.trim())));
        lines.push(LayoutLine::ParagraphBreak);
    }

    for paragraph in content.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        for source_line in paragraph.lines() {
            for wrapped in wrap(&latin1(source_line.trim_end()), columns) {
                lines.push(LayoutLine::Body(wrapped));
            }
        }
        lines.push(LayoutLine::ParagraphBreak);
    }

    lines
}

fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();
        if current_len > 0 && current_len + 1 + word_len > columns {
            out.push(std::mem::take(&mut current));
        }
        if word_len > columns {
            // Hard-split words longer than a line
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(columns) {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                current = chunk.iter().collect();
            }
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || out.is_empty() {
        out.push(current);
    }

    out
}

/// Builtin PDF fonts only cover Latin-1
fn latin1(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201c}' | '\u{201d}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\t' => ' ',
            c if (c as u32) < 0x20 => ' ',
            c if (c as u32) <= 0xff => c,
            _ => '?',
        })
        .collect()
}
