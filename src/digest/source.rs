use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::DocsumError;

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceKind {
    Inline,
    PlainText,
    Pdf,
}

/// Input text captured once per run.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub text: String,
    pub kind: SourceKind,
    pub origin: String,
    pub pages_total: usize,
    pub pages_skipped: usize,
}

impl Document {
    pub fn from_text(text: &str, origin: impl Into<String>) -> Self {
        Self {
            text: text.trim().to_string(),
            kind: SourceKind::Inline,
            origin: origin.into(),
            pages_total: 0,
            pages_skipped: 0,
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

pub fn looks_like_pdf(path: &Path, bytes: &[u8]) -> bool {
    let by_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    by_extension || bytes.starts_with(PDF_MAGIC)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfText {
    pub text: String,
    pub pages_total: usize,
    pub pages_skipped: usize,
}

fn join_pages(pages: Vec<Option<String>>) -> PdfText {
    let pages_total = pages.len();
    let present: Vec<String> = pages
        .into_iter()
        .flatten()
        .map(|page| page.trim().to_string())
        .filter(|page| !page.is_empty())
        .collect();
    PdfText {
        pages_skipped: pages_total - present.len(),
        pages_total,
        text: present.join(" "),
    }
}

/// Best-effort text of every page. A page that fails to extract is `None`.
pub fn extract_pdf_pages(bytes: &[u8]) -> Result<Vec<Option<String>>, DocsumError> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|err| DocsumError::Source(format!("unreadable pdf: {err}")))?;

    let pages = doc
        .get_pages()
        .into_keys()
        .map(|page_number| match doc.extract_text(&[page_number]) {
            Ok(text) => Some(text),
            Err(err) => {
                debug!(page = page_number, error = %err, "skipping pdf page");
                None
            }
        })
        .collect();
    Ok(pages)
}

pub fn extract_pdf_text(bytes: &[u8]) -> Result<PdfText, DocsumError> {
    let joined = join_pages(extract_pdf_pages(bytes)?);
    if joined.pages_skipped > 0 {
        warn!(
            skipped = joined.pages_skipped,
            total = joined.pages_total,
            "some pdf pages produced no text"
        );
    }
    Ok(joined)
}

pub fn read_document(path: &Path) -> Result<Document> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let origin = path.display().to_string();

    if looks_like_pdf(path, &bytes) {
        let pdf = extract_pdf_text(&bytes)
            .with_context(|| format!("failed to extract text from {origin}"))?;
        return Ok(Document {
            text: pdf.text.trim().to_string(),
            kind: SourceKind::Pdf,
            origin,
            pages_total: pdf.pages_total,
            pages_skipped: pdf.pages_skipped,
        });
    }

    let decoded = String::from_utf8_lossy(&bytes);
    Ok(Document {
        kind: SourceKind::PlainText,
        ..Document::from_text(&decoded, origin)
    })
}
