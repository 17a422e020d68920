pub mod segment;
pub mod show_config;
pub mod summarize;

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

use crate::digest::config::{DocsumConfig, LoadedConfig, load_config, validate};
use crate::digest::source::{Document, read_document};
use crate::error::{DocsumError, ErrorCode};

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub body: Vec<String>,
    pub details: Vec<String>,
    pub issues: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            body: Vec::new(),
            details: Vec::new(),
            issues: Vec::new(),
            data: None,
        }
    }

    pub fn line(&mut self, text: impl Into<String>) {
        self.body.push(text.into());
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn warning(&mut self, code: &str, text: impl AsRef<str>) {
        self.details.push(format!("warning[{code}]={}", text.as_ref()));
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }

    pub fn coded_issue(&mut self, code: ErrorCode, text: impl AsRef<str>) {
        self.issue(format!("{}: {}", code.as_str(), text.as_ref()));
    }

    pub fn attach<T: Serialize>(&mut self, value: &T) -> Result<()> {
        self.data = Some(serde_json::to_value(value)?);
        Ok(())
    }
}

/// Flags shared by every command that reads a document.
#[derive(Debug, Clone, Default)]
pub struct InputOptions {
    pub file: Option<std::path::PathBuf>,
    pub text: Option<String>,
}

pub fn capture_document(input: &InputOptions) -> Result<Document> {
    if let Some(path) = input.file.as_deref() {
        return read_document(path);
    }
    if let Some(text) = input.text.as_deref() {
        return Ok(Document::from_text(text, "--text"));
    }
    read_stdin_document(std::io::stdin().lock())
}

fn read_stdin_document<R: Read>(mut reader: R) -> Result<Document> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .context("failed to read document from stdin")?;
    Ok(Document::from_text(&raw, "stdin"))
}

/// CLI flags that override loaded configuration for a single invocation.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_length: Option<usize>,
    pub max_segments: Option<usize>,
    pub key_points: Option<usize>,
}

impl ConfigOverrides {
    pub fn apply(&self, cfg: &mut DocsumConfig) {
        if let Some(max_length) = self.max_length {
            cfg.segmenter.max_length = max_length;
        }
        if let Some(max_segments) = self.max_segments {
            cfg.orchestrator.max_segments = max_segments;
        }
        if let Some(key_points) = self.key_points {
            cfg.key_points.max_points = key_points;
        }
    }
}

/// Load configuration and apply CLI overrides. A bad file or override is a
/// report issue rather than a hard error.
pub fn resolve_config(
    report: &mut CommandReport,
    overrides: &ConfigOverrides,
) -> Option<LoadedConfig> {
    let checked = load_config().and_then(|mut loaded| {
        overrides.apply(&mut loaded.config);
        validate(&loaded.config)?;
        Ok(loaded)
    });
    match checked {
        Ok(loaded) => {
            if let Some(path) = &loaded.file_path {
                report.detail(format!("config_file={}", path.display()));
            }
            Some(loaded)
        }
        Err(err) => {
            let err = DocsumError::InvalidConfig(format!("{err:#}"));
            report.coded_issue(err.code(), err.to_string());
            None
        }
    }
}

pub fn document_details(report: &mut CommandReport, doc: &Document, path_hint: Option<&Path>) {
    report.detail(format!("source.kind={:?}", doc.kind));
    report.detail(format!("source.origin={}", doc.origin));
    report.detail(format!("source.chars={}", doc.char_len()));
    if doc.pages_total > 0 {
        report.detail(format!("source.pages_total={}", doc.pages_total));
        report.detail(format!("source.pages_skipped={}", doc.pages_skipped));
    }
    if let Some(path) = path_hint
        && doc.text.is_empty()
    {
        report.detail(format!("source.empty_file={}", path.display()));
    }
}
