use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::commands::{
    CommandReport, ConfigOverrides, InputOptions, capture_document, document_details,
    resolve_config,
};
use crate::digest::capability::build_backend;
use crate::digest::config::{TOKEN_ENV_VARS, resolve_api_token};
use crate::digest::orchestrator::{
    CancellationToken, RunObserver, RunPhase, SegmentResult, SummaryResult,
};
use crate::digest::paths::resolve_paths;
use crate::digest::pipeline::{check_precondition, summarize_document};
use crate::digest::session::{RunLock, Submission, SummarySession};
use crate::error::{DocsumError, ErrorCode};

/// Prints per-segment progress to stderr and enforces the optional deadline.
struct StderrProgress {
    cancel: CancellationToken,
    started: Instant,
    deadline: Option<Duration>,
}

impl StderrProgress {
    fn new(cancel: CancellationToken, deadline: Option<Duration>) -> Self {
        Self {
            cancel,
            started: Instant::now(),
            deadline,
        }
    }
}

impl RunObserver for StderrProgress {
    fn on_phase(&mut self, phase: &RunPhase) {
        match phase {
            RunPhase::Submitting { index, total } => {
                eprintln!("processing segment {index} of {total}");
            }
            RunPhase::FallingBack => {
                eprintln!("no segment summaries returned; extracting representative sentences");
            }
            RunPhase::Segmenting | RunPhase::Completed => {}
        }
    }

    fn on_segment_done(&mut self, result: &SegmentResult, _total: usize) {
        if let Some(err) = &result.error {
            eprintln!("segment {} failed: {err}", result.index + 1);
        }
        if let Some(deadline) = self.deadline
            && self.started.elapsed() >= deadline
            && !self.cancel.is_cancelled()
        {
            info!(deadline_secs = deadline.as_secs(), "run deadline reached");
            self.cancel.cancel();
        }
    }
}

fn render_result(report: &mut CommandReport, result: &SummaryResult) -> Result<()> {
    report.line("Summary:");
    report.line(result.summary.clone());
    if !result.key_points.is_empty() {
        report.line("");
        report.line("Key points:");
        for (n, point) in result.key_points.iter().enumerate() {
            report.line(format!("{}. {}", n + 1, point.text));
        }
    }

    let m = &result.metrics;
    report.detail(format!("model={}", m.model));
    report.detail(format!("elapsed_ms={}", m.elapsed_ms));
    report.detail(format!("avg_ms_per_segment={:.1}", m.avg_ms_per_segment));
    report.detail(format!(
        "segments={} submitted={} succeeded={} dropped={}",
        m.segments_total, m.segments_submitted, m.segments_succeeded, m.segments_dropped
    ));
    report.detail(format!("input_chars={}", m.input_chars));
    report.detail(format!("summary_chars={}", m.summary_chars));
    report.detail(format!("used_fallback={}", result.used_fallback));
    if result.cancelled {
        report.detail("cancelled=true");
    }
    report.detail(format!("completed_at={}", result.completed_at));
    for warning in &result.warnings {
        report.warning(&warning.code, &warning.message);
    }
    report.attach(result)
}

pub fn run(
    input: &InputOptions,
    overrides: &ConfigOverrides,
    deadline: Option<Duration>,
) -> Result<CommandReport> {
    let mut report = CommandReport::new("summarize");

    let Some(loaded) = resolve_config(&mut report, overrides) else {
        return Ok(report);
    };
    let cfg = loaded.config;

    let doc = match capture_document(input) {
        Ok(doc) => doc,
        Err(err) => {
            report.coded_issue(ErrorCode::E004SourceUnreadable, format!("{err:#}"));
            return Ok(report);
        }
    };
    document_details(&mut report, &doc, input.file.as_deref());

    if let Err(err) = check_precondition(&doc.text, cfg.orchestrator.min_input_chars) {
        report.coded_issue(
            err.code(),
            format!("{err}; provide more content to summarize"),
        );
        return Ok(report);
    }

    let paths = resolve_paths()?;
    let lock = match RunLock::acquire(&paths.lock_file) {
        Ok(lock) => lock,
        Err(err) => {
            if let Some(DocsumError::AlreadyRunning) = err.downcast_ref::<DocsumError>() {
                report.coded_issue(
                    ErrorCode::E002AlreadyRunning,
                    format!("another run holds {}", paths.lock_file.display()),
                );
                return Ok(report);
            }
            return Err(err);
        }
    };

    let backend = build_backend(&cfg.capability, resolve_api_token())?;
    let cancel = CancellationToken::new();
    let mut progress = StderrProgress::new(cancel.clone(), deadline);

    // Each invocation is its own explicit submission; nothing is served from cache.
    let session = SummarySession::new();
    let outcome = session.submit(Submission::new(1, &doc.text), || {
        summarize_document(&doc.text, &cfg, backend.as_ref(), &mut progress, &cancel)
    });

    debug!(phase = ?session.phase(), lock = %lock.path().display(), "run finished");

    match outcome {
        Ok(outcome) => {
            let result = outcome.into_result();
            if result.has_warning(ErrorCode::E005ConfigMissing) {
                eprintln!(
                    "no summarization credential configured; set {}",
                    TOKEN_ENV_VARS.join(" or ")
                );
            }
            render_result(&mut report, &result)?;
        }
        Err(err) => report.coded_issue(err.code(), err.to_string()),
    }
    Ok(report)
}
