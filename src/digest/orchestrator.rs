use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{info, warn};

use crate::digest::capability::SummarizationBackend;
use crate::digest::config::DocsumConfig;
use crate::digest::fallback::extract_representative_with;
use crate::digest::key_points::{KeyPoint, extract_key_points};
use crate::digest::segmenter::{Segment, segment};
use crate::digest::sentences::char_len;
use crate::error::{CapabilityError, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RunPhase {
    Segmenting,
    Submitting { index: usize, total: usize },
    FallingBack,
    Completed,
}

/// Progress hook for whoever displays a run.
pub trait RunObserver {
    fn on_phase(&mut self, _phase: &RunPhase) {}
    fn on_segment_done(&mut self, _result: &SegmentResult, _total: usize) {}
}

#[cfg(test)]
pub struct NoopObserver;

#[cfg(test)]
impl RunObserver for NoopObserver {}

/// Checked before every submission; a cancelled run stops submitting and
/// assembles whatever it has.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentResult {
    pub index: usize,
    pub text: String,
    pub error: Option<String>,
}

impl SegmentResult {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunWarning {
    pub code: String,
    pub message: String,
}

impl RunWarning {
    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.as_str().to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetrics {
    pub model: String,
    pub elapsed_ms: u64,
    pub avg_ms_per_segment: f64,
    pub segments_total: usize,
    pub segments_submitted: usize,
    pub segments_succeeded: usize,
    pub segments_dropped: usize,
    pub input_chars: usize,
    pub summary_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryResult {
    pub summary: String,
    pub key_points: Vec<KeyPoint>,
    pub used_fallback: bool,
    pub cancelled: bool,
    pub warnings: Vec<RunWarning>,
    pub segments: Vec<SegmentResult>,
    pub metrics: RunMetrics,
    pub completed_at: String,
}

impl SummaryResult {
    pub fn has_warning(&self, code: ErrorCode) -> bool {
        self.warnings.iter().any(|w| w.code == code.as_str())
    }
}

pub struct Orchestrator<'a> {
    backend: &'a dyn SummarizationBackend,
    config: &'a DocsumConfig,
}

impl<'a> Orchestrator<'a> {
    pub fn new(backend: &'a dyn SummarizationBackend, config: &'a DocsumConfig) -> Self {
        Self { backend, config }
    }

    fn submit(&self, segment: &Segment) -> (SegmentResult, Option<CapabilityError>) {
        match self.backend.summarize_segment(segment) {
            Ok(text) if !text.trim().is_empty() => (
                SegmentResult {
                    index: segment.index,
                    text: text.trim().to_string(),
                    error: None,
                },
                None,
            ),
            Ok(_) => (
                SegmentResult {
                    index: segment.index,
                    text: String::new(),
                    error: Some("capability returned empty text".to_string()),
                },
                None,
            ),
            Err(err) => {
                warn!(
                    segment = segment.index,
                    code = err.code().as_str(),
                    error = %err,
                    "segment summarization failed"
                );
                (
                    SegmentResult {
                        index: segment.index,
                        text: String::new(),
                        error: Some(err.to_string()),
                    },
                    Some(err),
                )
            }
        }
    }

    pub fn summarize(
        &self,
        text: &str,
        observer: &mut dyn RunObserver,
        cancel: &CancellationToken,
    ) -> SummaryResult {
        let started = Instant::now();
        let mut warnings = Vec::new();

        observer.on_phase(&RunPhase::Segmenting);
        let segments = segment(text, self.config.segmenter.max_length);
        let max_segments = self.config.orchestrator.max_segments;
        let retained = segments.len().min(max_segments);
        let dropped = segments.len() - retained;
        if dropped > 0 {
            info!(dropped, max_segments, "segments beyond the cap were skipped");
            warnings.push(RunWarning::new(
                ErrorCode::E008SegmentsDropped,
                format!("{dropped} segment(s) beyond max_segments={max_segments} were not submitted"),
            ));
        }

        let mut results = Vec::with_capacity(retained);
        let mut cancelled = false;
        let mut credential_missing = None;
        for seg in segments.iter().take(max_segments) {
            if cancel.is_cancelled() {
                warn!(segment = seg.index, "run cancelled before submission");
                cancelled = true;
                break;
            }
            observer.on_phase(&RunPhase::Submitting {
                index: seg.index + 1,
                total: retained,
            });
            let (result, err) = self.submit(seg);
            if let Some(CapabilityError::ConfigurationMissing(vars)) = err {
                credential_missing = Some(vars);
            }
            observer.on_segment_done(&result, retained);
            results.push(result);
        }

        if let Some(vars) = credential_missing {
            warnings.push(RunWarning::new(
                ErrorCode::E005ConfigMissing,
                format!("summarization credential missing: set {vars}"),
            ));
        }
        if cancelled {
            warnings.push(RunWarning::new(
                ErrorCode::E009RunCancelled,
                format!(
                    "run cancelled after {} of {} segment(s)",
                    results.len(),
                    retained
                ),
            ));
        }

        let joined = results
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let succeeded = results.iter().filter(|r| !r.is_empty()).count();

        let (summary, used_fallback) = if joined.is_empty() {
            observer.on_phase(&RunPhase::FallingBack);
            warn!(
                submitted = results.len(),
                "no segment produced a summary; using extractive fallback"
            );
            warnings.push(RunWarning::new(
                ErrorCode::E007AllSegmentsEmpty,
                "summary built by extractive fallback",
            ));
            let blocks = &self.config.fallback;
            (
                extract_representative_with(text, blocks.sentence_budget(), blocks),
                true,
            )
        } else {
            (joined, false)
        };

        let key_points = extract_key_points(&summary, self.config.key_points.max_points);
        observer.on_phase(&RunPhase::Completed);

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let metrics = RunMetrics {
            model: self.backend.label().to_string(),
            elapsed_ms,
            avg_ms_per_segment: elapsed_ms as f64 / results.len().max(1) as f64,
            segments_total: segments.len(),
            segments_submitted: results.len(),
            segments_succeeded: succeeded,
            segments_dropped: dropped,
            input_chars: char_len(text),
            summary_chars: char_len(&summary),
        };
        info!(
            segments = metrics.segments_submitted,
            succeeded,
            used_fallback,
            elapsed_ms,
            "summarization run completed"
        );

        SummaryResult {
            summary,
            key_points,
            used_fallback,
            cancelled,
            warnings,
            segments: results,
            metrics,
            completed_at: chrono::Local::now().to_rfc3339(),
        }
    }
}
