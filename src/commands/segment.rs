use anyhow::Result;

use crate::commands::{
    CommandReport, ConfigOverrides, InputOptions, capture_document, document_details,
    resolve_config,
};
use crate::digest::segmenter::{Segment, segment};
use crate::error::ErrorCode;

const PREVIEW_CHARS: usize = 72;

fn preview(seg: &Segment) -> String {
    let mut head: String = seg.text.chars().take(PREVIEW_CHARS).collect();
    if seg.char_len() > PREVIEW_CHARS {
        head.push_str("...");
    }
    head
}

pub fn run(input: &InputOptions, overrides: &ConfigOverrides) -> Result<CommandReport> {
    let mut report = CommandReport::new("segment");
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

    let segments = segment(&doc.text, cfg.segmenter.max_length);
    let max_segments = cfg.orchestrator.max_segments;
    for seg in &segments {
        let marker = if seg.index < max_segments { "" } else { " (skipped)" };
        report.line(format!(
            "[{}] chars={} sentences={}{marker} {}",
            seg.index + 1,
            seg.char_len(),
            seg.sentence_count,
            preview(seg)
        ));
    }

    report.detail(format!("max_length={}", cfg.segmenter.max_length));
    report.detail(format!("max_segments={max_segments}"));
    report.detail(format!("segments={}", segments.len()));
    if segments.len() > max_segments {
        report.warning(
            ErrorCode::E008SegmentsDropped.as_str(),
            format!(
                "{} segment(s) would not be submitted",
                segments.len() - max_segments
            ),
        );
    }
    report.attach(&segments)?;
    Ok(report)
}
