use tracing::info;

use crate::digest::capability::SummarizationBackend;
use crate::digest::config::DocsumConfig;
use crate::digest::orchestrator::{CancellationToken, Orchestrator, RunObserver, SummaryResult};
use crate::error::DocsumError;

pub fn check_precondition(text: &str, min_chars: usize) -> Result<(), DocsumError> {
    let chars = text.trim().chars().count();
    if chars < min_chars {
        return Err(DocsumError::InputTooShort { chars, min_chars });
    }
    Ok(())
}

/// Validate the captured text and run the orchestrator over it.
///
/// Text below the configured minimum never reaches the capability.
pub fn summarize_document(
    text: &str,
    config: &DocsumConfig,
    backend: &dyn SummarizationBackend,
    observer: &mut dyn RunObserver,
    cancel: &CancellationToken,
) -> Result<SummaryResult, DocsumError> {
    check_precondition(text, config.orchestrator.min_input_chars)?;
    info!(
        chars = text.trim().chars().count(),
        model = backend.label(),
        "starting summarization run"
    );
    Ok(Orchestrator::new(backend, config).summarize(text.trim(), observer, cancel))
}

#[cfg(test)]
mod tests {
    use super::{check_precondition, summarize_document};
    use crate::digest::capability::SummarizationBackend;
    use crate::digest::config::DocsumConfig;
    use crate::digest::orchestrator::{CancellationToken, NoopObserver};
    use crate::digest::segmenter::Segment;
    use crate::error::{CapabilityError, DocsumError};
    use std::cell::Cell;

    struct CountingBackend {
        calls: Cell<usize>,
    }

    impl SummarizationBackend for CountingBackend {
        fn label(&self) -> &str {
            "counting"
        }

        fn summarize_segment(&self, _segment: &Segment) -> Result<String, CapabilityError> {
            self.calls.set(self.calls.get() + 1);
            Ok("condensed.".to_string())
        }
    }

    #[test]
    fn short_input_never_reaches_the_capability() {
        let backend = CountingBackend { calls: Cell::new(0) };
        let err = summarize_document(
            "Too short to bother.",
            &DocsumConfig::default(),
            &backend,
            &mut NoopObserver,
            &CancellationToken::new(),
        )
        .expect_err("short input rejected");

        assert!(matches!(
            err,
            DocsumError::InputTooShort {
                chars: 20,
                min_chars: 200
            }
        ));
        assert_eq!(backend.calls.get(), 0);
    }

    #[test]
    fn padding_whitespace_does_not_count_toward_minimum() {
        let padded = format!("{}{}{}", " ".repeat(300), "word.", "\n".repeat(300));
        assert!(check_precondition(&padded, 200).is_err());
        assert!(check_precondition(&"a".repeat(200), 200).is_ok());
    }

    #[test]
    fn long_enough_input_is_summarized() {
        let text = "The committee reviewed the budget in detail. ".repeat(6);
        let backend = CountingBackend { calls: Cell::new(0) };
        let got = summarize_document(
            &text,
            &DocsumConfig::default(),
            &backend,
            &mut NoopObserver,
            &CancellationToken::new(),
        )
        .expect("summarized");

        assert_eq!(backend.calls.get(), 1);
        assert_eq!(got.summary, "condensed.");
        assert!(!got.used_fallback);
    }
}
