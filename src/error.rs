use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocsumError {
    #[error("input too short: {chars} characters, need at least {min_chars}")]
    InputTooShort { chars: usize, min_chars: usize },
    #[error("a summarization run is already in progress")]
    AlreadyRunning,
    #[error("config file invalid or unreadable: {0}")]
    InvalidConfig(String),
    #[error("document could not be read: {0}")]
    Source(String),
}

impl DocsumError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InputTooShort { .. } => ErrorCode::E001InputTooShort,
            Self::AlreadyRunning => ErrorCode::E002AlreadyRunning,
            Self::InvalidConfig(_) => ErrorCode::E003ConfigInvalid,
            Self::Source(_) => ErrorCode::E004SourceUnreadable,
        }
    }
}

/// Failure of a single call to the summarization capability.
///
/// These never abort a run: the orchestrator degrades the affected segment to
/// an empty result and moves on.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("capability returned status {0}")]
    Status(u16),
    #[error("capability call timed out after {0}s")]
    Timeout(u64),
    #[error("capability transport error: {0}")]
    Transport(String),
    #[error("capability response was not valid json: {0}")]
    Malformed(String),
    #[error("capability response had no summary_text or generated_text")]
    Unrecognized,
    #[error("capability reported an error: {0}")]
    ServiceError(String),
    #[error("capability credential missing: set {0}")]
    ConfigurationMissing(String),
}

impl CapabilityError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ConfigurationMissing(_) => ErrorCode::E005ConfigMissing,
            _ => ErrorCode::E006SegmentCallFailed,
        }
    }
}

impl From<reqwest::Error> for CapabilityError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            CapabilityError::Malformed(error.to_string())
        } else {
            CapabilityError::Transport(error.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    E001InputTooShort,
    E002AlreadyRunning,
    E003ConfigInvalid,
    E004SourceUnreadable,
    E005ConfigMissing,
    E006SegmentCallFailed,
    E007AllSegmentsEmpty,
    E008SegmentsDropped,
    E009RunCancelled,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::E001InputTooShort => "E001_INPUT_TOO_SHORT",
            Self::E002AlreadyRunning => "E002_ALREADY_RUNNING",
            Self::E003ConfigInvalid => "E003_CONFIG_INVALID",
            Self::E004SourceUnreadable => "E004_SOURCE_UNREADABLE",
            Self::E005ConfigMissing => "E005_CONFIG_MISSING",
            Self::E006SegmentCallFailed => "E006_SEGMENT_CALL_FAILED",
            Self::E007AllSegmentsEmpty => "E007_ALL_SEGMENTS_EMPTY",
            Self::E008SegmentsDropped => "E008_SEGMENTS_DROPPED",
            Self::E009RunCancelled => "E009_RUN_CANCELLED",
        }
    }
}
