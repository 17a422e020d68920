use anyhow::{Context, Result};
use fs2::FileExt;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::digest::orchestrator::SummaryResult;
use crate::error::DocsumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    Idle,
    Running,
    Completed,
}

/// One explicit request to summarize a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: u64,
    pub fingerprint: String,
}

impl Submission {
    pub fn new(id: u64, text: &str) -> Self {
        Self {
            id,
            fingerprint: format!("{:x}", Sha256::digest(text.as_bytes())),
        }
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Fresh(SummaryResult),
    Cached(SummaryResult),
}

impl SubmitOutcome {
    pub fn into_result(self) -> SummaryResult {
        match self {
            Self::Fresh(result) | Self::Cached(result) => result,
        }
    }
}

struct SessionState {
    phase: SessionPhase,
    last_submission: Option<Submission>,
    last_result: Option<SummaryResult>,
}

/// Application state for summarization runs.
///
/// A run executes once per submission: repeating a completed submission
/// returns the cached result, and a submission arriving while another is in
/// flight is rejected.
pub struct SummarySession {
    state: Mutex<SessionState>,
}

impl Default for SummarySession {
    fn default() -> Self {
        Self::new()
    }
}

struct RunningGuard<'a> {
    session: &'a SummarySession,
    armed: bool,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.session.lock().phase = SessionPhase::Idle;
        }
    }
}

impl SummarySession {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState {
                phase: SessionPhase::Idle,
                last_submission: None,
                last_result: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase
    }

    pub fn submit<F>(&self, submission: Submission, run: F) -> Result<SubmitOutcome, DocsumError>
    where
        F: FnOnce() -> Result<SummaryResult, DocsumError>,
    {
        {
            let mut state = self.lock();
            if state.phase == SessionPhase::Running {
                return Err(DocsumError::AlreadyRunning);
            }
            if state.phase == SessionPhase::Completed
                && state.last_submission.as_ref() == Some(&submission)
                && let Some(cached) = &state.last_result
            {
                return Ok(SubmitOutcome::Cached(cached.clone()));
            }
            state.phase = SessionPhase::Running;
        }

        let mut guard = RunningGuard {
            session: self,
            armed: true,
        };
        let result = run()?;
        {
            let mut state = self.lock();
            state.phase = SessionPhase::Completed;
            state.last_submission = Some(submission);
            state.last_result = Some(result.clone());
        }
        guard.armed = false;
        Ok(SubmitOutcome::Fresh(result))
    }
}

/// Cross-process guard: an exclusive lock on a file under the docsum home.
#[derive(Debug)]
pub struct RunLock {
    file: fs::File,
    path: PathBuf,
}

impl RunLock {
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;

        if let Err(err) = file.try_lock_exclusive() {
            if err.kind() == fs2::lock_contended_error().kind() {
                return Err(DocsumError::AlreadyRunning.into());
            }
            return Err(err).with_context(|| format!("failed to lock {}", path.display()));
        }

        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
