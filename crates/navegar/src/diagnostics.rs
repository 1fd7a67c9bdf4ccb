//! Failure diagnostics: screenshot and log capture at the moment a
//! test fails.
//!
//! [`FailureArtifacts`] observes terminal test outcomes. On a `Failed`
//! or `Errored` outcome it captures a screenshot of the current
//! browser state and dumps the step journal (plus the session's
//! console buffer) into an append-only artifact directory. Every
//! write is tagged with the owning test id, a timestamp, and a short
//! random discriminator so re-runs never collide on filenames.
//!
//! Diagnostics must never become a second source of test failure:
//! every capture path degrades to a `tracing` warning, and a missing
//! or already-closed session produces an "unavailable" marker artifact
//! instead of an error.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::session::Session;
use crate::trace::StepJournal;

/// Terminal status of one test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStatus {
    /// All assertions held
    Passed,
    /// An assertion or typed interaction error failed the test
    Failed,
    /// The test aborted outside its assertions
    Errored,
}

impl TestStatus {
    /// Whether this status triggers artifact capture
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Errored)
    }

    /// Lowercase label for reports
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Errored => "errored",
        }
    }
}

/// Terminal outcome event for one test, produced by the harness and
/// consumed only by the diagnostics hook
#[derive(Debug, Clone)]
pub struct TestOutcome {
    /// Unique test identifier
    pub test_id: String,
    /// Terminal status
    pub status: TestStatus,
    /// When the outcome was produced
    pub timestamp: DateTime<Utc>,
}

impl TestOutcome {
    /// Build an outcome with the current timestamp
    #[must_use]
    pub fn new(test_id: impl Into<String>, status: TestStatus) -> Self {
        Self {
            test_id: test_id.into(),
            status,
            timestamp: Utc::now(),
        }
    }

    /// A passing outcome
    #[must_use]
    pub fn passed(test_id: impl Into<String>) -> Self {
        Self::new(test_id, TestStatus::Passed)
    }

    /// A failing outcome
    #[must_use]
    pub fn failed(test_id: impl Into<String>) -> Self {
        Self::new(test_id, TestStatus::Failed)
    }

    /// An errored outcome
    #[must_use]
    pub fn errored(test_id: impl Into<String>) -> Self {
        Self::new(test_id, TestStatus::Errored)
    }
}

/// Kind of artifact captured on failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// PNG screenshot of the browser state at failure
    Screenshot,
    /// Plain-text dump of the step journal and console buffer
    LogDump,
    /// Marker recording that diagnostics could not be captured
    Unavailable,
}

impl ArtifactKind {
    /// Filename prefix
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Screenshot => "screenshot",
            Self::LogDump => "logdump",
            Self::Unavailable => "unavailable",
        }
    }

    /// Filename extension
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Screenshot => "png",
            Self::LogDump => "log",
            Self::Unavailable => "txt",
        }
    }
}

/// One captured artifact on disk
#[derive(Debug, Clone)]
pub struct DiagnosticArtifact {
    /// What was captured
    pub kind: ArtifactKind,
    /// Where it was written
    pub path: PathBuf,
    /// Owning test
    pub test_id: String,
    /// When it was written
    pub timestamp: DateTime<Utc>,
}

/// The failure-triggered artifact-capture subscriber
#[derive(Debug, Clone)]
pub struct FailureArtifacts {
    dir: PathBuf,
    journal: Option<StepJournal>,
}

impl FailureArtifacts {
    /// Capture into `dir` (created on demand at first failure)
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            journal: None,
        }
    }

    /// Also dump this step journal into the log artifact
    #[must_use]
    pub fn with_journal(mut self, journal: StepJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// The artifact directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Observe a terminal outcome. Captures artifacts for failures,
    /// does nothing for passes, and never fails the run itself:
    /// the returned list simply omits anything that could not be
    /// written.
    pub async fn on_outcome(
        &self,
        outcome: &TestOutcome,
        session: Option<&Session>,
    ) -> Vec<DiagnosticArtifact> {
        if !outcome.status.is_failure() {
            return Vec::new();
        }
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            tracing::warn!(
                dir = %self.dir.display(),
                error = %e,
                "cannot create artifact directory; diagnostics skipped"
            );
            return Vec::new();
        }

        let live = match session {
            Some(s) if !s.is_closed() => Some(s),
            _ => None,
        };
        let Some(session) = live else {
            let reason = if session.is_none() {
                "no session attached to this test"
            } else {
                "session already closed at failure time"
            };
            tracing::warn!(test_id = %outcome.test_id, reason, "diagnostics unavailable");
            return self
                .write(outcome, ArtifactKind::Unavailable, {
                    format!("diagnostics unavailable: {reason}\n").into_bytes()
                })
                .into_iter()
                .collect();
        };

        let mut artifacts = Vec::new();

        match session.screenshot().await {
            Ok(png) => {
                artifacts.extend(self.write(outcome, ArtifactKind::Screenshot, png));
            }
            Err(e) => {
                tracing::warn!(test_id = %outcome.test_id, error = %e, "screenshot capture failed");
            }
        }

        let mut dump = String::new();
        if let Some(journal) = &self.journal {
            dump.push_str(&journal.render());
        }
        match session.console_logs().await {
            Ok(lines) if !lines.is_empty() => {
                dump.push_str("--- console ---\n");
                for line in lines {
                    dump.push_str(&line);
                    dump.push('\n');
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(test_id = %outcome.test_id, error = %e, "console capture failed");
            }
        }
        artifacts.extend(self.write(outcome, ArtifactKind::LogDump, dump.into_bytes()));

        artifacts
    }

    /// Write one artifact, warning instead of failing. Names carry the
    /// outcome timestamp plus a random discriminator, so the store is
    /// append-only: nothing is ever overwritten.
    fn write(
        &self,
        outcome: &TestOutcome,
        kind: ArtifactKind,
        bytes: Vec<u8>,
    ) -> Option<DiagnosticArtifact> {
        let stamp = outcome.timestamp.format("%Y%m%d_%H%M%S");
        let salt = uuid::Uuid::new_v4().simple().to_string();
        let discriminator = &salt[..8];
        let filename = format!(
            "{}_{}_{}_{}.{}",
            kind.slug(),
            outcome.test_id,
            stamp,
            discriminator,
            kind.extension()
        );
        let path = self.dir.join(filename);
        match std::fs::write(&path, bytes) {
            Ok(()) => Some(DiagnosticArtifact {
                kind,
                path,
                test_id: outcome.test_id.clone(),
                timestamp: outcome.timestamp,
            }),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to write diagnostic artifact"
                );
                None
            }
        }
    }
}
