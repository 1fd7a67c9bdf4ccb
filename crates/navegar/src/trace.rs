//! Structured step journal for failure diagnostics.
//!
//! The interaction layer records every operation it performs into a
//! capacity-bounded, in-memory journal. On failure the diagnostics
//! hook renders the journal into the log-dump artifact, so a failed
//! test ships with the exact sequence of waits and actions that led up
//! to it. Records are mirrored to `tracing` as they happen; installing
//! a subscriber is the embedding test's business.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Default cap on retained records
pub const DEFAULT_MAX_RECORDS: usize = 10_000;

/// Severity of a journal record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepLevel {
    /// Routine step
    Info,
    /// Degraded but recoverable
    Warn,
    /// Step failed
    Error,
}

impl StepLevel {
    /// Fixed-width label used when rendering
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO ",
            Self::Warn => "WARN ",
            Self::Error => "ERROR",
        }
    }
}

/// One recorded step
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Milliseconds since the journal was created
    pub at_ms: u64,
    /// Severity
    pub level: StepLevel,
    /// Human-readable step description
    pub message: String,
}

#[derive(Debug)]
struct JournalInner {
    started: Instant,
    records: VecDeque<StepRecord>,
    max_records: usize,
    dropped: u64,
}

/// Shared, capacity-bounded journal of interaction steps
#[derive(Debug, Clone)]
pub struct StepJournal {
    inner: Arc<Mutex<JournalInner>>,
}

impl Default for StepJournal {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_RECORDS)
    }
}

impl StepJournal {
    /// Create a journal with the default capacity
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a journal retaining at most `max_records` entries;
    /// older entries are dropped first
    #[must_use]
    pub fn with_capacity(max_records: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(JournalInner {
                started: Instant::now(),
                records: VecDeque::new(),
                max_records: max_records.max(1),
                dropped: 0,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, JournalInner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Record a step at the given level
    pub fn record(&self, level: StepLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            StepLevel::Info => tracing::debug!(target: "navegar::step", "{message}"),
            StepLevel::Warn => tracing::warn!(target: "navegar::step", "{message}"),
            StepLevel::Error => tracing::error!(target: "navegar::step", "{message}"),
        }
        let mut inner = self.lock();
        let at_ms = inner.started.elapsed().as_millis() as u64;
        if inner.records.len() == inner.max_records {
            inner.records.pop_front();
            inner.dropped += 1;
        }
        inner.records.push_back(StepRecord {
            at_ms,
            level,
            message,
        });
    }

    /// Record a routine step
    pub fn info(&self, message: impl Into<String>) {
        self.record(StepLevel::Info, message);
    }

    /// Record a degraded step
    pub fn warn(&self, message: impl Into<String>) {
        self.record(StepLevel::Warn, message);
    }

    /// Record a failed step
    pub fn error(&self, message: impl Into<String>) {
        self.record(StepLevel::Error, message);
    }

    /// Number of retained records
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Whether the journal holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Render the journal as plain text, one record per line
    #[must_use]
    pub fn render(&self) -> String {
        let inner = self.lock();
        let mut out = String::new();
        if inner.dropped > 0 {
            out.push_str(&format!(
                "... {} earlier records dropped (capacity {})\n",
                inner.dropped, inner.max_records
            ));
        }
        for record in &inner.records {
            out.push_str(&format!(
                "[{:>8}ms] {} {}\n",
                record.at_ms,
                record.level.as_str(),
                record.message
            ));
        }
        out
    }

    /// Discard all records
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.records.clear();
        inner.dropped = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_accumulate_in_order() {
        let journal = StepJournal::new();
        journal.info("navigate /login");
        journal.warn("retrying stale element");
        journal.error("click timed out");

        assert_eq!(journal.len(), 3);
        let rendered = journal.render();
        let nav = rendered.find("navigate /login").unwrap();
        let retry = rendered.find("retrying stale element").unwrap();
        let fail = rendered.find("click timed out").unwrap();
        assert!(nav < retry && retry < fail);
        assert!(rendered.contains("ERROR"));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let journal = StepJournal::with_capacity(2);
        journal.info("first");
        journal.info("second");
        journal.info("third");

        assert_eq!(journal.len(), 2);
        let rendered = journal.render();
        assert!(!rendered.contains("first\n"));
        assert!(rendered.contains("second"));
        assert!(rendered.contains("1 earlier records dropped"));
    }

    #[test]
    fn test_clear_resets() {
        let journal = StepJournal::new();
        journal.info("step");
        journal.clear();
        assert!(journal.is_empty());
        assert_eq!(journal.render(), "");
    }

    #[test]
    fn test_clones_share_the_buffer() {
        let journal = StepJournal::new();
        let observer = journal.clone();
        journal.info("from the driver");
        assert_eq!(observer.len(), 1);
    }
}
