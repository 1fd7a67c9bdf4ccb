//! Wait conditions and specs for synchronized interaction.
//!
//! The page renders on its own timeline; test code advances on another.
//! Every interaction is therefore *wait-qualified*: it polls the DOM
//! state at a fixed interval until its condition holds or a bounded
//! timeout elapses. There are no fixed sleeps anywhere in the layer,
//! and no browser-side implicit wait; a WaitSpec is the single
//! source of timing for an operation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default timeout for wait-qualified operations (10 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Condition a wait-qualified operation polls for.
///
/// The condition is implied by the operation a caller chooses
/// (`click` waits for `Clickable`, `type_text` for `Visible`, ...);
/// callers override the timeout only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaitCondition {
    /// Element is attached to the document
    Present,
    /// Element is attached and displayed
    Visible,
    /// Element is absent, or attached but not displayed
    Invisible,
    /// Element is displayed, enabled, and not obscured by another node
    Clickable,
    /// Current URL contains the fragment
    UrlContains(String),
    /// Current URL equals the value exactly
    UrlEquals(String),
}

impl WaitCondition {
    /// Short name used in error messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Visible => "visible",
            Self::Invisible => "invisible",
            Self::Clickable => "clickable",
            Self::UrlContains(_) => "url-contains",
            Self::UrlEquals(_) => "url-equals",
        }
    }
}

impl std::fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UrlContains(fragment) => write!(f, "url-contains {fragment:?}"),
            Self::UrlEquals(url) => write!(f, "url-equals {url:?}"),
            _ => write!(f, "{}", self.as_str()),
        }
    }
}

/// Timing envelope for one wait-qualified operation.
///
/// Both fields are strictly positive; `WaitSpec::validate` is applied
/// at session configuration time so a zero timeout can never reach the
/// poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitSpec {
    /// Upper bound on the wait, in milliseconds
    pub timeout_ms: u64,
    /// Interval between DOM polls, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitSpec {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitSpec {
    /// Create a spec with the default poll interval
    #[must_use]
    pub const fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Override the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Override the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Timeout as a `Duration`
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Poll interval as a `Duration`
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Check that both bounds are strictly positive
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.timeout_ms > 0 && self.poll_interval_ms > 0
    }
}
