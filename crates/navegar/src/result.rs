//! Result and error types for Navegar.
//!
//! The error split mirrors the interaction layer's failure policy:
//! mutating operations surface `Timeout`/`NotFound` as hard errors,
//! observational operations collapse timeouts into boundary values and
//! only ever raise `SessionClosed` or a backend fault.

use thiserror::Error;

use crate::locator::Locator;
use crate::wait::WaitCondition;

/// Result type for Navegar operations
pub type NavegarResult<T> = Result<T, NavegarError>;

/// Errors that can occur in Navegar
#[derive(Debug, Error)]
pub enum NavegarError {
    /// Browser executable not found
    #[error("browser not found; install Chrome/Chromium or set browser_path")]
    BrowserNotFound,

    /// Browser launch error
    #[error("failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// A wait-qualified mutating operation's condition never held
    /// within its budget
    #[error("waiting for {condition} on {locator} timed out after {ms}ms")]
    Timeout {
        /// Locator that was being waited on
        locator: Locator,
        /// Condition that never held
        condition: WaitCondition,
        /// Timeout budget in milliseconds
        ms: u64,
    },

    /// Element resolved as absent or detached after the internal retry
    #[error("element {locator} not found (absent or detached)")]
    NotFound {
        /// Locator that failed to resolve
        locator: Locator,
    },

    /// An element reference went stale between resolution and action.
    /// The driver retries once internally; callers only see this
    /// translated into `NotFound`.
    #[error("element reference went stale")]
    Stale,

    /// The locator strategy is not supported by the active backend
    #[error("unsupported operation: {message}")]
    Unsupported {
        /// What was attempted
        message: String,
    },

    /// Operation issued against a closed session
    #[error("session is closed; no further operations are accepted")]
    SessionClosed,

    /// Screenshot capture failed
    #[error("screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Invalid or missing configuration value; fatal before any test
    /// body runs
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Backend (DOM surface) fault that is none of the above
    #[error("backend error: {message}")]
    Backend {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NavegarError {
    /// Build a `Configuration` error from any displayable message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Build a `Backend` error from any displayable message.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Whether this error is the typed timeout of a wait-qualified
    /// operation.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this error rejects an operation on a closed session.
    #[must_use]
    pub const fn is_session_closed(&self) -> bool {
        matches!(self, Self::SessionClosed)
    }
}
