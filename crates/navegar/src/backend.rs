//! The DOM surface seam.
//!
//! [`DomBackend`] is the only abstraction that touches a live DOM.
//! The synchronized interaction layer is written entirely against this
//! trait, which keeps the poll-loop logic testable without a browser:
//! the CDP implementation (feature `browser`) drives a real Chromium,
//! while [`crate::mock::MockPage`] provides a scriptable in-memory
//! page for harness tests.
//!
//! Backends resolve locators fresh on every call. An element is
//! addressed as (locator, index into the current match list), so a
//! node that detaches between resolution and action surfaces as
//! [`crate::NavegarError::Stale`] rather than an undefined crash.

use async_trait::async_trait;

use crate::locator::Locator;
use crate::result::NavegarResult;

/// Observed state of one matched element at a single poll instant
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementState {
    /// Rendered with non-zero geometry and not `display:none` /
    /// `visibility:hidden`
    pub displayed: bool,
    /// Not carrying the `disabled` attribute
    pub enabled: bool,
    /// Displayed but covered by another node at its center point
    pub obscured: bool,
    /// Visible text content
    pub text: String,
    /// Form value, for input-like elements
    pub value: Option<String>,
}

impl ElementState {
    /// Whether a click dispatched now would land on this element
    #[must_use]
    pub const fn clickable(&self) -> bool {
        self.displayed && self.enabled && !self.obscured
    }
}

/// Asynchronous DOM surface a session drives.
///
/// All methods resolve the locator against the *current* document.
/// Implementations must never block beyond the duration of one DOM
/// round-trip; bounded waiting is the interaction layer's job, not
/// the backend's.
#[async_trait]
pub trait DomBackend: Send + Sync {
    /// Navigate to an absolute URL
    async fn goto(&self, url: &str) -> NavegarResult<()>;

    /// Current document URL
    async fn current_url(&self) -> NavegarResult<String>;

    /// Resolve the locator, returning the state of every match in
    /// document order (empty when nothing matches)
    async fn query(&self, locator: &Locator) -> NavegarResult<Vec<ElementState>>;

    /// Dispatch a click on the `index`-th match of `locator`.
    /// Fails with `Stale` when the match list no longer covers `index`.
    async fn click(&self, locator: &Locator, index: usize) -> NavegarResult<()>;

    /// Clear the form value of the `index`-th match
    async fn clear(&self, locator: &Locator, index: usize) -> NavegarResult<()>;

    /// Append keystrokes to the `index`-th match. Callers wanting
    /// replace-semantics clear first; the backend itself types into
    /// whatever content is already there.
    async fn type_text(&self, locator: &Locator, index: usize, text: &str) -> NavegarResult<()>;

    /// Capture a PNG screenshot of the current viewport
    async fn screenshot(&self) -> NavegarResult<Vec<u8>>;

    /// Drain the console log lines observed so far
    async fn console_logs(&self) -> NavegarResult<Vec<String>>;

    /// Tear down the underlying browser/page. Further calls on the
    /// backend are undefined; the owning session guards against them.
    async fn close(&self) -> NavegarResult<()>;
}
