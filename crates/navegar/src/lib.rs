//! Navegar: a synchronized browser UI test harness.
//!
//! Navegar drives a real browser through user flows (signup, login,
//! contact-list navigation) while the page renders and mutates on its
//! own timeline. Every interaction is wait-qualified: it polls the
//! DOM up to a bounded timeout instead of assuming the page is ready,
//! and every failure ships with diagnostics captured at the moment the
//! test went red.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Test Scenario                                                   │
//! │     │                              │                             │
//! │     ▼                              ▼                             │
//! │  Page Objects                  ApiClient ──► backend (HTTP)      │
//! │     │                                                            │
//! │     ▼                                                            │
//! │  Driver (wait-qualified ops) ──► Session ──► DomBackend          │
//! │     │                              ▲         (CDP | MockPage)    │
//! │     ▼                              │                             │
//! │  StepJournal ◄── FailureArtifacts ─┘  (screenshot + log dump)    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The failure policy is two-tier by design: mutating operations
//! (`click`, `type_text`) raise typed errors when their wait never
//! holds, while observational operations (`text`, `is_visible`,
//! `find_all`) collapse to `None`/`false`/empty so negative-test
//! assertions stay expressible.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod backend;
mod driver;
mod locator;
mod result;
mod session;
mod trace;
mod wait;

/// HTTP client for the backend verification path
pub mod api;

/// Random test-data generation
pub mod data;

/// Failure-triggered screenshot and log capture
pub mod diagnostics;

/// Per-test context with scoped session acquisition
pub mod harness;

/// Scriptable in-memory page for harness testing
pub mod mock;

/// Page objects for the contact-list application
pub mod pages;

/// Real browser control over CDP
#[cfg(feature = "browser")]
mod cdp;

pub use backend::{DomBackend, ElementState};
pub use driver::{Driver, Element};
pub use locator::{Locator, Strategy};
pub use result::{NavegarError, NavegarResult};
pub use session::{BrowserEngine, Session, SessionConfig};
pub use trace::{StepJournal, StepLevel, StepRecord};
pub use wait::{WaitCondition, WaitSpec, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
