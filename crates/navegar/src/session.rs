//! Browser session lifecycle and configuration.
//!
//! A [`Session`] is an exclusively-owned handle to one running browser
//! surface: created once per test, the only component permitted to
//! mutate browser state, and torn down before the next test begins.
//! Lifecycle is Created → Active → Closed; once closed, every
//! operation fails deterministically with
//! [`NavegarError::SessionClosed`]: it never hangs and never silently
//! no-ops.
//!
//! Sessions come from pure factory functions taking an explicit
//! [`SessionConfig`]; there is no ambient or global configuration
//! state. Configuration errors are fatal at construction time, before
//! any test body runs.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::DomBackend;
use crate::result::{NavegarError, NavegarResult};
use crate::wait::WaitSpec;

/// Browser engine driven by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrowserEngine {
    /// Chrome / Chromium
    #[default]
    Chrome,
    /// Firefox, over its CDP remote-debugging endpoint
    Firefox,
}

impl BrowserEngine {
    /// Canonical lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
        }
    }
}

impl FromStr for BrowserEngine {
    type Err = NavegarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Ok(Self::Chrome),
            "firefox" => Ok(Self::Firefox),
            other => Err(NavegarError::configuration(format!(
                "unsupported browser engine {other:?} (expected \"chrome\" or \"firefox\")"
            ))),
        }
    }
}

impl std::fmt::Display for BrowserEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Explicit configuration for one session.
///
/// There is no browser-side implicit wait: `wait` feeds the explicit
/// per-operation waits exclusively, so two timeout systems can never
/// compound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Run the browser headless
    pub headless: bool,
    /// Engine to drive
    pub engine: BrowserEngine,
    /// Base URL of the application under test
    pub base_url: String,
    /// Explicit path to the browser binary (None = auto-detect)
    pub browser_path: Option<String>,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Default timing for wait-qualified operations
    pub wait: WaitSpec,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            engine: BrowserEngine::Chrome,
            base_url: String::new(),
            browser_path: None,
            viewport_width: 1920,
            viewport_height: 1080,
            wait: WaitSpec::default(),
        }
    }
}

impl SessionConfig {
    /// Create a config for the given application base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the browser engine
    #[must_use]
    pub const fn with_engine(mut self, engine: BrowserEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Set an explicit browser binary path
    #[must_use]
    pub fn with_browser_path(mut self, path: impl Into<String>) -> Self {
        self.browser_path = Some(path.into());
        self
    }

    /// Set the viewport
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set the default timeout for wait-qualified operations
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.wait.timeout_ms = timeout_ms;
        self
    }

    /// Set the poll interval for wait-qualified operations
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.wait.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Load a config from `NAVEGAR_*` environment variables.
    ///
    /// `NAVEGAR_BASE_URL` is required; `NAVEGAR_BROWSER`,
    /// `NAVEGAR_HEADLESS`, `NAVEGAR_TIMEOUT_MS`, and
    /// `NAVEGAR_BROWSER_PATH` override their defaults. Invalid values
    /// fail fast with a configuration error.
    pub fn from_env() -> NavegarResult<Self> {
        let base_url = std::env::var("NAVEGAR_BASE_URL").map_err(|_| {
            NavegarError::configuration("NAVEGAR_BASE_URL is not set")
        })?;
        let mut config = Self::new(base_url);

        if let Ok(engine) = std::env::var("NAVEGAR_BROWSER") {
            config.engine = engine.parse()?;
        }
        if let Ok(headless) = std::env::var("NAVEGAR_HEADLESS") {
            config.headless = match headless.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(NavegarError::configuration(format!(
                        "NAVEGAR_HEADLESS={other:?} is not a boolean"
                    )))
                }
            };
        }
        if let Ok(timeout) = std::env::var("NAVEGAR_TIMEOUT_MS") {
            config.wait.timeout_ms = timeout.trim().parse().map_err(|_| {
                NavegarError::configuration(format!(
                    "NAVEGAR_TIMEOUT_MS={timeout:?} is not an integer"
                ))
            })?;
        }
        if let Ok(path) = std::env::var("NAVEGAR_BROWSER_PATH") {
            config.browser_path = Some(path);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the config is usable; called by every session factory
    pub fn validate(&self) -> NavegarResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(NavegarError::configuration("base_url must not be empty"));
        }
        if !self.wait.is_valid() {
            return Err(NavegarError::configuration(
                "wait timeout and poll interval must be greater than zero",
            ));
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(NavegarError::configuration(
                "viewport dimensions must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// One exclusively-owned browser automation handle, scoped to one test
pub struct Session {
    backend: Arc<dyn DomBackend>,
    config: SessionConfig,
    closed: AtomicBool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("engine", &self.config.engine)
            .field("base_url", &self.config.base_url)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wrap an already-constructed backend (mock pages, embedded
    /// surfaces). Validates the configuration before accepting it.
    pub fn with_backend(
        backend: impl DomBackend + 'static,
        config: SessionConfig,
    ) -> NavegarResult<Self> {
        config.validate()?;
        Ok(Self {
            backend: Arc::new(backend),
            config,
            closed: AtomicBool::new(false),
        })
    }

    /// Launch a real browser session over CDP.
    ///
    /// Resolves the configured engine to an executable, starts it, and
    /// opens a blank page. Fails fast with a configuration or launch
    /// error before any test body runs.
    #[cfg(feature = "browser")]
    pub async fn launch(config: SessionConfig) -> NavegarResult<Self> {
        config.validate()?;
        let backend = crate::cdp::CdpBackend::launch(&config).await?;
        Ok(Self {
            backend: Arc::new(backend),
            config,
            closed: AtomicBool::new(false),
        })
    }

    /// The session's configuration
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether the session has been closed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Reject operations on a closed session at the boundary
    pub(crate) fn ensure_active(&self) -> NavegarResult<()> {
        if self.is_closed() {
            Err(NavegarError::SessionClosed)
        } else {
            Ok(())
        }
    }

    /// The DOM surface, for the interaction layer
    pub(crate) fn backend(&self) -> &Arc<dyn DomBackend> {
        &self.backend
    }

    /// Capture a PNG screenshot. Used by the diagnostics hook; also
    /// available to tests that want an artifact mid-flight.
    pub async fn screenshot(&self) -> NavegarResult<Vec<u8>> {
        self.ensure_active()?;
        self.backend.screenshot().await
    }

    /// Drain the console log lines observed so far
    pub async fn console_logs(&self) -> NavegarResult<Vec<String>> {
        self.ensure_active()?;
        self.backend.console_logs().await
    }

    /// Close the session. Idempotent: the first call tears down the
    /// backend, later calls are no-ops. After this returns, every
    /// operation on the session fails with `SessionClosed`.
    pub async fn close(&self) -> NavegarResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::debug!(engine = %self.config.engine, "closing browser session");
        self.backend.close().await
    }
}
