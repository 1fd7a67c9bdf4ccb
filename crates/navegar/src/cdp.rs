//! Real browser control over the Chrome DevTools Protocol.
//!
//! [`CdpBackend`] implements [`DomBackend`] with chromiumoxide. One
//! backend owns one browser process and one page; the session layer
//! guarantees no operation arrives after close.
//!
//! Element state is snapshotted with a single JavaScript evaluation
//! per poll (geometry, computed style, hit-testing for obscurement),
//! so a poll tick costs one DOM round-trip regardless of the match
//! count. Actions go through native element handles where the locator
//! is CSS-expressible and fall back to JavaScript dispatch for XPath.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
use chromiumoxide::element::Element as CdpElement;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::Deserialize;

use crate::backend::{DomBackend, ElementState};
use crate::locator::{Locator, Strategy};
use crate::result::{NavegarError, NavegarResult};
use crate::session::{BrowserEngine, SessionConfig};

/// Console lines retained before the oldest are dropped
const CONSOLE_CAPACITY: usize = 2_000;

/// Element state snapshot as computed in the page
#[derive(Debug, Deserialize)]
struct JsElementState {
    displayed: bool,
    enabled: bool,
    obscured: bool,
    text: String,
    value: Option<String>,
}

impl From<JsElementState> for ElementState {
    fn from(js: JsElementState) -> Self {
        Self {
            displayed: js.displayed,
            enabled: js.enabled,
            obscured: js.obscured,
            text: js.text,
            value: js.value,
        }
    }
}

/// CDP-backed DOM surface
pub(crate) struct CdpBackend {
    browser: tokio::sync::Mutex<Browser>,
    page: Page,
    console: Arc<Mutex<Vec<String>>>,
    handler: tokio::task::JoinHandle<()>,
}

impl std::fmt::Debug for CdpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdpBackend").finish_non_exhaustive()
    }
}

impl CdpBackend {
    /// Launch the configured engine and open a blank page
    pub(crate) async fn launch(config: &SessionConfig) -> NavegarResult<Self> {
        let mut builder = BrowserConfig::builder();

        if !config.headless {
            builder = builder.with_head();
        }
        builder = builder
            .no_sandbox()
            .window_size(config.viewport_width, config.viewport_height)
            .arg("--disable-dev-shm-usage");

        match config.engine {
            BrowserEngine::Chrome => {
                if let Some(path) = &config.browser_path {
                    builder = builder.chrome_executable(path);
                }
            }
            // Firefox speaks CDP on its remote-debugging endpoint, but
            // there is no auto-detection: an explicit binary is required.
            BrowserEngine::Firefox => {
                let path = config
                    .browser_path
                    .as_ref()
                    .ok_or(NavegarError::BrowserNotFound)?;
                builder = builder.chrome_executable(path);
            }
        }

        let cdp_config = builder.build().map_err(|e| NavegarError::BrowserLaunch {
            message: e.to_string(),
        })?;

        let (browser, mut events) =
            Browser::launch(cdp_config)
                .await
                .map_err(|e| NavegarError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| NavegarError::BrowserLaunch {
                message: e.to_string(),
            })?;

        let console = Arc::new(Mutex::new(Vec::new()));
        let console_sink = Arc::clone(&console);
        let console_page = page.clone();
        tokio::spawn(async move {
            if let Ok(mut stream) = console_page
                .event_listener::<EventConsoleApiCalled>()
                .await
            {
                while let Some(event) = stream.next().await {
                    let text = serde_json::to_string(&event.args).unwrap_or_default();
                    let line = format!("{:?}: {text}", event.r#type);
                    let mut buf = console_sink
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner);
                    if buf.len() == CONSOLE_CAPACITY {
                        buf.remove(0);
                    }
                    buf.push(line);
                }
            }
        });

        Ok(Self {
            browser: tokio::sync::Mutex::new(browser),
            page,
            console,
            handler,
        })
    }

    /// Resolve the `index`-th match natively. Stale when the match
    /// list no longer covers `index`.
    async fn nth_element(&self, locator: &Locator, index: usize) -> NavegarResult<CdpElement> {
        if let Some(css) = locator.to_css() {
            let elements = self
                .page
                .find_elements(css.as_str())
                .await
                .map_err(|_| NavegarError::Stale)?;
            return elements.into_iter().nth(index).ok_or(NavegarError::Stale);
        }
        if locator.strategy() == Strategy::LinkText {
            let anchors = self
                .page
                .find_elements("a")
                .await
                .map_err(|_| NavegarError::Stale)?;
            let mut matched = Vec::new();
            for anchor in anchors {
                if let Ok(Some(text)) = anchor.inner_text().await {
                    if text.trim() == locator.value() {
                        matched.push(anchor);
                    }
                }
            }
            return matched.into_iter().nth(index).ok_or(NavegarError::Stale);
        }
        Err(NavegarError::Unsupported {
            message: format!("{locator} has no native element resolution"),
        })
    }

    /// Run a statement against the `index`-th match via JavaScript.
    /// Used for XPath locators and for value mutation.
    async fn eval_on_nth(
        &self,
        locator: &Locator,
        index: usize,
        statement: &str,
    ) -> NavegarResult<()> {
        let expr = format!(
            "(() => {{ const el = {}[{}]; if (!el) return false; {}; return true; }})()",
            locator.to_query_all(),
            index,
            statement
        );
        let found: bool = self
            .page
            .evaluate(expr)
            .await
            .map_err(|e| map_action_error(&e))?
            .into_value()
            .map_err(|e| NavegarError::backend(e.to_string()))?;
        if found {
            Ok(())
        } else {
            Err(NavegarError::Stale)
        }
    }
}

/// CDP faults during an action on a resolved element usually mean the
/// node left the document between resolution and dispatch.
fn map_action_error(e: &chromiumoxide::error::CdpError) -> NavegarError {
    let message = e.to_string();
    let lower = message.to_lowercase();
    if lower.contains("node") || lower.contains("detached") || lower.contains("not found") {
        NavegarError::Stale
    } else {
        NavegarError::Backend { message }
    }
}

#[async_trait]
impl DomBackend for CdpBackend {
    async fn goto(&self, url: &str) -> NavegarResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| NavegarError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> NavegarResult<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| NavegarError::backend(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    async fn query(&self, locator: &Locator) -> NavegarResult<Vec<ElementState>> {
        let expr = format!(
            "JSON.stringify({}.map(el => {{ \
                const r = el.getBoundingClientRect(); \
                const s = window.getComputedStyle(el); \
                const displayed = r.width > 0 && r.height > 0 \
                    && s.display !== 'none' && s.visibility !== 'hidden'; \
                let obscured = false; \
                if (displayed) {{ \
                    const t = document.elementFromPoint(r.x + r.width / 2, r.y + r.height / 2); \
                    obscured = t !== null && t !== el && !el.contains(t) && !t.contains(el); \
                }} \
                return {{ \
                    displayed, \
                    enabled: !el.disabled, \
                    obscured, \
                    text: (el.innerText || el.textContent || '').trim(), \
                    value: ('value' in el) ? String(el.value) : null \
                }}; \
            }}))",
            locator.to_query_all()
        );
        let json: String = self
            .page
            .evaluate(expr)
            .await
            .map_err(|e| NavegarError::backend(e.to_string()))?
            .into_value()
            .map_err(|e| NavegarError::backend(e.to_string()))?;
        let states: Vec<JsElementState> =
            serde_json::from_str(&json).map_err(|e| NavegarError::backend(e.to_string()))?;
        Ok(states.into_iter().map(ElementState::from).collect())
    }

    async fn click(&self, locator: &Locator, index: usize) -> NavegarResult<()> {
        if locator.strategy() == Strategy::XPath {
            return self.eval_on_nth(locator, index, "el.click()").await;
        }
        let element = self.nth_element(locator, index).await?;
        element.click().await.map_err(|e| map_action_error(&e))?;
        Ok(())
    }

    async fn clear(&self, locator: &Locator, index: usize) -> NavegarResult<()> {
        // Clearing is a value reset plus the events a framework binds to
        self.eval_on_nth(
            locator,
            index,
            "if ('value' in el) { el.value = ''; \
             el.dispatchEvent(new Event('input', { bubbles: true })); \
             el.dispatchEvent(new Event('change', { bubbles: true })); }",
        )
        .await
    }

    async fn type_text(&self, locator: &Locator, index: usize, text: &str) -> NavegarResult<()> {
        if locator.strategy() == Strategy::XPath {
            let statement = format!(
                "if ('value' in el) {{ el.value = el.value + {text:?}; \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }})); }}"
            );
            return self.eval_on_nth(locator, index, &statement).await;
        }
        let element = self.nth_element(locator, index).await?;
        element.click().await.map_err(|e| map_action_error(&e))?;
        element
            .type_str(text)
            .await
            .map_err(|e| map_action_error(&e))?;
        Ok(())
    }

    async fn screenshot(&self) -> NavegarResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let response = self
            .page
            .execute(params)
            .await
            .map_err(|e| NavegarError::Screenshot {
                message: e.to_string(),
            })?;
        base64::engine::general_purpose::STANDARD
            .decode(&response.data)
            .map_err(|e| NavegarError::Screenshot {
                message: e.to_string(),
            })
    }

    async fn console_logs(&self) -> NavegarResult<Vec<String>> {
        Ok(self
            .console
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    async fn close(&self) -> NavegarResult<()> {
        let mut browser = self.browser.lock().await;
        let result = browser
            .close()
            .await
            .map_err(|e| NavegarError::backend(e.to_string()));
        self.handler.abort();
        result
    }
}
