//! The synchronized interaction layer.
//!
//! [`Driver`] translates a [`Locator`] plus an intended action into a
//! result, absorbing the page's asynchronous rendering by polling the
//! DOM at a fixed interval, never by a fixed sleep. Every operation
//! carries a bounded timeout; nothing here can block indefinitely.
//!
//! The failure policy is split deliberately per operation family:
//!
//! - **mutating** operations (`click`, `type_text`) and `find` fail
//!   loudly with a typed [`NavegarError::Timeout`]; a test must not
//!   silently proceed past a write that didn't happen;
//! - **observational** operations (`text`, `is_visible`,
//!   `is_invisible`, `find_all`, the URL waits) collapse a timeout
//!   into `None` / `false` / an empty list, because such reads are
//!   routinely the asserted condition of a negative test ("the error
//!   banner is NOT present" must not throw).
//!
//! An element located successfully but detached before the action
//! lands (the stale-element race) is retried once within the remaining
//! timeout budget, then surfaced as [`NavegarError::NotFound`].

use std::sync::Arc;
use std::time::Instant;

use url::Url;

use crate::backend::ElementState;
use crate::locator::Locator;
use crate::result::{NavegarError, NavegarResult};
use crate::session::Session;
use crate::trace::StepJournal;
use crate::wait::{WaitCondition, WaitSpec};

/// A resolved element handle: the locator plus its position in the
/// match list at resolution time. Handles re-resolve on every action,
/// so they stay cheap and never dangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    locator: Locator,
    index: usize,
}

impl Element {
    /// The locator this element was resolved from
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Position within the locator's match list
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.locator, self.index)
    }
}

/// Outcome of one condition check over the current match list
enum ConditionHit {
    /// Condition holds for the element at this index
    At(usize),
    /// Condition holds because no displayed element matches
    Absent,
}

/// Wait-qualified operations over one session.
///
/// Cloning a driver shares the session and step journal; operations
/// issued sequentially execute in issuance order against the session.
#[derive(Debug, Clone)]
pub struct Driver {
    session: Arc<Session>,
    journal: StepJournal,
}

impl Driver {
    /// Wrap a session with a fresh step journal
    #[must_use]
    pub fn new(session: Arc<Session>) -> Self {
        Self::with_journal(session, StepJournal::new())
    }

    /// Wrap a session, recording steps into an existing journal
    #[must_use]
    pub fn with_journal(session: Arc<Session>, journal: StepJournal) -> Self {
        Self { session, journal }
    }

    /// The underlying session
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// The step journal operations are recorded into
    #[must_use]
    pub fn journal(&self) -> &StepJournal {
        &self.journal
    }

    fn spec(&self, timeout_ms: u64) -> WaitSpec {
        self.session.config().wait.with_timeout(timeout_ms)
    }

    fn default_timeout(&self) -> u64 {
        self.session.config().wait.timeout_ms
    }

    /// Navigate to an absolute URL, or a path resolved against the
    /// configured base URL
    pub async fn goto(&self, target: &str) -> NavegarResult<()> {
        self.session.ensure_active()?;
        let url = self.resolve_url(target)?;
        self.journal.info(format!("navigate {url}"));
        self.session.backend().goto(&url).await
    }

    /// The session's current URL
    pub async fn current_url(&self) -> NavegarResult<String> {
        self.session.ensure_active()?;
        self.session.backend().current_url().await
    }

    /// Wait for the element to be present and return a handle to it
    pub async fn find(&self, locator: &Locator) -> NavegarResult<Element> {
        self.find_within(locator, self.default_timeout()).await
    }

    /// [`Driver::find`] with an explicit timeout
    pub async fn find_within(&self, locator: &Locator, timeout_ms: u64) -> NavegarResult<Element> {
        self.journal.info(format!("find {locator}"));
        let index = self
            .await_index(locator, WaitCondition::Present, timeout_ms)
            .await
            .map_err(|e| self.fail(e))?;
        Ok(Element {
            locator: locator.clone(),
            index,
        })
    }

    /// Wait for at least one match and return handles to all of them.
    /// An empty list, not an error, when nothing appears in time:
    /// absence of elements is a valid state for list-type queries.
    pub async fn find_all(&self, locator: &Locator) -> NavegarResult<Vec<Element>> {
        self.find_all_within(locator, self.default_timeout()).await
    }

    /// [`Driver::find_all`] with an explicit timeout
    pub async fn find_all_within(
        &self,
        locator: &Locator,
        timeout_ms: u64,
    ) -> NavegarResult<Vec<Element>> {
        self.journal.info(format!("find all {locator}"));
        match self
            .await_index(locator, WaitCondition::Present, timeout_ms)
            .await
        {
            Ok(_) => {
                let states = self.query(locator).await?;
                Ok((0..states.len())
                    .map(|index| Element {
                        locator: locator.clone(),
                        index,
                    })
                    .collect())
            }
            Err(e) if e.is_timeout() => Ok(Vec::new()),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Wait for the element to be clickable (present, displayed,
    /// enabled, unobscured), then dispatch a click. A found-but-never-
    /// clickable element is a timeout, not a silent no-op.
    pub async fn click(&self, locator: &Locator) -> NavegarResult<()> {
        self.click_within(locator, self.default_timeout()).await
    }

    /// [`Driver::click`] with an explicit timeout
    pub async fn click_within(&self, locator: &Locator, timeout_ms: u64) -> NavegarResult<()> {
        self.journal.info(format!("click {locator}"));
        let started = Instant::now();
        let index = self
            .await_index(locator, WaitCondition::Clickable, timeout_ms)
            .await
            .map_err(|e| self.fail(e))?;
        match self.session.backend().click(locator, index).await {
            Ok(()) => Ok(()),
            Err(NavegarError::Stale) => {
                self.retry_stale(locator, WaitCondition::Clickable, timeout_ms, started, |i| {
                    let backend = Arc::clone(self.session.backend());
                    let locator = locator.clone();
                    async move { backend.click(&locator, i).await }
                })
                .await
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Wait for the element to be visible, clear its current content,
    /// then type `text`. Clearing is unconditional: re-entering this
    /// operation leaves the field containing exactly `text`, never
    /// `text` appended to stale content.
    pub async fn type_text(&self, locator: &Locator, text: &str) -> NavegarResult<()> {
        self.type_text_within(locator, text, self.default_timeout())
            .await
    }

    /// [`Driver::type_text`] with an explicit timeout
    pub async fn type_text_within(
        &self,
        locator: &Locator,
        text: &str,
        timeout_ms: u64,
    ) -> NavegarResult<()> {
        self.journal.info(format!("type into {locator}"));
        let started = Instant::now();
        let index = self
            .await_index(locator, WaitCondition::Visible, timeout_ms)
            .await
            .map_err(|e| self.fail(e))?;
        match self.clear_and_type(locator, index, text).await {
            Ok(()) => Ok(()),
            Err(NavegarError::Stale) => {
                self.retry_stale(locator, WaitCondition::Visible, timeout_ms, started, |i| {
                    let driver = self.clone();
                    let locator = locator.clone();
                    let text = text.to_string();
                    async move { driver.clear_and_type(&locator, i, &text).await }
                })
                .await
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Wait for the element to be visible and return its text.
    /// `None`, not an error, when the wait times out: absent text is
    /// a legitimate negative-test assertion target.
    pub async fn text(&self, locator: &Locator) -> NavegarResult<Option<String>> {
        self.text_within(locator, self.default_timeout()).await
    }

    /// [`Driver::text`] with an explicit timeout
    pub async fn text_within(
        &self,
        locator: &Locator,
        timeout_ms: u64,
    ) -> NavegarResult<Option<String>> {
        self.journal.info(format!("read text of {locator}"));
        match self
            .await_index(locator, WaitCondition::Visible, timeout_ms)
            .await
        {
            Ok(index) => {
                let states = self.query(locator).await?;
                Ok(states.get(index).map(|s| s.text.clone()))
            }
            Err(e) if e.is_timeout() => Ok(None),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Whether the element becomes visible within the default timeout.
    /// Collapses to `false` on timeout; only session/backend faults
    /// propagate.
    pub async fn is_visible(&self, locator: &Locator) -> NavegarResult<bool> {
        self.is_visible_within(locator, self.default_timeout()).await
    }

    /// [`Driver::is_visible`] with an explicit timeout
    pub async fn is_visible_within(
        &self,
        locator: &Locator,
        timeout_ms: u64,
    ) -> NavegarResult<bool> {
        match self
            .await_index(locator, WaitCondition::Visible, timeout_ms)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_timeout() => Ok(false),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Whether the element becomes invisible (absent or hidden) within
    /// the default timeout. Collapses to `false` on timeout.
    pub async fn is_invisible(&self, locator: &Locator) -> NavegarResult<bool> {
        self.is_invisible_within(locator, self.default_timeout())
            .await
    }

    /// [`Driver::is_invisible`] with an explicit timeout
    pub async fn is_invisible_within(
        &self,
        locator: &Locator,
        timeout_ms: u64,
    ) -> NavegarResult<bool> {
        match self
            .await_condition(locator, WaitCondition::Invisible, timeout_ms)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_timeout() => Ok(false),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Poll the current URL until it contains `fragment`. Collapses to
    /// `false` on timeout.
    pub async fn wait_for_url_contains(
        &self,
        fragment: &str,
        timeout_ms: u64,
    ) -> NavegarResult<bool> {
        self.await_url(WaitCondition::UrlContains(fragment.to_string()), timeout_ms)
            .await
    }

    /// Poll the current URL until it equals `url` exactly. Collapses to
    /// `false` on timeout.
    pub async fn wait_for_url_equals(&self, url: &str, timeout_ms: u64) -> NavegarResult<bool> {
        self.await_url(WaitCondition::UrlEquals(url.to_string()), timeout_ms)
            .await
    }

    // ------------------------------------------------------------------
    // Poll loops
    // ------------------------------------------------------------------

    /// Poll until `condition` holds for `locator`, returning the index
    /// of the element satisfying it (0 for `Absent` conditions).
    async fn await_index(
        &self,
        locator: &Locator,
        condition: WaitCondition,
        timeout_ms: u64,
    ) -> NavegarResult<usize> {
        match self.await_condition(locator, condition, timeout_ms).await? {
            ConditionHit::At(index) => Ok(index),
            ConditionHit::Absent => Ok(0),
        }
    }

    async fn await_condition(
        &self,
        locator: &Locator,
        condition: WaitCondition,
        timeout_ms: u64,
    ) -> NavegarResult<ConditionHit> {
        let spec = self.spec(timeout_ms);
        let deadline = Instant::now() + spec.timeout();
        loop {
            self.session.ensure_active()?;
            let states = self.query(locator).await?;
            if let Some(hit) = Self::condition_hit(&states, &condition)? {
                return Ok(hit);
            }
            if Instant::now() >= deadline {
                return Err(NavegarError::Timeout {
                    locator: locator.clone(),
                    condition,
                    ms: spec.timeout_ms,
                });
            }
            tokio::time::sleep(spec.poll_interval()).await;
        }
    }

    async fn await_url(&self, condition: WaitCondition, timeout_ms: u64) -> NavegarResult<bool> {
        let spec = self.spec(timeout_ms);
        let deadline = Instant::now() + spec.timeout();
        loop {
            self.session.ensure_active()?;
            let url = self.session.backend().current_url().await?;
            let holds = match &condition {
                WaitCondition::UrlContains(fragment) => url.contains(fragment.as_str()),
                WaitCondition::UrlEquals(expected) => url == *expected,
                other => {
                    return Err(NavegarError::Unsupported {
                        message: format!("{other} is not a URL condition"),
                    })
                }
            };
            if holds {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                self.journal
                    .info(format!("{condition} did not hold within {timeout_ms}ms"));
                return Ok(false);
            }
            tokio::time::sleep(spec.poll_interval()).await;
        }
    }

    fn condition_hit(
        states: &[ElementState],
        condition: &WaitCondition,
    ) -> NavegarResult<Option<ConditionHit>> {
        let hit = match condition {
            WaitCondition::Present => {
                if states.is_empty() {
                    None
                } else {
                    Some(ConditionHit::At(0))
                }
            }
            WaitCondition::Visible => states
                .iter()
                .position(|s| s.displayed)
                .map(ConditionHit::At),
            WaitCondition::Clickable => states
                .iter()
                .position(ElementState::clickable)
                .map(ConditionHit::At),
            WaitCondition::Invisible => {
                if states.iter().all(|s| !s.displayed) {
                    Some(ConditionHit::Absent)
                } else {
                    None
                }
            }
            other => {
                return Err(NavegarError::Unsupported {
                    message: format!("{other} is not an element condition"),
                })
            }
        };
        Ok(hit)
    }

    // ------------------------------------------------------------------
    // Action plumbing
    // ------------------------------------------------------------------

    async fn query(&self, locator: &Locator) -> NavegarResult<Vec<ElementState>> {
        self.session.backend().query(locator).await
    }

    async fn clear_and_type(
        &self,
        locator: &Locator,
        index: usize,
        text: &str,
    ) -> NavegarResult<()> {
        let backend = self.session.backend();
        backend.clear(locator, index).await?;
        backend.type_text(locator, index, text).await
    }

    /// Re-resolve once within the remaining budget after a stale
    /// reference, then run the action again. A second failure becomes
    /// `NotFound`.
    async fn retry_stale<F, Fut>(
        &self,
        locator: &Locator,
        condition: WaitCondition,
        timeout_ms: u64,
        started: Instant,
        action: F,
    ) -> NavegarResult<()>
    where
        F: FnOnce(usize) -> Fut,
        Fut: std::future::Future<Output = NavegarResult<()>>,
    {
        self.journal
            .warn(format!("stale element at {locator}; retrying once"));
        let elapsed = started.elapsed().as_millis() as u64;
        let remaining = timeout_ms
            .saturating_sub(elapsed)
            .max(self.session.config().wait.poll_interval_ms);
        let not_found = |e: NavegarError| match e {
            NavegarError::Timeout { .. } | NavegarError::Stale => NavegarError::NotFound {
                locator: locator.clone(),
            },
            other => other,
        };
        let index = self
            .await_index(locator, condition, remaining)
            .await
            .map_err(|e| self.fail(not_found(e)))?;
        action(index).await.map_err(|e| self.fail(not_found(e)))
    }

    fn resolve_url(&self, target: &str) -> NavegarResult<String> {
        if target.starts_with("http://") || target.starts_with("https://") {
            return Ok(target.to_string());
        }
        let base = &self.session.config().base_url;
        Url::parse(base)
            .and_then(|b| b.join(target))
            .map(String::from)
            .map_err(|e| NavegarError::Navigation {
                url: target.to_string(),
                message: format!("cannot resolve against base {base:?}: {e}"),
            })
    }

    fn fail(&self, err: NavegarError) -> NavegarError {
        self.journal.error(err.to_string());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{ClickEffect, MockElement, MockPage};
    use crate::session::SessionConfig;
    use std::time::Duration;

    /// Short-fused config so timeout tests stay fast
    fn fast_config() -> SessionConfig {
        SessionConfig::new("https://app.example")
            .with_timeout_ms(200)
            .with_poll_interval_ms(10)
    }

    fn driver_over(page: &MockPage) -> Driver {
        let session = Session::with_backend(page.clone(), fast_config()).unwrap();
        Driver::new(Arc::new(session))
    }

    mod find_tests {
        use super::*;

        #[tokio::test]
        async fn test_find_returns_handle_when_present() {
            let page = MockPage::new();
            page.add_element("email", MockElement::input("email"));
            let driver = driver_over(&page);

            let element = driver.find(&Locator::id("email")).await.unwrap();
            assert_eq!(element.locator(), &Locator::id("email"));
            assert_eq!(element.index(), 0);
        }

        #[tokio::test]
        async fn test_find_times_out_hard() {
            let page = MockPage::new();
            let driver = driver_over(&page);

            let err = driver.find(&Locator::id("missing")).await.unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test]
        async fn test_find_all_is_soft_on_timeout() {
            let page = MockPage::new();
            let driver = driver_over(&page);

            let rows = driver
                .find_all_within(&Locator::css("#myTable tr"), 100)
                .await
                .unwrap();
            assert!(rows.is_empty());
        }

        #[tokio::test]
        async fn test_find_all_returns_every_match() {
            let page = MockPage::new();
            for i in 0..4 {
                page.add_element(
                    format!("row{i}"),
                    MockElement::new("tr").with_css("#myTable tr"),
                );
            }
            let driver = driver_over(&page);

            let rows = driver.find_all(&Locator::css("#myTable tr")).await.unwrap();
            assert_eq!(rows.len(), 4);
        }
    }

    mod click_tests {
        use super::*;

        #[tokio::test]
        async fn test_click_waits_for_late_element() {
            let page = MockPage::new();
            page.add_element(
                "submit",
                MockElement::button("submit").visible_after(Duration::from_millis(50)),
            );
            let driver = driver_over(&page);

            driver.click(&Locator::id("submit")).await.unwrap();
        }

        #[tokio::test]
        async fn test_click_on_disabled_element_times_out() {
            let page = MockPage::new();
            page.add_element("submit", MockElement::button("submit").disabled());
            let driver = driver_over(&page);

            let err = driver
                .click_within(&Locator::id("submit"), 100)
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test]
        async fn test_click_on_obscured_element_times_out() {
            let page = MockPage::new();
            page.add_element("submit", MockElement::button("submit").obscured());
            let driver = driver_over(&page);

            let err = driver
                .click_within(&Locator::id("submit"), 100)
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test]
        async fn test_click_retries_once_after_stale() {
            let page = MockPage::new();
            page.add_element("submit", MockElement::button("submit"));
            page.stale_next_action("submit");
            let driver = driver_over(&page);

            driver.click(&Locator::id("submit")).await.unwrap();
            assert!(driver.journal().render().contains("retrying once"));
        }
    }

    mod type_tests {
        use super::*;

        #[tokio::test]
        async fn test_type_replaces_prior_content() {
            let page = MockPage::new();
            page.add_element("email", MockElement::input("email"));
            let driver = driver_over(&page);
            let locator = Locator::id("email");

            driver.type_text(&locator, "first@example.test").await.unwrap();
            driver.type_text(&locator, "second@example.test").await.unwrap();
            assert_eq!(
                page.value_of("email").as_deref(),
                Some("second@example.test")
            );
        }

        #[tokio::test]
        async fn test_type_into_hidden_element_times_out() {
            let page = MockPage::new();
            page.add_element("email", MockElement::input("email").hidden());
            let driver = driver_over(&page);

            let err = driver
                .type_text_within(&Locator::id("email"), "x", 100)
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }
    }

    mod read_tests {
        use super::*;

        #[tokio::test]
        async fn test_text_returns_content() {
            let page = MockPage::new();
            page.add_element(
                "error",
                MockElement::new("span")
                    .with_id("error")
                    .with_text("Invalid email"),
            );
            let driver = driver_over(&page);

            let text = driver.text(&Locator::id("error")).await.unwrap();
            assert_eq!(text.as_deref(), Some("Invalid email"));
        }

        #[tokio::test]
        async fn test_text_is_none_when_absent() {
            let page = MockPage::new();
            let driver = driver_over(&page);

            let text = driver
                .text_within(&Locator::id("error"), 100)
                .await
                .unwrap();
            assert!(text.is_none());
        }

        #[tokio::test]
        async fn test_is_visible_collapses_timeout_to_false() {
            let page = MockPage::new();
            page.add_element("banner", MockElement::new("div").with_id("banner").hidden());
            let driver = driver_over(&page);

            assert!(!driver
                .is_visible_within(&Locator::id("banner"), 100)
                .await
                .unwrap());
            assert!(!driver
                .is_visible_within(&Locator::id("missing"), 100)
                .await
                .unwrap());
        }

        #[tokio::test]
        async fn test_is_invisible_for_absent_and_hidden() {
            let page = MockPage::new();
            page.add_element("banner", MockElement::new("div").with_id("banner").hidden());
            let driver = driver_over(&page);

            assert!(driver.is_invisible(&Locator::id("banner")).await.unwrap());
            assert!(driver.is_invisible(&Locator::id("missing")).await.unwrap());
        }

        #[tokio::test]
        async fn test_visibility_does_not_flap_once_revealed() {
            let page = MockPage::new();
            page.add_element(
                "late",
                MockElement::input("late").visible_after(Duration::from_millis(40)),
            );
            let driver = driver_over(&page);
            let locator = Locator::id("late");

            assert!(driver.is_visible(&locator).await.unwrap());
            // A static element stays visible: no flapping false-negative
            for _ in 0..3 {
                assert!(driver.is_visible_within(&locator, 100).await.unwrap());
            }
        }
    }

    mod url_tests {
        use super::*;

        #[tokio::test]
        async fn test_wait_for_url_contains_after_click_navigation() {
            let page = MockPage::new();
            page.set_url("https://app.example/login");
            page.add_element("submit", MockElement::button("submit"))
                .on_click(
                    "submit",
                    vec![ClickEffect::Navigate(
                        "https://app.example/contactList".to_string(),
                    )],
                );
            let driver = driver_over(&page);

            driver.click(&Locator::id("submit")).await.unwrap();
            assert!(driver
                .wait_for_url_contains("/contactList", 200)
                .await
                .unwrap());
        }

        #[tokio::test]
        async fn test_wait_for_url_collapses_timeout_to_false() {
            let page = MockPage::new();
            page.set_url("https://app.example/login");
            let driver = driver_over(&page);

            assert!(!driver
                .wait_for_url_contains("/contactList", 100)
                .await
                .unwrap());
            assert!(!driver
                .wait_for_url_equals("https://app.example/", 100)
                .await
                .unwrap());
        }

        #[tokio::test]
        async fn test_goto_resolves_relative_paths() {
            let page = MockPage::new();
            let driver = driver_over(&page);

            driver.goto("/addUser").await.unwrap();
            assert_eq!(
                driver.current_url().await.unwrap(),
                "https://app.example/addUser"
            );

            driver.goto("https://elsewhere.example/x").await.unwrap();
            assert_eq!(
                driver.current_url().await.unwrap(),
                "https://elsewhere.example/x"
            );
        }
    }

    mod budget_tests {
        use super::*;

        #[tokio::test]
        async fn test_timeout_returns_within_budget() {
            let page = MockPage::new();
            let driver = driver_over(&page);

            let started = Instant::now();
            let err = driver
                .click_within(&Locator::id("missing"), 100)
                .await
                .unwrap_err();
            let elapsed = started.elapsed();

            assert!(err.is_timeout());
            assert!(elapsed >= Duration::from_millis(100));
            // T + poll interval, with generous scheduling slack
            assert!(
                elapsed < Duration::from_millis(500),
                "wait overran its budget: {elapsed:?}"
            );
        }

        #[tokio::test]
        async fn test_operations_on_closed_session_fail_fast() {
            let page = MockPage::new();
            page.add_element("submit", MockElement::button("submit"));
            let driver = driver_over(&page);
            driver.session().close().await.unwrap();

            let started = Instant::now();
            assert!(driver
                .click(&Locator::id("submit"))
                .await
                .unwrap_err()
                .is_session_closed());
            assert!(driver
                .find(&Locator::id("submit"))
                .await
                .unwrap_err()
                .is_session_closed());
            assert!(driver
                .is_visible(&Locator::id("submit"))
                .await
                .unwrap_err()
                .is_session_closed());
            assert!(driver.goto("/x").await.unwrap_err().is_session_closed());
            // Rejection is at the boundary, not after a full wait
            assert!(started.elapsed() < Duration::from_millis(100));
        }
    }
}
