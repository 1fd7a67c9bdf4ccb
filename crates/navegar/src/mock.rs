//! Scriptable in-memory page for harness testing.
//!
//! [`MockPage`] implements [`DomBackend`] over a plain element table,
//! so the interaction layer's polling, retry, and failure-policy
//! behavior can be exercised without a browser. Tests script the page
//! the way the application under test would behave: elements can be
//! revealed after a delay (asynchronous rendering), detached mid-flight
//! (stale references), and wired with [`ClickEffect`]s that mutate the
//! page when a button is clicked (form validation banners, navigation).
//!
//! CSS matching is deliberately minimal: `#id`, `.class`, and bare tag
//! selectors are parsed; anything else matches only elements registered
//! with the same selector string via [`MockElement::with_css`].

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::backend::{DomBackend, ElementState};
use crate::locator::{Locator, Strategy};
use crate::result::{NavegarError, NavegarResult};

/// Effect applied to the page when a scripted element is clicked
#[derive(Debug, Clone)]
pub enum ClickEffect {
    /// Make the target element displayed
    Show(String),
    /// Make the target element hidden
    Hide(String),
    /// Replace the target element's text
    SetText {
        /// Element key
        target: String,
        /// New text
        text: String,
    },
    /// Replace the target element's form value
    SetValue {
        /// Element key
        target: String,
        /// New value
        value: String,
    },
    /// Detach the target element from the document
    Detach(String),
    /// Change the current URL
    Navigate(String),
    /// Append a console log line
    PushConsole(String),
}

/// One scripted element
#[derive(Debug, Clone)]
pub struct MockElement {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    name: Option<String>,
    test_id: Option<String>,
    css_matches: Vec<String>,
    text: String,
    value: String,
    displayed: bool,
    enabled: bool,
    obscured: bool,
    attached: bool,
    reveal_delay: Option<Duration>,
}

impl MockElement {
    /// Create an element with the given tag, visible and enabled
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            name: None,
            test_id: None,
            css_matches: Vec::new(),
            text: String::new(),
            value: String::new(),
            displayed: true,
            enabled: true,
            obscured: false,
            attached: true,
            reveal_delay: None,
        }
    }

    /// Shorthand for an `<input>` with an id
    #[must_use]
    pub fn input(id: impl Into<String>) -> Self {
        Self::new("input").with_id(id)
    }

    /// Shorthand for a `<button>` with an id
    #[must_use]
    pub fn button(id: impl Into<String>) -> Self {
        Self::new("button").with_id(id)
    }

    /// Shorthand for an `<a>` with visible text
    #[must_use]
    pub fn link(text: impl Into<String>) -> Self {
        Self::new("a").with_text(text)
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a class
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set the `name` attribute
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the `data-testid` attribute
    #[must_use]
    pub fn with_test_id(mut self, test_id: impl Into<String>) -> Self {
        self.test_id = Some(test_id.into());
        self
    }

    /// Register an extra selector string this element answers to
    #[must_use]
    pub fn with_css(mut self, selector: impl Into<String>) -> Self {
        self.css_matches.push(selector.into());
        self
    }

    /// Set visible text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the form value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Start hidden
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Start disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Start covered by another node
    #[must_use]
    pub fn obscured(mut self) -> Self {
        self.obscured = true;
        self
    }

    /// Start detached from the document
    #[must_use]
    pub fn detached(mut self) -> Self {
        self.attached = false;
        self
    }

    /// Become displayed only after `delay` has elapsed from the moment
    /// the element is added to a page. The mock's stand-in for
    /// asynchronous rendering
    #[must_use]
    pub fn visible_after(mut self, delay: Duration) -> Self {
        self.displayed = true;
        self.reveal_delay = Some(delay);
        self
    }

    fn matches(&self, locator: &Locator) -> bool {
        let value = locator.value();
        match locator.strategy() {
            Strategy::Id => self.id.as_deref() == Some(value),
            Strategy::ClassName => self.classes.iter().any(|c| c == value),
            Strategy::Name => self.name.as_deref() == Some(value),
            Strategy::TestId => self.test_id.as_deref() == Some(value),
            Strategy::LinkText => self.tag == "a" && self.text.trim() == value,
            Strategy::XPath => self.css_matches.iter().any(|c| c == value),
            Strategy::CssSelector => self.matches_css(value),
        }
    }

    fn matches_css(&self, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            self.id.as_deref() == Some(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            self.classes.iter().any(|c| c == class)
        } else if selector.chars().all(char::is_alphanumeric) {
            self.tag == selector
        } else {
            self.css_matches.iter().any(|c| c == selector)
        }
    }
}

#[derive(Debug)]
struct Entry {
    key: String,
    element: MockElement,
    visible_from: Option<Instant>,
}

impl Entry {
    fn displayed_now(&self) -> bool {
        if !self.element.displayed {
            return false;
        }
        match self.visible_from {
            Some(at) => Instant::now() >= at,
            None => true,
        }
    }

    fn state(&self) -> ElementState {
        ElementState {
            displayed: self.displayed_now(),
            enabled: self.element.enabled,
            obscured: self.element.obscured,
            text: self.element.text.clone(),
            value: Some(self.element.value.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct PageState {
    url: String,
    entries: Vec<Entry>,
    effects: HashMap<String, Vec<ClickEffect>>,
    stale_next: HashSet<String>,
    console: Vec<String>,
    screenshot_png: Vec<u8>,
    fail_screenshots: bool,
    closed: bool,
}

impl PageState {
    fn matching_keys(&self, locator: &Locator) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.element.attached && e.element.matches(locator))
            .map(|e| e.key.clone())
            .collect()
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.key == key)
    }

    fn apply(&mut self, effect: &ClickEffect) {
        match effect {
            ClickEffect::Show(key) => {
                if let Some(entry) = self.entry_mut(key) {
                    entry.element.displayed = true;
                    entry.visible_from = None;
                }
            }
            ClickEffect::Hide(key) => {
                if let Some(entry) = self.entry_mut(key) {
                    entry.element.displayed = false;
                }
            }
            ClickEffect::SetText { target, text } => {
                if let Some(entry) = self.entry_mut(target) {
                    entry.element.text.clone_from(text);
                }
            }
            ClickEffect::SetValue { target, value } => {
                if let Some(entry) = self.entry_mut(target) {
                    entry.element.value.clone_from(value);
                }
            }
            ClickEffect::Detach(key) => {
                if let Some(entry) = self.entry_mut(key) {
                    entry.element.attached = false;
                }
            }
            ClickEffect::Navigate(url) => {
                self.url.clone_from(url);
            }
            ClickEffect::PushConsole(line) => {
                self.console.push(line.clone());
            }
        }
    }
}

/// A scriptable in-memory page implementing [`DomBackend`]
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    state: Arc<Mutex<PageState>>,
}

impl MockPage {
    /// Create an empty page at `about:blank`
    #[must_use]
    pub fn new() -> Self {
        let page = Self::default();
        page.lock().url = "about:blank".to_string();
        page
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Add an element under a test-visible key, returning the page for
    /// chaining
    pub fn add_element(&self, key: impl Into<String>, element: MockElement) -> &Self {
        let key = key.into();
        let visible_from = element.reveal_delay.map(|d| Instant::now() + d);
        self.lock().entries.push(Entry {
            key,
            element,
            visible_from,
        });
        self
    }

    /// Script click effects for an element key
    pub fn on_click(&self, key: impl Into<String>, effects: Vec<ClickEffect>) -> &Self {
        self.lock().effects.insert(key.into(), effects);
        self
    }

    /// Make the next action on this element fail once with a stale
    /// reference, as if the node was replaced between resolution and
    /// dispatch
    pub fn stale_next_action(&self, key: impl Into<String>) {
        self.lock().stale_next.insert(key.into());
    }

    /// Set the current URL directly
    pub fn set_url(&self, url: impl Into<String>) {
        self.lock().url = url.into();
    }

    /// Make the element displayed
    pub fn show(&self, key: &str) {
        self.lock().apply(&ClickEffect::Show(key.to_string()));
    }

    /// Make the element hidden
    pub fn hide(&self, key: &str) {
        self.lock().apply(&ClickEffect::Hide(key.to_string()));
    }

    /// Detach the element from the document
    pub fn detach(&self, key: &str) {
        self.lock().apply(&ClickEffect::Detach(key.to_string()));
    }

    /// Replace the element's text
    pub fn set_text(&self, key: &str, text: impl Into<String>) {
        self.lock().apply(&ClickEffect::SetText {
            target: key.to_string(),
            text: text.into(),
        });
    }

    /// Current form value of an element, by key
    #[must_use]
    pub fn value_of(&self, key: &str) -> Option<String> {
        self.lock()
            .entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.element.value.clone())
    }

    /// Append a console log line
    pub fn push_console(&self, line: impl Into<String>) {
        self.lock().console.push(line.into());
    }

    /// Use canned bytes for subsequent screenshots
    pub fn set_screenshot(&self, png: Vec<u8>) {
        self.lock().screenshot_png = png;
    }

    /// Make subsequent screenshot calls fail
    pub fn fail_screenshots(&self) {
        self.lock().fail_screenshots = true;
    }

    fn resolve(&self, locator: &Locator, index: usize) -> NavegarResult<String> {
        let mut state = self.lock();
        if state.closed {
            return Err(NavegarError::backend("mock page is closed"));
        }
        let keys = state.matching_keys(locator);
        let key = keys.get(index).ok_or(NavegarError::Stale)?.clone();
        if state.stale_next.remove(&key) {
            return Err(NavegarError::Stale);
        }
        Ok(key)
    }
}

#[async_trait]
impl DomBackend for MockPage {
    async fn goto(&self, url: &str) -> NavegarResult<()> {
        let mut state = self.lock();
        if state.closed {
            return Err(NavegarError::backend("mock page is closed"));
        }
        state.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> NavegarResult<String> {
        Ok(self.lock().url.clone())
    }

    async fn query(&self, locator: &Locator) -> NavegarResult<Vec<ElementState>> {
        let state = self.lock();
        if state.closed {
            return Err(NavegarError::backend("mock page is closed"));
        }
        Ok(state
            .entries
            .iter()
            .filter(|e| e.element.attached && e.element.matches(locator))
            .map(Entry::state)
            .collect())
    }

    async fn click(&self, locator: &Locator, index: usize) -> NavegarResult<()> {
        let key = self.resolve(locator, index)?;
        let mut state = self.lock();
        if let Some(effects) = state.effects.get(&key).cloned() {
            for effect in &effects {
                state.apply(effect);
            }
        }
        Ok(())
    }

    async fn clear(&self, locator: &Locator, index: usize) -> NavegarResult<()> {
        let key = self.resolve(locator, index)?;
        if let Some(entry) = self.lock().entry_mut(&key) {
            entry.element.value.clear();
        }
        Ok(())
    }

    async fn type_text(&self, locator: &Locator, index: usize, text: &str) -> NavegarResult<()> {
        let key = self.resolve(locator, index)?;
        if let Some(entry) = self.lock().entry_mut(&key) {
            // Keystroke semantics: append to whatever is already there.
            // Replace-on-entry is the driver's contract, not the DOM's.
            entry.element.value.push_str(text);
        }
        Ok(())
    }

    async fn screenshot(&self) -> NavegarResult<Vec<u8>> {
        let state = self.lock();
        if state.fail_screenshots {
            return Err(NavegarError::Screenshot {
                message: "scripted screenshot failure".to_string(),
            });
        }
        Ok(state.screenshot_png.clone())
    }

    async fn console_logs(&self) -> NavegarResult<Vec<String>> {
        Ok(self.lock().console.clone())
    }

    async fn close(&self) -> NavegarResult<()> {
        self.lock().closed = true;
        Ok(())
    }
}
