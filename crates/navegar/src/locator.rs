//! Locator abstraction for element selection.
//!
//! A [`Locator`] is an opaque, immutable description of *how to find*
//! an element: a strategy plus a selector value. Locators carry no
//! behavior and are not tied to a session; the same locator can be
//! replayed against any number of sessions. Page objects produce them;
//! the interaction layer consumes them.

use serde::{Deserialize, Serialize};

/// Strategy for locating an element in the DOM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Match by the `id` attribute
    Id,
    /// Raw CSS selector
    CssSelector,
    /// Anchor element whose visible text equals the value
    LinkText,
    /// Match by a single class name
    ClassName,
    /// Match by the `name` attribute
    Name,
    /// XPath expression
    XPath,
    /// Match by the `data-testid` attribute
    TestId,
}

impl Strategy {
    /// Short name used in `Display` output and error messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::CssSelector => "css",
            Self::LinkText => "link text",
            Self::ClassName => "class name",
            Self::Name => "name",
            Self::XPath => "xpath",
            Self::TestId => "test id",
        }
    }
}

/// An immutable strategy + value pair identifying how to find a UI
/// element. Equality is by value; two locators built from the same
/// strategy and selector compare equal regardless of where they were
/// constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    strategy: Strategy,
    value: String,
}

impl Locator {
    /// Create a locator with an explicit strategy
    #[must_use]
    pub fn new(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// Locate by `id` attribute
    #[must_use]
    pub fn id(value: impl Into<String>) -> Self {
        Self::new(Strategy::Id, value)
    }

    /// Locate by raw CSS selector
    #[must_use]
    pub fn css(value: impl Into<String>) -> Self {
        Self::new(Strategy::CssSelector, value)
    }

    /// Locate an anchor by its exact visible text
    #[must_use]
    pub fn link_text(value: impl Into<String>) -> Self {
        Self::new(Strategy::LinkText, value)
    }

    /// Locate by a single class name
    #[must_use]
    pub fn class_name(value: impl Into<String>) -> Self {
        Self::new(Strategy::ClassName, value)
    }

    /// Locate by `name` attribute
    #[must_use]
    pub fn name(value: impl Into<String>) -> Self {
        Self::new(Strategy::Name, value)
    }

    /// Locate by XPath expression
    #[must_use]
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, value)
    }

    /// Locate by `data-testid` attribute
    #[must_use]
    pub fn test_id(value: impl Into<String>) -> Self {
        Self::new(Strategy::TestId, value)
    }

    /// Get the strategy
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Get the selector value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Render as a CSS selector where the strategy allows it.
    ///
    /// `LinkText` and `XPath` have no CSS equivalent and return `None`;
    /// backends resolve those through a query expression instead.
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self.strategy {
            Strategy::Id => Some(format!("#{}", css_escape(&self.value))),
            Strategy::CssSelector => Some(self.value.clone()),
            Strategy::ClassName => Some(format!(".{}", css_escape(&self.value))),
            Strategy::Name => Some(format!("[name={:?}]", self.value)),
            Strategy::TestId => Some(format!("[data-testid={:?}]", self.value)),
            Strategy::LinkText | Strategy::XPath => None,
        }
    }

    /// Render a JavaScript expression evaluating to the array of
    /// matching elements, in document order.
    #[must_use]
    pub fn to_query_all(&self) -> String {
        match self.strategy {
            Strategy::LinkText => format!(
                "Array.from(document.querySelectorAll('a')).filter(el => el.textContent.trim() === {:?})",
                self.value
            ),
            Strategy::XPath => format!(
                "(() => {{ const r = document.evaluate({:?}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); const out = []; for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i)); return out; }})()",
                self.value
            ),
            _ => format!(
                "Array.from(document.querySelectorAll({:?}))",
                self.to_css().unwrap_or_default()
            ),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}={:?}]", self.strategy.as_str(), self.value)
    }
}

/// Minimal escaping for identifiers embedded in `#id` / `.class`
/// selectors. Covers the characters that legally appear in HTML ids
/// but would terminate or alter a CSS selector.
fn css_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => out.push(ch),
            _ => {
                out.push('\\');
                out.push(ch);
            }
        }
    }
    out
}
