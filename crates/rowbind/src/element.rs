//! The UI-element contract the engine drives.
//!
//! The engine never talks to a browser directly. Everything it needs from
//! the page goes through [`Element`], which a driver adapter (WebDriver,
//! Playwright, an in-memory tree in tests) implements. Handles are shared as
//! [`ElementRef`] so cells read from a table can outlive the read call.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A selector for one or more elements.
///
/// Locators are opaque to the engine: they are stored on descriptors and
/// handed back to [`Element::find`] / [`Element::find_all`] untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Locator {
    /// CSS selector (e.g. `"tbody tr"`).
    Css(String),
    /// XPath expression.
    #[serde(rename = "xpath")]
    XPath(String),
    /// Element id attribute.
    Id(String),
    /// `data-testid` attribute.
    #[serde(rename = "testid")]
    TestId(String),
    /// Elements whose visible text contains the value.
    Text(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Parse the `strategy=value` shorthand used in derive attributes.
    ///
    /// Recognized prefixes are `css=`, `xpath=`, `id=`, `testid=` and
    /// `text=`. A string without a known prefix is treated as CSS.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('=') {
            Some(("css", rest)) => Self::css(rest),
            Some(("xpath", rest)) => Self::xpath(rest),
            Some(("id", rest)) => Self::id(rest),
            Some(("testid", rest)) => Self::test_id(rest),
            Some(("text", rest)) => Self::text(rest),
            _ => Self::css(raw),
        }
    }

    /// Returns the strategy name of this locator.
    pub fn strategy(&self) -> &'static str {
        match self {
            Locator::Css(_) => "css",
            Locator::XPath(_) => "xpath",
            Locator::Id(_) => "id",
            Locator::TestId(_) => "testid",
            Locator::Text(_) => "text",
        }
    }

    /// Returns the raw selector value.
    pub fn value(&self) -> &str {
        match self {
            Locator::Css(v)
            | Locator::XPath(v)
            | Locator::Id(v)
            | Locator::TestId(v)
            | Locator::Text(v) => v,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy(), self.value())
    }
}

impl From<&str> for Locator {
    fn from(raw: &str) -> Self {
        Locator::parse(raw)
    }
}

/// A handle to one element on the page: a table, a row, a cell or a header.
///
/// All calls are blocking. Waiting and retry policy belongs to the
/// implementation; the engine calls each method exactly once per lookup.
pub trait Element: fmt::Debug + Send + Sync {
    /// Returns the first descendant matching `locator`, if any.
    fn find(&self, locator: &Locator) -> Option<ElementRef>;

    /// Returns every descendant matching `locator`, in document order.
    fn find_all(&self, locator: &Locator) -> Vec<ElementRef>;

    /// Returns the rendered text of this element and its descendants.
    fn text(&self) -> String;

    /// Returns the raw value of an attribute.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Returns only the text nodes directly owned by this element.
    ///
    /// Drivers that cannot separate own text from descendant text may keep
    /// the default, which returns [`Element::text`].
    fn own_text(&self) -> String {
        self.text()
    }

    /// Blocks until at least one descendant matches `locator`.
    ///
    /// Called before rows are enumerated. The default returns immediately.
    fn wait_until_present(&self, _locator: &Locator) {}
}

/// Shared handle to an [`Element`].
pub type ElementRef = Arc<dyn Element>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_prefixed_locators() {
        assert_eq!(Locator::parse("css=td.name"), Locator::css("td.name"));
        assert_eq!(Locator::parse("xpath=//tr[1]"), Locator::xpath("//tr[1]"));
        assert_eq!(Locator::parse("id=users"), Locator::id("users"));
        assert_eq!(Locator::parse("testid=row"), Locator::test_id("row"));
        assert_eq!(Locator::parse("text=Total"), Locator::text("Total"));
    }

    #[test]
    fn parse_bare_string_is_css() {
        assert_eq!(Locator::parse("tbody tr"), Locator::css("tbody tr"));
        // '=' inside an attribute selector must not be taken as a prefix
        assert_eq!(
            Locator::parse("input[type=text]"),
            Locator::css("input[type=text]")
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        let loc = Locator::xpath("//td[2]");
        assert_eq!(Locator::parse(&loc.to_string()), loc);
    }

    #[test]
    fn locator_serde_shape() {
        let json = serde_json::to_string(&Locator::css("tr")).unwrap();
        assert_eq!(json, r#"{"by":"css","value":"tr"}"#);
        let back: Locator = serde_json::from_str(r#"{"by":"testid","value":"row"}"#).unwrap();
        assert_eq!(back, Locator::test_id("row"));
    }
}
