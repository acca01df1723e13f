//! An in-memory element tree implementing [`Element`].
//!
//! Supports the selector subset tables need: CSS compound selectors
//! (`tag`, `.class`, `#id`, `[attr]`, `[attr=value]`) joined by descendant
//! combinators, plus the id, test-id and text locator strategies. XPath
//! matches nothing.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use rowbind::{Element, ElementRef, Locator};

/// One node of a mock page.
#[derive(Debug, Default)]
pub struct MockElement {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: String,
    children: Vec<Arc<MockElement>>,
    waits: Mutex<Vec<Locator>>,
}

impl MockElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Sets the element's own text, excluding its children.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn child(mut self, child: MockElement) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    /// Adds a child the caller keeps a handle to, e.g. to inspect its waits.
    pub fn shared_child(mut self, child: Arc<MockElement>) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = MockElement>) -> Self {
        self.children.extend(children.into_iter().map(Arc::new));
        self
    }

    pub fn into_ref(self) -> ElementRef {
        Arc::new(self)
    }

    /// Locators `wait_until_present` was called with, oldest first.
    pub fn waited_for(&self) -> Vec<Locator> {
        self.waits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn descendants(&self, out: &mut Vec<Arc<MockElement>>) {
        for child in &self.children {
            out.push(Arc::clone(child));
            child.descendants(out);
        }
    }

    fn matching(&self, locator: &Locator) -> Vec<Arc<MockElement>> {
        let mut all = Vec::new();
        self.descendants(&mut all);
        match locator {
            Locator::Css(selector) => self.select_css(selector),
            Locator::Id(id) => all
                .into_iter()
                .filter(|e| e.id.as_deref() == Some(id.as_str()))
                .collect(),
            Locator::TestId(id) => all
                .into_iter()
                .filter(|e| e.attributes.get("data-testid") == Some(id))
                .collect(),
            Locator::Text(text) => all
                .into_iter()
                .filter(|e| e.rendered_text().contains(text.as_str()))
                .collect(),
            Locator::XPath(_) => Vec::new(),
        }
    }

    fn select_css(&self, selector: &str) -> Vec<Arc<MockElement>> {
        let steps: Vec<Compound> = selector
            .split_whitespace()
            .filter(|s| *s != ">")
            .map(Compound::parse)
            .collect();
        let Some((first, rest)) = steps.split_first() else {
            return Vec::new();
        };

        let mut all = Vec::new();
        self.descendants(&mut all);
        let mut current: Vec<Arc<MockElement>> =
            all.into_iter().filter(|e| first.matches(e)).collect();

        for step in rest {
            let mut next: Vec<Arc<MockElement>> = Vec::new();
            for scope in &current {
                let mut below = Vec::new();
                scope.descendants(&mut below);
                for element in below {
                    if step.matches(&element) && !next.iter().any(|n| Arc::ptr_eq(n, &element)) {
                        next.push(element);
                    }
                }
            }
            current = next;
        }
        current
    }

    fn rendered_text(&self) -> String {
        let mut parts = Vec::new();
        if !self.text.trim().is_empty() {
            parts.push(self.text.trim().to_string());
        }
        for child in &self.children {
            let text = child.rendered_text();
            if !text.is_empty() {
                parts.push(text);
            }
        }
        parts.join(" ")
    }
}

impl Element for MockElement {
    fn find(&self, locator: &Locator) -> Option<ElementRef> {
        self.matching(locator)
            .into_iter()
            .next()
            .map(|e| e as ElementRef)
    }

    fn find_all(&self, locator: &Locator) -> Vec<ElementRef> {
        self.matching(locator)
            .into_iter()
            .map(|e| e as ElementRef)
            .collect()
    }

    fn text(&self) -> String {
        self.rendered_text()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "class" if !self.classes.is_empty() => Some(self.classes.join(" ")),
            _ => self.attributes.get(name).cloned(),
        }
    }

    fn own_text(&self) -> String {
        self.text.trim().to_string()
    }

    fn wait_until_present(&self, locator: &Locator) {
        self.waits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(locator.clone());
    }
}

/// One compound CSS selector, e.g. `td.name[data-col=1]`.
#[derive(Debug, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Compound {
    fn parse(selector: &str) -> Self {
        const MARKERS: [char; 3] = ['.', '#', '['];
        let mut compound = Compound::default();

        let end = selector.find(MARKERS).unwrap_or(selector.len());
        let tag = &selector[..end];
        if !tag.is_empty() && tag != "*" {
            compound.tag = Some(tag.to_string());
        }

        let mut rest = &selector[end..];
        while let Some(marker) = rest.chars().next() {
            if marker == '[' {
                let close = rest.find(']').unwrap_or(rest.len());
                let inner = &rest[1..close];
                let attribute = match inner.split_once('=') {
                    Some((name, value)) => (
                        name.trim().to_string(),
                        Some(value.trim().trim_matches(['"', '\'']).to_string()),
                    ),
                    None => (inner.trim().to_string(), None),
                };
                compound.attributes.push(attribute);
                rest = rest.get(close + 1..).unwrap_or("");
            } else {
                let body = &rest[1..];
                let end = body.find(MARKERS).unwrap_or(body.len());
                let name = body[..end].to_string();
                if marker == '.' {
                    compound.classes.push(name);
                } else {
                    compound.id = Some(name);
                }
                rest = &body[end..];
            }
        }
        compound
    }

    fn matches(&self, element: &MockElement) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if self.id.is_some() && element.id != self.id {
            return false;
        }
        if !self.classes.iter().all(|c| element.classes.contains(c)) {
            return false;
        }
        self.attributes.iter().all(|(name, expected)| {
            let actual = element.attribute(name);
            match expected {
                Some(value) => actual.as_deref() == Some(value.as_str()),
                None => actual.is_some(),
            }
        })
    }
}

/// Builds a `table#<id>` with one header row and one body row per entry.
///
/// Every header cell is a `th` and every body cell a `td`, each classed with
/// its column name, so `th.<column>` and `td.<column>` address them.
pub fn text_table(id: &str, columns: &[&str], rows: &[&[&str]]) -> MockElement {
    let header = MockElement::new("tr").children(
        columns
            .iter()
            .map(|c| MockElement::new("th").class(*c).text(*c)),
    );
    let body = MockElement::new("tbody").children(rows.iter().map(|row| {
        MockElement::new("tr").children(
            columns
                .iter()
                .zip(row.iter())
                .map(|(column, value)| MockElement::new("td").class(*column).text(*value)),
        )
    }));
    MockElement::new("table")
        .id(id)
        .child(MockElement::new("thead").child(header))
        .child(body)
}
