//! Row selection by index or by text criteria.

use std::fmt;
use std::ops::RangeInclusive;

use crate::element::ElementRef;
use crate::error::{Result, TableError};

/// Identifies one row of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSelector {
    /// 1-based row position.
    Index(usize),
    /// Every keyword must appear in the row's text (case-sensitive).
    Criteria(Vec<String>),
}

impl RowSelector {
    /// Selects the first row whose text contains every keyword.
    pub fn containing<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RowSelector::Criteria(keywords.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for RowSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowSelector::Index(i) => write!(f, "row {}", i),
            RowSelector::Criteria(keywords) => write!(f, "row containing {:?}", keywords),
        }
    }
}

impl From<usize> for RowSelector {
    fn from(index: usize) -> Self {
        RowSelector::Index(index)
    }
}

impl From<&str> for RowSelector {
    fn from(keyword: &str) -> Self {
        RowSelector::Criteria(vec![keyword.to_string()])
    }
}

impl From<Vec<String>> for RowSelector {
    fn from(keywords: Vec<String>) -> Self {
        RowSelector::Criteria(keywords)
    }
}

impl From<Vec<&str>> for RowSelector {
    fn from(keywords: Vec<&str>) -> Self {
        RowSelector::containing(keywords)
    }
}

impl From<&[&str]> for RowSelector {
    fn from(keywords: &[&str]) -> Self {
        RowSelector::containing(keywords.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for RowSelector {
    fn from(keywords: [&str; N]) -> Self {
        RowSelector::containing(keywords)
    }
}

/// Returns the 0-based position of the row `selector` names within `rows`.
pub fn find_row_position(rows: &[ElementRef], selector: &RowSelector) -> Result<usize> {
    match selector {
        RowSelector::Index(index) => {
            if *index < 1 || *index > rows.len() {
                return Err(TableError::IndexRange(format!(
                    "Row index {} is out of range; valid range is [1, {}]",
                    index,
                    rows.len()
                )));
            }
            Ok(index - 1)
        }
        RowSelector::Criteria(keywords) => rows
            .iter()
            .position(|row| {
                let text = row.text();
                keywords.iter().all(|k| text.contains(k.as_str()))
            })
            .ok_or_else(|| {
                TableError::not_found(format!(
                    "No row found containing all criteria: {:?}",
                    keywords
                ))
            }),
    }
}

/// Returns the row `selector` names within `rows`.
pub fn find_row(rows: &[ElementRef], selector: &RowSelector) -> Result<ElementRef> {
    find_row_position(rows, selector).map(|pos| rows[pos].clone())
}

/// Clamps the 1-based inclusive range `[start, end]` to `available` rows.
///
/// Returns 0-based positions, or `None` when nothing overlaps: `start > end`
/// or the range lies entirely outside the table.
pub fn resolve_range(start: usize, end: usize, available: usize) -> Option<RangeInclusive<usize>> {
    if start > end || available == 0 || end < 1 || start > available {
        return None;
    }
    let first = start.max(1);
    let last = end.min(available);
    Some(first - 1..=last - 1)
}
