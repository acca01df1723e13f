//! Cell values and the row-field slots that hold them.

use std::fmt;

use crate::element::ElementRef;
use crate::error::{Result, TableError};

/// The value of one table cell: its text and, when read from the page, the
/// element it came from.
///
/// Cells built by hand for insertion carry text only.
#[derive(Clone)]
pub struct TableCell {
    element: Option<ElementRef>,
    text: String,
}

impl TableCell {
    /// Creates a cell bound to the element its text was read from.
    pub fn new(element: ElementRef, text: impl Into<String>) -> Self {
        Self {
            element: Some(element),
            text: text.into(),
        }
    }

    /// Creates a detached cell holding only text, typically as insertion input.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            element: None,
            text: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The element the text was read from, if any.
    pub fn element(&self) -> Option<&ElementRef> {
        self.element.as_ref()
    }
}

impl fmt::Debug for TableCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableCell")
            .field("text", &self.text)
            .field("bound", &self.element.is_some())
            .finish()
    }
}

// Cells compare by text; element identity is not observable.
impl PartialEq for TableCell {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for TableCell {}

impl From<&str> for TableCell {
    fn from(text: &str) -> Self {
        TableCell::from_text(text)
    }
}

impl From<String> for TableCell {
    fn from(text: String) -> Self {
        TableCell::from_text(text)
    }
}

impl fmt::Display for TableCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A value moving in or out of a row field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// A field bound to one cell.
    Single(TableCell),
    /// A field bound to every matching cell of the row.
    List(Vec<TableCell>),
}

impl CellValue {
    /// Returns the shape name, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Single(_) => "single cell",
            CellValue::List(_) => "cell list",
        }
    }

    /// Flattens this value to the strings handed to insertion and filter logic.
    pub fn to_strings(&self) -> Vec<String> {
        match self {
            CellValue::Single(cell) => vec![cell.text.clone()],
            CellValue::List(cells) => cells.iter().map(|c| c.text.clone()).collect(),
        }
    }
}

impl From<TableCell> for CellValue {
    fn from(cell: TableCell) -> Self {
        CellValue::Single(cell)
    }
}

impl From<Vec<TableCell>> for CellValue {
    fn from(cells: Vec<TableCell>) -> Self {
        CellValue::List(cells)
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        CellValue::Single(TableCell::from_text(text))
    }
}

impl From<Vec<&str>> for CellValue {
    fn from(texts: Vec<&str>) -> Self {
        CellValue::List(texts.into_iter().map(TableCell::from_text).collect())
    }
}

/// A row-struct field type that can hold cell values.
///
/// Implemented for `Option<TableCell>` and `Option<Vec<TableCell>>`; these
/// are the only field types a row may bind to a cell. `None` marks a field
/// that has not been read or should not be written.
pub trait CellSlot {
    /// Whether this slot binds every matching cell rather than one.
    const COLLECTION: bool;

    /// Returns the current value, or `None` when the slot is empty.
    fn read_slot(&self) -> Option<CellValue>;

    /// Stores `value`, rejecting a value of the wrong shape.
    fn write_slot(&mut self, field: &str, value: CellValue) -> Result<()>;
}

impl CellSlot for Option<TableCell> {
    const COLLECTION: bool = false;

    fn read_slot(&self) -> Option<CellValue> {
        self.clone().map(CellValue::Single)
    }

    fn write_slot(&mut self, field: &str, value: CellValue) -> Result<()> {
        match value {
            CellValue::Single(cell) => {
                *self = Some(cell);
                Ok(())
            }
            other => Err(TableError::TypeMismatch {
                field: field.to_string(),
                expected: "single cell",
                actual: other.kind(),
            }),
        }
    }
}

impl CellSlot for Option<Vec<TableCell>> {
    const COLLECTION: bool = true;

    fn read_slot(&self) -> Option<CellValue> {
        self.clone().map(CellValue::List)
    }

    fn write_slot(&mut self, field: &str, value: CellValue) -> Result<()> {
        match value {
            CellValue::List(cells) => {
                *self = Some(cells);
                Ok(())
            }
            other => Err(TableError::TypeMismatch {
                field: field.to_string(),
                expected: "cell list",
                actual: other.kind(),
            }),
        }
    }
}
