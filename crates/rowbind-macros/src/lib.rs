//! Proc macros for rowbind.
//!
//! This crate provides [`TableRow`], the derive that binds a struct's fields
//! to the cells of an on-screen table. It is re-exported by `rowbind` behind
//! the default `macros` feature; depend on `rowbind` rather than on this
//! crate directly.

mod table_row;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `TableRow` for a struct whose fields are bound to table cells.
///
/// # Container Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `container = "..."` | The element enclosing the table (required) |
/// | `rows = "..."` | Data rows of the default section (required) |
/// | `header_row = "..."` | The header row (required) |
/// | `section(name = "...", rows = "...")` | An extra section with its own rows |
///
/// Locators are written as `css=`, `xpath=`, `id=`, `testid=` or `text=`
/// followed by the selector; a bare string is CSS.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `#[cell(locator = "...")]` | The cell within the row; omitted, the row itself |
/// | `#[cell(text = "...")]` | The element within the cell whose text is read |
/// | `#[cell(header = "...")]` | The header cell used by filter and sort |
/// | `#[cell(section = "...")]` | The section the field belongs to |
/// | `#[cell(direct_text)]` | Read only the element's own text nodes |
/// | `#[insert(component = "kind", key = "...", order = N)]` | Write through the registry |
/// | `#[insert(custom = path, order = N)]` | Write through a function |
/// | `#[filter(...)]` | Same shapes as `#[insert]`, for filtering |
///
/// Only fields with `#[cell]` are bound, and they must be
/// `Option<TableCell>` or `Option<Vec<TableCell>>`.
///
/// # Generated Code
///
/// 1. One `TableField` constant per bound field (e.g. `User::NAME`)
/// 2. An implementation of `TableRow::table_schema()`
///
/// The struct must also implement `Default` and `Clone`.
///
/// # Example
///
/// ```ignore
/// use rowbind::{TableCell, TableRow};
///
/// #[derive(TableRow, Default, Clone)]
/// #[table(container = "id=orders", rows = "tbody tr", header_row = "thead tr")]
/// #[table(section(name = "totals", rows = "tfoot tr"))]
/// struct Order {
///     #[cell(locator = "td.id", header = "th.id")]
///     #[filter(component = "text-filter")]
///     id: Option<TableCell>,
///
///     #[cell(locator = "td.qty")]
///     #[insert(component = "input", key = "number", order = 1)]
///     quantity: Option<TableCell>,
///
///     #[cell(locator = "li")]
///     items: Option<Vec<TableCell>>,
///
///     #[cell(locator = "td.total", section = "totals")]
///     total: Option<TableCell>,
/// }
/// ```
#[proc_macro_derive(TableRow, attributes(table, cell, insert, filter))]
pub fn table_row_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    table_row::table_row_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
