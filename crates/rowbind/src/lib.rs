//! Rowbind - declarative data binding between on-screen tables and Rust rows.
//!
//! A row type declares, once, where its table lives and which cell each of
//! its fields is bound to. The [`TableEngine`] then turns table rows into
//! typed row objects and row objects back into cell writes:
//!
//! - Read whole tables, row ranges, or one row chosen by index or by text
//! - Write a row object into a row, field by field, in a declared order
//! - Filter and sort through a column's header cell
//! - Route writes and filters to per-component services or custom functions
//!
//! The engine never talks to a browser itself. Pages are reached through the
//! [`Element`] trait, implemented by whatever driver the tests use.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rowbind::{TableCell, TableEngine, TableRow};
//!
//! #[derive(TableRow, Default, Clone)]
//! #[table(container = "id=users", rows = "tbody tr", header_row = "thead tr")]
//! struct User {
//!     #[cell(locator = "td.name", header = "th.name")]
//!     name: Option<TableCell>,
//!     #[cell(locator = "td.email")]
//!     #[insert(component = "input", key = "text")]
//!     email: Option<TableCell>,
//! }
//!
//! let engine = TableEngine::new(page_root);
//! let users: Vec<User> = engine.read_table(&[])?;
//! let bob: User = engine.read_row(["Bob"], &[User::NAME])?;
//! ```
//!
//! # Row Selection
//!
//! Rows are addressed by [`RowSelector`]: a 1-based index, or a list of
//! keywords that must all appear (case-sensitively) in the row's text. The
//! first matching row wins.
//!
//! # Sections
//!
//! A table may be split into independently-rowed sections (a body and a
//! footer, say). Fields name their section; rows are aligned by position
//! across sections and merged into one row object.

mod cell;
mod element;
mod engine;
mod error;
mod filter;
mod instance;
mod locate;
mod read;
mod registry;
mod schema;
mod strategy;
mod write;

pub use cell::{CellSlot, CellValue, TableCell};
pub use element::{Element, ElementRef, Locator};
pub use engine::{TableEngine, TableEngineBuilder};
pub use error::{Result, TableError};
pub use instance::{create_instance, merge_objects};
pub use locate::{find_row, find_row_position, resolve_range, RowSelector};
pub use read::{populate, populate_into, read_value};
pub use registry::ServiceRegistry;
pub use schema::{
    extract_fields, group_by_section, CellDescriptor, FieldBinding, SchemaCache,
    SectionDescriptor, TableDescriptor, TableField, TableRow, TableSchema,
    TableSchemaBuilder, DEFAULT_SECTION,
};
pub use strategy::{
    CellRoute, ComponentFilter, ComponentInsertion, ComponentType, CustomFilter,
    CustomInsertion, FilterRoute, FilterStrategy, HeaderSorter, InsertionRoute, SortingStrategy,
};
pub use write::{insertion_plan, InsertionStep};

#[cfg(feature = "macros")]
pub use rowbind_macros::TableRow;
