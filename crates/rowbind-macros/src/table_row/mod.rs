//! Implementation of the `#[derive(TableRow)]` macro.
//!
//! This module turns struct annotations into a static schema registration
//! for the rowbind table engine.

mod attrs;
mod derive;

pub use derive::table_row_derive_impl;
