//! The table engine and its builder.
//!
//! [`TableEngine`] ties the pieces together: it resolves a row type's schema,
//! finds the table under a root element, and hands off to the reader, writer,
//! filter and sort paths. Those live in their own modules as further `impl`
//! blocks on the engine.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::element::{ElementRef, Locator};
use crate::error::{Result, TableError};
use crate::registry::ServiceRegistry;
use crate::schema::{
    CellDescriptor, FieldBinding, SchemaCache, TableDescriptor, TableRow, TableSchema,
};
use crate::strategy::HeaderSorter;

/// Reads, writes, filters and sorts tables bound to [`TableRow`] types.
///
/// The engine is stateless across calls unless schema caching is enabled,
/// and may be shared between threads once built.
pub struct TableEngine {
    root: ElementRef,
    registry: Option<Arc<ServiceRegistry>>,
    sorter: Option<Arc<dyn HeaderSorter>>,
    cache: Option<SchemaCache>,
}

impl TableEngine {
    /// Creates an engine over `root` with no registry, sorter or cache.
    pub fn new(root: ElementRef) -> Self {
        Self::builder(root).build()
    }

    pub fn builder(root: ElementRef) -> TableEngineBuilder {
        TableEngineBuilder {
            root,
            registry: None,
            sorter: None,
            cache_schemas: false,
        }
    }

    pub fn root(&self) -> &ElementRef {
        &self.root
    }

    pub fn registry(&self) -> Option<&ServiceRegistry> {
        self.registry.as_deref()
    }

    pub(crate) fn sorter(&self) -> Option<&Arc<dyn HeaderSorter>> {
        self.sorter.as_ref()
    }

    /// Returns the schema of `R`, from the cache when enabled.
    pub fn schema<R: TableRow>(&self) -> Result<Arc<TableSchema<R>>> {
        match &self.cache {
            Some(cache) => cache.get_or_build::<R>(),
            None => R::table_schema().map(Arc::new),
        }
    }

    /// Finds the table container under the root element.
    pub(crate) fn container(&self, table: &TableDescriptor) -> Result<ElementRef> {
        self.root.find(&table.container).ok_or_else(|| {
            TableError::not_found(format!("Table container not found: {}", table.container))
        })
    }

    /// Returns the rows of `section`, waiting for them to be present first.
    pub(crate) fn section_rows(
        &self,
        container: &ElementRef,
        table: &TableDescriptor,
        section: &str,
    ) -> Result<Vec<ElementRef>> {
        let locator = table.rows_for(section).ok_or_else(|| {
            TableError::configuration(format!("table declares no section '{}'", section))
        })?;
        container.wait_until_present(locator);
        let rows = container.find_all(locator);
        debug!("Found {} rows in section '{}' ({})", rows.len(), section, locator);
        Ok(rows)
    }

    /// Resolves the header cell a field filters and sorts through.
    pub(crate) fn header_cell<R>(
        &self,
        table: &TableDescriptor,
        binding: &FieldBinding<R>,
    ) -> Result<ElementRef> {
        let locator = binding.descriptor().header_cell.as_ref().ok_or_else(|| {
            TableError::configuration(format!(
                "field '{}' has no header cell locator",
                binding.name()
            ))
        })?;
        let container = self.container(table)?;
        container.wait_until_present(&table.header_row);
        let header_row = container.find(&table.header_row).ok_or_else(|| {
            TableError::not_found(format!("Header row not found: {}", table.header_row))
        })?;
        header_row.find(locator).ok_or_else(|| {
            TableError::not_found(format!(
                "Header cell for field '{}' not found: {}",
                binding.name(),
                locator
            ))
        })
    }
}

/// Returns every cell `descriptor` binds within `row`.
///
/// Without a cell locator the row itself is the cell.
pub(crate) fn locate_cells(row: &ElementRef, descriptor: &CellDescriptor) -> Vec<ElementRef> {
    match &descriptor.cell {
        Some(locator) => row.find_all(locator),
        None => vec![row.clone()],
    }
}

/// Returns the first cell `descriptor` binds within `row`.
pub(crate) fn locate_cell(row: &ElementRef, descriptor: &CellDescriptor) -> Option<ElementRef> {
    match &descriptor.cell {
        Some(locator) => row.find(locator),
        None => Some(row.clone()),
    }
}

pub(crate) fn describe(locator: Option<&Locator>) -> String {
    locator.map_or_else(|| "<row>".to_string(), Locator::to_string)
}

impl fmt::Debug for TableEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableEngine")
            .field("root", &self.root)
            .field("registry", &self.registry)
            .field("sorter", &self.sorter.is_some())
            .field("cache", &self.cache)
            .finish()
    }
}

/// Builder for [`TableEngine`].
pub struct TableEngineBuilder {
    root: ElementRef,
    registry: Option<Arc<ServiceRegistry>>,
    sorter: Option<Arc<dyn HeaderSorter>>,
    cache_schemas: bool,
}

impl TableEngineBuilder {
    /// Routes component insertions and filters through `registry`.
    pub fn registry(mut self, registry: ServiceRegistry) -> Self {
        self.registry = Some(Arc::new(registry));
        self
    }

    /// Shares an already-built registry between engines.
    pub fn shared_registry(mut self, registry: Arc<ServiceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the routine `sort_table` delegates to.
    pub fn sorter<S>(mut self, sorter: S) -> Self
    where
        S: HeaderSorter + 'static,
    {
        self.sorter = Some(Arc::new(sorter));
        self
    }

    /// Memoizes row schemas by type instead of rebuilding them per call.
    pub fn cache_schemas(mut self, enabled: bool) -> Self {
        self.cache_schemas = enabled;
        self
    }

    pub fn build(self) -> TableEngine {
        TableEngine {
            root: self.root,
            registry: self.registry,
            sorter: self.sorter,
            cache: self.cache_schemas.then(SchemaCache::new),
        }
    }
}
