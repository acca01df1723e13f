//! Filtering and sorting through header cells.

use tracing::debug;

use crate::engine::TableEngine;
use crate::error::{Result, TableError};
use crate::schema::{TableField, TableRow};
use crate::strategy::{FilterRoute, FilterStrategy, SortingStrategy};

impl TableEngine {
    /// Applies a filter on the header cell of `field`.
    pub fn filter_table<R: TableRow>(
        &self,
        field: TableField<R>,
        strategy: FilterStrategy,
        values: &[&str],
    ) -> Result<()> {
        let schema = self.schema::<R>()?;
        let binding = schema.binding(field)?;
        let route = binding.filter_route().ok_or_else(|| {
            TableError::configuration(format!(
                "No table cell filter method provided for field: {}",
                binding.name()
            ))
        })?;
        let header = self.header_cell(schema.table(), binding)?;
        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        debug!(
            "Filtering field '{}' ({:?} {:?}) via {:?}",
            binding.name(),
            strategy,
            values,
            route
        );

        match route {
            FilterRoute::Component { component, .. } => {
                let registry = self.registry().ok_or_else(|| TableError::RegistryUnavailable {
                    operation: "filter",
                    field: binding.name().to_string(),
                })?;
                let service = registry.filter_service(&component.kind).ok_or_else(|| {
                    TableError::RegistryLookup {
                        message: "Failed to filter using component",
                        kind: component.kind.clone(),
                        key: component.key.clone(),
                    }
                })?;
                service
                    .filter(&header, component, strategy, &values)
                    .map_err(|err| TableError::cell_operation(binding.name(), err))
            }
            FilterRoute::Custom { function, .. } => function
                .filter(&header, strategy, &values)
                .map_err(|err| TableError::cell_operation(binding.name(), err)),
        }
    }

    /// Sorts the table by `field` through the configured header sorter.
    pub fn sort_table<R: TableRow>(
        &self,
        field: TableField<R>,
        strategy: SortingStrategy,
    ) -> Result<()> {
        let schema = self.schema::<R>()?;
        let binding = schema.binding(field)?;
        let sorter = self
            .sorter()
            .ok_or_else(|| TableError::SorterNotConfigured(binding.name().to_string()))?;
        let header = self.header_cell(schema.table(), binding)?;
        debug!("Sorting by field '{}' ({:?})", binding.name(), strategy);
        sorter
            .sort(&header, strategy)
            .map_err(|err| TableError::cell_operation(binding.name(), err))
    }
}
