//! Reading table rows into row objects.

use tracing::{debug, warn};

use crate::cell::{CellValue, TableCell};
use crate::element::ElementRef;
use crate::engine::{locate_cell, locate_cells, TableEngine};
use crate::error::Result;
use crate::instance::{create_instance, merge_objects};
use crate::locate::{find_row_position, resolve_range, RowSelector};
use crate::schema::{
    extract_fields, group_by_section, CellDescriptor, FieldBinding, TableField, TableRow,
    DEFAULT_SECTION,
};

impl TableEngine {
    /// Reads every row of the table.
    ///
    /// With an empty `fields` slice all bound fields are read; otherwise only
    /// the given ones, leaving the rest unset.
    pub fn read_table<R: TableRow>(&self, fields: &[TableField<R>]) -> Result<Vec<R>> {
        self.read_table_range(1, usize::MAX, fields)
    }

    /// Reads rows `start..=end` (1-based), clamped to the rows present.
    ///
    /// A range with `start > end`, or lying wholly outside the table, yields
    /// an empty list.
    pub fn read_table_range<R: TableRow>(
        &self,
        start: usize,
        end: usize,
        fields: &[TableField<R>],
    ) -> Result<Vec<R>> {
        let schema = self.schema::<R>()?;
        let bindings = extract_fields(&schema, fields)?;
        let container = self.container(schema.table())?;

        let mut sections = Vec::new();
        for (section, members) in group_by_section(&bindings) {
            let rows = self.section_rows(&container, schema.table(), section)?;
            sections.push((rows, members));
        }
        let available = if sections.is_empty() {
            self.section_rows(&container, schema.table(), DEFAULT_SECTION)?
                .len()
        } else {
            sections.iter().map(|(rows, _)| rows.len()).max().unwrap_or(0)
        };

        if available == 0 {
            warn!(
                "Table for {} has no rows; returning none",
                std::any::type_name::<R>()
            );
            return Ok(Vec::new());
        }
        let Some(range) = resolve_range(start, end, available) else {
            warn!(
                "Requested rows [{}, {}] do not overlap the {} available rows of {}; returning none",
                start,
                end,
                available,
                std::any::type_name::<R>()
            );
            return Ok(Vec::new());
        };

        debug!(
            "Reading rows [{}, {}] of {}",
            range.start() + 1,
            range.end() + 1,
            std::any::type_name::<R>()
        );
        let mut result = Vec::with_capacity(range.end() - range.start() + 1);
        for position in range {
            let mut merged = None;
            for (rows, members) in &sections {
                if let Some(row) = rows.get(position) {
                    let part = populate::<R>(row, members)?;
                    merged = merge_objects(&schema, merged, Some(part));
                }
            }
            result.push(merged.unwrap_or_else(create_instance));
        }
        Ok(result)
    }

    /// Reads one row, selected by 1-based index or by text criteria.
    ///
    /// The selector is resolved against the default section's rows; in a
    /// multi-section table, the row at the same position in each other
    /// section supplies that section's fields.
    pub fn read_row<R: TableRow>(
        &self,
        selector: impl Into<RowSelector>,
        fields: &[TableField<R>],
    ) -> Result<R> {
        let selector = selector.into();
        let schema = self.schema::<R>()?;
        let bindings = extract_fields(&schema, fields)?;
        let container = self.container(schema.table())?;
        let primary = self.section_rows(&container, schema.table(), DEFAULT_SECTION)?;
        let position = find_row_position(&primary, &selector)?;
        debug!(
            "Reading {} (position {}) of {}",
            selector,
            position + 1,
            std::any::type_name::<R>()
        );

        let mut merged = None;
        for (section, members) in group_by_section(&bindings) {
            let row = if section == DEFAULT_SECTION {
                primary.get(position).cloned()
            } else {
                self.section_rows(&container, schema.table(), section)?
                    .get(position)
                    .cloned()
            };
            if let Some(row) = row {
                let part = populate::<R>(&row, &members)?;
                merged = merge_objects(&schema, merged, Some(part));
            }
        }
        Ok(merged.unwrap_or_else(create_instance))
    }
}

/// Builds a row from `row`, filling only the given bindings.
pub fn populate<R: TableRow>(row: &ElementRef, bindings: &[&FieldBinding<R>]) -> Result<R> {
    let mut target = create_instance::<R>();
    populate_into(row, bindings, &mut target)?;
    Ok(target)
}

/// Fills the given bindings of an existing row object from `row`.
pub fn populate_into<R>(
    row: &ElementRef,
    bindings: &[&FieldBinding<R>],
    target: &mut R,
) -> Result<()> {
    for binding in bindings {
        match read_value(row, binding.descriptor()) {
            Some(value) => binding.set(target, value)?,
            None => debug!("No cell for field '{}'; leaving it unset", binding.name()),
        }
    }
    Ok(())
}

/// Reads the value a cell descriptor binds within `row`.
///
/// A single-cell field whose cell is missing yields `None`. A list field
/// always yields a list, empty when nothing matches. When a text locator is
/// declared, a cell without that text element counts as missing.
pub fn read_value(row: &ElementRef, descriptor: &CellDescriptor) -> Option<CellValue> {
    if descriptor.collection {
        let cells = locate_cells(row, descriptor)
            .into_iter()
            .filter_map(|cell| read_cell(cell, descriptor))
            .collect();
        return Some(CellValue::List(cells));
    }
    locate_cell(row, descriptor)
        .and_then(|cell| read_cell(cell, descriptor))
        .map(CellValue::Single)
}

fn read_cell(cell: ElementRef, descriptor: &CellDescriptor) -> Option<TableCell> {
    let source = match &descriptor.cell_text {
        Some(locator) => cell.find(locator)?,
        None => cell.clone(),
    };
    let text = if descriptor.direct_text {
        source.own_text()
    } else {
        source.text()
    };
    Some(TableCell::new(cell, text))
}
