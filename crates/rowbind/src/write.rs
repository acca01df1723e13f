//! Writing values into table cells.

use tracing::debug;

use crate::element::ElementRef;
use crate::engine::{describe, locate_cell, locate_cells, TableEngine};
use crate::error::{Result, TableError};
use crate::locate::{find_row_position, RowSelector};
use crate::schema::{FieldBinding, TableField, TableRow, TableSchema, DEFAULT_SECTION};
use crate::strategy::{CellRoute, InsertionRoute};

/// One field of a whole-row insert: the binding and the strings to write.
#[derive(Debug)]
pub struct InsertionStep<'s, R> {
    pub binding: &'s FieldBinding<R>,
    pub values: Vec<String>,
}

/// Orders the writes a whole-row insert performs.
///
/// Every field set in `data` becomes a step; steps run by ascending route
/// order, and fields with equal order keep declaration order. A set field
/// with no insertion route fails before anything is written.
pub fn insertion_plan<'s, R>(
    schema: &'s TableSchema<R>,
    data: &R,
) -> Result<Vec<InsertionStep<'s, R>>> {
    let mut plan = Vec::new();
    for binding in schema.bindings() {
        let Some(value) = binding.get(data) else {
            continue;
        };
        if binding.insertion_route().is_none() {
            return Err(no_insertion_method(binding.name()));
        }
        plan.push(InsertionStep {
            binding,
            values: value.to_strings(),
        });
    }
    plan.sort_by_key(|step| step.binding.insertion_route().map_or(0, CellRoute::order));
    Ok(plan)
}

impl TableEngine {
    /// Writes every set field of `data` into the selected row.
    pub fn insert_row<R: TableRow>(
        &self,
        selector: impl Into<RowSelector>,
        data: &R,
    ) -> Result<()> {
        let selector = selector.into();
        let schema = self.schema::<R>()?;
        let plan = insertion_plan(&schema, data)?;

        let container = self.container(schema.table())?;
        let primary = self.section_rows(&container, schema.table(), DEFAULT_SECTION)?;
        let position = find_row_position(&primary, &selector)?;
        if plan.is_empty() {
            debug!("Nothing to insert into {}", selector);
            return Ok(());
        }

        for step in plan {
            let section = step.binding.descriptor().section.as_str();
            let row = if section == DEFAULT_SECTION {
                primary.get(position).cloned()
            } else {
                self.section_rows(&container, schema.table(), section)?
                    .get(position)
                    .cloned()
            };
            let row = row.ok_or_else(|| {
                TableError::not_found(format!(
                    "Row {} not found in section '{}'",
                    position + 1,
                    section
                ))
            })?;
            let cell = locate_cell(&row, step.binding.descriptor())
                .ok_or_else(|| missing_cell(step.binding))?;
            self.dispatch_insertion(step.binding, &cell, &step.values)?;
        }
        Ok(())
    }

    /// Writes `values` into one cell of the selected row.
    ///
    /// `cell_index` is 1-based among the cells the field binds, so it picks
    /// one element of a list field; single-cell fields accept only 1.
    pub fn insert_cell_value<R: TableRow>(
        &self,
        selector: impl Into<RowSelector>,
        field: TableField<R>,
        cell_index: usize,
        values: &[&str],
    ) -> Result<()> {
        let selector = selector.into();
        let schema = self.schema::<R>()?;
        let binding = schema.binding(field)?;
        if binding.insertion_route().is_none() {
            return Err(no_insertion_method(binding.name()));
        }

        let container = self.container(schema.table())?;
        let primary = self.section_rows(&container, schema.table(), DEFAULT_SECTION)?;
        let position = find_row_position(&primary, &selector)?;
        let section = binding.descriptor().section.as_str();
        let rows = if section == DEFAULT_SECTION {
            primary
        } else {
            self.section_rows(&container, schema.table(), section)?
        };
        let row = rows.get(position).ok_or_else(|| {
            TableError::not_found(format!(
                "Row {} not found in section '{}'",
                position + 1,
                section
            ))
        })?;

        let cells = locate_cells(row, binding.descriptor());
        let cell = cell_index
            .checked_sub(1)
            .and_then(|i| cells.get(i))
            .ok_or_else(|| TableError::IndexRange(format!("Invalid cell index: {}", cell_index)))?;

        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.dispatch_insertion(binding, cell, &values)
    }

    fn dispatch_insertion<R>(
        &self,
        binding: &FieldBinding<R>,
        cell: &ElementRef,
        values: &[String],
    ) -> Result<()> {
        let route = binding
            .insertion_route()
            .ok_or_else(|| no_insertion_method(binding.name()))?;
        debug!(
            "Inserting {:?} into field '{}' via {:?}",
            values,
            binding.name(),
            route
        );
        match route {
            InsertionRoute::Component { component, .. } => {
                let registry = self.registry().ok_or_else(|| TableError::RegistryUnavailable {
                    operation: "insert",
                    field: binding.name().to_string(),
                })?;
                let service = registry.insertion_service(&component.kind).ok_or_else(|| {
                    TableError::RegistryLookup {
                        message: "Failed to insert using component",
                        kind: component.kind.clone(),
                        key: component.key.clone(),
                    }
                })?;
                service
                    .insert(cell, component, values)
                    .map_err(|err| TableError::cell_operation(binding.name(), err))
            }
            InsertionRoute::Custom { function, .. } => function
                .insert(cell, values)
                .map_err(|err| TableError::cell_operation(binding.name(), err)),
        }
    }
}

fn no_insertion_method(field: &str) -> TableError {
    TableError::configuration(format!(
        "No table cell insertion method provided for field: {}",
        field
    ))
}

fn missing_cell<R>(binding: &FieldBinding<R>) -> TableError {
    TableError::not_found(format!(
        "Cell for field '{}' not found: {}",
        binding.name(),
        describe(binding.descriptor().cell.as_ref())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CellSlot, TableCell};
    use crate::element::Locator;
    use crate::schema::TableDescriptor;

    #[derive(Default, Clone, Debug)]
    struct Signup {
        country: Option<TableCell>,
        city: Option<TableCell>,
        notes: Option<TableCell>,
        tags: Option<Vec<TableCell>>,
    }

    impl Signup {
        const COUNTRY: TableField<Signup> =
            TableField::new("country", |r, f, v| r.country.write_slot(f, v));
        const CITY: TableField<Signup> = TableField::new("city", |r, f, v| r.city.write_slot(f, v));
        const NOTES: TableField<Signup> =
            TableField::new("notes", |r, f, v| r.notes.write_slot(f, v));
        const TAGS: TableField<Signup> = TableField::new("tags", |r, f, v| r.tags.write_slot(f, v));
    }

    impl TableRow for Signup {
        fn table_schema() -> Result<TableSchema<Self>> {
            TableSchema::builder(TableDescriptor::new(
                Locator::id("signup"),
                Locator::css("tr"),
                Locator::css("thead tr"),
            ))
            .field(
                FieldBinding::new(Signup::CITY, |s: &Signup| &s.city)
                    .insertion(InsertionRoute::component("input", "plain", 2)),
            )
            .field(
                FieldBinding::new(Signup::COUNTRY, |s: &Signup| &s.country)
                    .insertion(InsertionRoute::component("select", "native", 1)),
            )
            .field(FieldBinding::new(Signup::NOTES, |s: &Signup| &s.notes))
            .field(
                FieldBinding::new(Signup::TAGS, |s: &Signup| &s.tags)
                    .insertion(InsertionRoute::component("chip", "plain", 2)),
            )
            .build()
        }
    }

    fn names<R>(plan: &[InsertionStep<'_, R>]) -> Vec<&'static str> {
        plan.iter().map(|s| s.binding.name()).collect()
    }

    #[test]
    fn plan_orders_by_route_order_then_declaration() {
        let schema = Signup::table_schema().unwrap();
        let data = Signup {
            country: Some("NL".into()),
            city: Some("Utrecht".into()),
            tags: Some(vec!["a".into(), "b".into()]),
            ..Signup::default()
        };
        let plan = insertion_plan(&schema, &data).unwrap();
        assert_eq!(names(&plan), vec!["country", "city", "tags"]);
        assert_eq!(plan[2].values, vec!["a", "b"]);
    }

    #[test]
    fn plan_skips_unset_fields() {
        let schema = Signup::table_schema().unwrap();
        let data = Signup {
            city: Some("Utrecht".into()),
            ..Signup::default()
        };
        let plan = insertion_plan(&schema, &data).unwrap();
        assert_eq!(names(&plan), vec!["city"]);
        assert_eq!(plan[0].values, vec!["Utrecht"]);
    }

    #[test]
    fn plan_rejects_set_field_without_route() {
        let schema = Signup::table_schema().unwrap();
        let data = Signup {
            city: Some("Utrecht".into()),
            notes: Some("hello".into()),
            ..Signup::default()
        };
        let err = insertion_plan(&schema, &data).unwrap_err();
        assert!(matches!(err, TableError::Configuration(_)));
        assert!(err
            .to_string()
            .contains("No table cell insertion method provided for field: notes"));
    }
}
