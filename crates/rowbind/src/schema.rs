//! Row schemas: the table and field descriptors a row type registers.
//!
//! A row type describes its table once, in [`TableRow::table_schema`]:
//! where the table lives, how its rows and header are found, and for each
//! bound field which cell it reads and how that cell is written or filtered.
//! The derive macro generates this function; it can also be written by hand
//! with [`TableSchema::builder`] and [`FieldBinding::new`].
//!
//! ```
//! use rowbind::{FieldBinding, Locator, TableCell, TableDescriptor, TableField,
//!               TableRow, TableSchema, CellSlot, Result};
//!
//! #[derive(Default, Clone)]
//! struct User {
//!     name: Option<TableCell>,
//! }
//!
//! impl User {
//!     const NAME: TableField<User> =
//!         TableField::new("name", |row, field, value| row.name.write_slot(field, value));
//! }
//!
//! impl TableRow for User {
//!     fn table_schema() -> Result<TableSchema<Self>> {
//!         TableSchema::builder(TableDescriptor::new(
//!             Locator::id("users"),
//!             Locator::css("tbody tr"),
//!             Locator::css("thead tr"),
//!         ))
//!         .field(FieldBinding::new(User::NAME, |u: &User| &u.name).cell(Locator::css("td.name")))
//!         .build()
//!     }
//! }
//!
//! let schema = User::table_schema().unwrap();
//! assert_eq!(schema.bindings().len(), 1);
//! ```

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::cell::{CellSlot, CellValue};
use crate::element::Locator;
use crate::error::{Result, TableError};
use crate::strategy::{FilterRoute, InsertionRoute};

/// Name of the section fields belong to unless they declare another.
pub const DEFAULT_SECTION: &str = "";

/// Where a table lives on the page and how its rows are found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// The element enclosing the whole table.
    pub container: Locator,
    /// Data rows of the default section, relative to the container.
    pub rows: Locator,
    /// The header row, relative to the container.
    pub header_row: Locator,
    /// Additional independently-rowed regions of the same table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<SectionDescriptor>,
}

/// A named table region with its own row set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDescriptor {
    pub name: String,
    pub rows: Locator,
}

impl TableDescriptor {
    pub fn new(container: Locator, rows: Locator, header_row: Locator) -> Self {
        Self {
            container,
            rows,
            header_row,
            sections: Vec::new(),
        }
    }

    /// Adds a section whose rows are found with `rows`.
    pub fn section(mut self, name: impl Into<String>, rows: Locator) -> Self {
        self.sections.push(SectionDescriptor {
            name: name.into(),
            rows,
        });
        self
    }

    /// Returns the row locator of a section; the default section uses `rows`.
    pub fn rows_for(&self, section: &str) -> Option<&Locator> {
        if section == DEFAULT_SECTION {
            return Some(&self.rows);
        }
        self.sections
            .iter()
            .find(|s| s.name == section)
            .map(|s| &s.rows)
    }

    /// Parses a descriptor from YAML.
    ///
    /// ```
    /// use rowbind::{Locator, TableDescriptor};
    ///
    /// let yaml = r#"
    /// container: { by: id, value: orders }
    /// rows: { by: css, value: "tbody tr" }
    /// header_row: { by: css, value: "thead tr" }
    /// "#;
    /// let table = TableDescriptor::from_yaml(yaml).unwrap();
    /// assert_eq!(table.container, Locator::id("orders"));
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses a descriptor from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Which cell a field is bound to and how its text is read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellDescriptor {
    /// The cell within the row. `None` reads the row element itself.
    pub cell: Option<Locator>,
    /// The text element within the cell. `None` reads the cell itself.
    pub cell_text: Option<Locator>,
    /// The header cell within the header row, used by filter and sort.
    pub header_cell: Option<Locator>,
    /// Section the field belongs to.
    pub section: String,
    /// Whether the field binds every matching cell.
    pub collection: bool,
    /// Read only the text directly owned by the text element.
    pub direct_text: bool,
}

type Setter<R> = fn(&mut R, &str, CellValue) -> Result<()>;
type Getter<R> = Arc<dyn Fn(&R) -> Option<CellValue> + Send + Sync>;

/// A typed handle to one field of a row type.
///
/// Used to name fields in partial reads, cell writes, filters and sorts, and
/// to assign cell values to a row with type checking.
pub struct TableField<R> {
    name: &'static str,
    setter: Setter<R>,
}

impl<R> TableField<R> {
    pub const fn new(name: &'static str, setter: Setter<R>) -> Self {
        Self { name, setter }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Assigns `value` to this field of `row`.
    ///
    /// Fails with [`TableError::TypeMismatch`] if the value's shape does not
    /// match the field.
    pub fn set(&self, row: &mut R, value: impl Into<CellValue>) -> Result<()> {
        (self.setter)(row, self.name, value.into())
    }
}

impl<R> Clone for TableField<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for TableField<R> {}

impl<R> fmt::Debug for TableField<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TableField").field(&self.name).finish()
    }
}

impl<R> PartialEq for TableField<R> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Everything the engine knows about one bound field.
pub struct FieldBinding<R> {
    field: TableField<R>,
    getter: Getter<R>,
    cell: CellDescriptor,
    insertion: Option<InsertionRoute>,
    filter: Option<FilterRoute>,
}

impl<R: 'static> FieldBinding<R> {
    /// Binds `field`, reading its current value through `getter`.
    ///
    /// The slot type decides whether the field is a single cell or a list.
    pub fn new<S, G>(field: TableField<R>, getter: G) -> Self
    where
        S: CellSlot + 'static,
        G: Fn(&R) -> &S + Send + Sync + 'static,
    {
        Self {
            field,
            getter: Arc::new(move |row: &R| getter(row).read_slot()),
            cell: CellDescriptor {
                collection: S::COLLECTION,
                ..CellDescriptor::default()
            },
            insertion: None,
            filter: None,
        }
    }
}

impl<R> FieldBinding<R> {
    pub fn cell(mut self, locator: Locator) -> Self {
        self.cell.cell = Some(locator);
        self
    }

    pub fn cell_text(mut self, locator: Locator) -> Self {
        self.cell.cell_text = Some(locator);
        self
    }

    pub fn header_cell(mut self, locator: Locator) -> Self {
        self.cell.header_cell = Some(locator);
        self
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.cell.section = section.into();
        self
    }

    pub fn direct_text(mut self) -> Self {
        self.cell.direct_text = true;
        self
    }

    pub fn insertion(mut self, route: InsertionRoute) -> Self {
        self.insertion = Some(route);
        self
    }

    pub fn filter(mut self, route: FilterRoute) -> Self {
        self.filter = Some(route);
        self
    }

    pub fn name(&self) -> &'static str {
        self.field.name()
    }

    pub fn field(&self) -> TableField<R> {
        self.field
    }

    pub fn descriptor(&self) -> &CellDescriptor {
        &self.cell
    }

    pub fn insertion_route(&self) -> Option<&InsertionRoute> {
        self.insertion.as_ref()
    }

    pub fn filter_route(&self) -> Option<&FilterRoute> {
        self.filter.as_ref()
    }

    /// Returns the field's current value in `row`, or `None` if unset.
    pub fn get(&self, row: &R) -> Option<CellValue> {
        (self.getter)(row)
    }

    pub fn set(&self, row: &mut R, value: CellValue) -> Result<()> {
        self.field.set(row, value)
    }
}

impl<R> Clone for FieldBinding<R> {
    fn clone(&self) -> Self {
        Self {
            field: self.field,
            getter: Arc::clone(&self.getter),
            cell: self.cell.clone(),
            insertion: self.insertion.clone(),
            filter: self.filter.clone(),
        }
    }
}

impl<R> fmt::Debug for FieldBinding<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("name", &self.field.name)
            .field("cell", &self.cell)
            .field("insertion", &self.insertion)
            .field("filter", &self.filter)
            .finish()
    }
}

// Accessors are not compared.
impl<R> PartialEq for FieldBinding<R> {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field
            && self.cell == other.cell
            && self.insertion == other.insertion
            && self.filter == other.filter
    }
}

/// A row type's table descriptor and its ordered field bindings.
#[derive(Debug, Clone)]
pub struct TableSchema<R> {
    table: TableDescriptor,
    bindings: Vec<FieldBinding<R>>,
}

impl<R> TableSchema<R> {
    pub fn builder(table: TableDescriptor) -> TableSchemaBuilder<R> {
        TableSchemaBuilder {
            table,
            bindings: Vec::new(),
        }
    }

    pub fn table(&self) -> &TableDescriptor {
        &self.table
    }

    pub fn bindings(&self) -> &[FieldBinding<R>] {
        &self.bindings
    }

    /// Returns the binding for `field`.
    pub fn binding(&self, field: TableField<R>) -> Result<&FieldBinding<R>> {
        self.bindings
            .iter()
            .find(|b| b.name() == field.name())
            .ok_or_else(|| unbound(field.name()))
    }
}

/// Collects field bindings and validates them against the table descriptor.
pub struct TableSchemaBuilder<R> {
    table: TableDescriptor,
    bindings: Vec<FieldBinding<R>>,
}

impl<R> TableSchemaBuilder<R> {
    pub fn field(mut self, binding: FieldBinding<R>) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Finishes the schema.
    ///
    /// Fails if two bindings share a field name or a binding names a section
    /// the table does not declare.
    pub fn build(self) -> Result<TableSchema<R>> {
        let mut seen = HashSet::new();
        for binding in &self.bindings {
            if !seen.insert(binding.name()) {
                return Err(TableError::configuration(format!(
                    "field '{}' is bound more than once",
                    binding.name()
                )));
            }
            let section = &binding.descriptor().section;
            if self.table.rows_for(section).is_none() {
                return Err(TableError::configuration(format!(
                    "field '{}' belongs to undeclared section '{}'",
                    binding.name(),
                    section
                )));
            }
        }
        Ok(TableSchema {
            table: self.table,
            bindings: self.bindings,
        })
    }
}

/// A type whose fields are bound to the cells of an on-screen table.
///
/// Usually derived with `#[derive(TableRow)]`.
pub trait TableRow: Default + Clone + 'static {
    /// Registers the table and field descriptors of this row type.
    fn table_schema() -> Result<TableSchema<Self>>;
}

/// Returns the bindings a call operates on.
///
/// With an empty `subset`, every bound field is returned. Otherwise only the
/// named fields are returned, in schema order; a field the schema does not
/// bind is a configuration error.
pub fn extract_fields<'s, R>(
    schema: &'s TableSchema<R>,
    subset: &[TableField<R>],
) -> Result<Vec<&'s FieldBinding<R>>> {
    if subset.is_empty() {
        return Ok(schema.bindings.iter().collect());
    }
    for field in subset {
        schema.binding(*field)?;
    }
    Ok(schema
        .bindings
        .iter()
        .filter(|b| subset.iter().any(|f| f.name() == b.name()))
        .collect())
}

/// Groups bindings by section, keeping first-seen section order.
pub fn group_by_section<'s, R>(
    bindings: &[&'s FieldBinding<R>],
) -> Vec<(&'s str, Vec<&'s FieldBinding<R>>)> {
    let mut groups: Vec<(&'s str, Vec<&'s FieldBinding<R>>)> = Vec::new();
    for &binding in bindings {
        let section = binding.descriptor().section.as_str();
        match groups.iter_mut().find(|(name, _)| *name == section) {
            Some((_, members)) => members.push(binding),
            None => groups.push((section, vec![binding])),
        }
    }
    groups
}

fn unbound(name: &str) -> TableError {
    TableError::configuration(format!("field '{}' is not bound to a table cell", name))
}

/// Memoizes row schemas by row type.
#[derive(Default)]
pub struct SchemaCache {
    entries: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached schema for `R`, building it on first use.
    pub fn get_or_build<R: TableRow>(&self) -> Result<Arc<TableSchema<R>>> {
        let key = TypeId::of::<R>();
        let cached = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(entry) = cached {
            if let Ok(schema) = entry.downcast::<TableSchema<R>>() {
                return Ok(schema);
            }
        }

        let schema = Arc::new(R::table_schema()?);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, schema.clone());
        Ok(schema)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCache")
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::TableCell;

    #[derive(Default, Clone, Debug)]
    struct Order {
        id: Option<TableCell>,
        items: Option<Vec<TableCell>>,
        total: Option<TableCell>,
    }

    impl Order {
        const ID: TableField<Order> = TableField::new("id", |r, f, v| r.id.write_slot(f, v));
        const ITEMS: TableField<Order> =
            TableField::new("items", |r, f, v| r.items.write_slot(f, v));
        const TOTAL: TableField<Order> =
            TableField::new("total", |r, f, v| r.total.write_slot(f, v));
    }

    fn table() -> TableDescriptor {
        TableDescriptor::new(
            Locator::id("orders"),
            Locator::css("tbody tr"),
            Locator::css("thead tr"),
        )
        .section("totals", Locator::css("tfoot tr"))
    }

    impl TableRow for Order {
        fn table_schema() -> Result<TableSchema<Self>> {
            TableSchema::builder(table())
                .field(FieldBinding::new(Order::ID, |o: &Order| &o.id).cell(Locator::css("td.id")))
                .field(
                    FieldBinding::new(Order::ITEMS, |o: &Order| &o.items)
                        .cell(Locator::css("li")),
                )
                .field(
                    FieldBinding::new(Order::TOTAL, |o: &Order| &o.total)
                        .cell(Locator::css("td.total"))
                        .section("totals"),
                )
                .build()
        }
    }

    #[test]
    fn extract_all_fields_when_subset_empty() {
        let schema = Order::table_schema().unwrap();
        let names: Vec<_> = extract_fields(&schema, &[])
            .unwrap()
            .iter()
            .map(|b| b.name())
            .collect();
        assert_eq!(names, vec!["id", "items", "total"]);
    }

    #[test]
    fn extract_subset_keeps_schema_order() {
        let schema = Order::table_schema().unwrap();
        let names: Vec<_> = extract_fields(&schema, &[Order::TOTAL, Order::ID])
            .unwrap()
            .iter()
            .map(|b| b.name())
            .collect();
        assert_eq!(names, vec!["id", "total"]);
    }

    #[test]
    fn extract_unbound_field_fails() {
        let schema = Order::table_schema().unwrap();
        let stray: TableField<Order> = TableField::new("notes", |r, f, v| r.id.write_slot(f, v));
        let err = extract_fields(&schema, &[stray]).unwrap_err();
        assert!(matches!(err, TableError::Configuration(_)));
        assert!(err.to_string().contains("notes"));
    }

    #[test]
    fn collection_flag_follows_slot_type() {
        let schema = Order::table_schema().unwrap();
        assert!(!schema.binding(Order::ID).unwrap().descriptor().collection);
        assert!(schema.binding(Order::ITEMS).unwrap().descriptor().collection);
    }

    #[test]
    fn group_by_section_first_seen_order() {
        let schema = Order::table_schema().unwrap();
        let all = extract_fields(&schema, &[]).unwrap();
        let groups = group_by_section(&all);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, DEFAULT_SECTION);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "totals");
    }

    #[test]
    fn duplicate_binding_rejected() {
        let result = TableSchema::builder(table())
            .field(FieldBinding::new(Order::ID, |o: &Order| &o.id))
            .field(FieldBinding::new(Order::ID, |o: &Order| &o.id))
            .build();
        assert!(matches!(result, Err(TableError::Configuration(_))));
    }

    #[test]
    fn undeclared_section_rejected() {
        let err = TableSchema::builder(table())
            .field(FieldBinding::new(Order::ID, |o: &Order| &o.id).section("sidebar"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("undeclared section 'sidebar'"));
    }

    #[test]
    fn table_field_set_checks_shape() {
        let mut order = Order::default();
        Order::ITEMS.set(&mut order, vec!["a", "b"]).unwrap();
        assert_eq!(order.items.as_ref().map(Vec::len), Some(2));
        assert!(Order::ID.set(&mut order, vec!["x"]).is_err());
    }

    #[test]
    fn schema_cache_reuses_entry() {
        let cache = SchemaCache::new();
        let first = cache.get_or_build::<Order>().unwrap();
        let second = cache.get_or_build::<Order>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn descriptor_from_json_with_sections() {
        let json = r#"{
            "container": {"by": "id", "value": "orders"},
            "rows": {"by": "css", "value": "tbody tr"},
            "header_row": {"by": "css", "value": "thead tr"},
            "sections": [{"name": "totals", "rows": {"by": "css", "value": "tfoot tr"}}]
        }"#;
        assert_eq!(TableDescriptor::from_json(json).unwrap(), table());
    }

    #[test]
    fn descriptor_parse_error_is_descriptor_variant() {
        let err = TableDescriptor::from_yaml("container: [").unwrap_err();
        assert!(matches!(err, TableError::Descriptor(_)));
    }

    #[test]
    fn bindings_differ_by_route_target() {
        fn noop(_: &crate::element::ElementRef, _: &[String]) -> anyhow::Result<()> {
            Ok(())
        }
        let component = FieldBinding::new(Order::ID, |o: &Order| &o.id)
            .insertion(InsertionRoute::component("input", "text", 0));
        let custom = FieldBinding::new(Order::ID, |o: &Order| &o.id)
            .insertion(InsertionRoute::custom(noop, 0));
        assert_ne!(component, custom);
        assert_eq!(component, component.clone());
    }
}
