//! How a field's cells are written, filtered and sorted.
//!
//! Each bound field may declare a [`CellRoute`] for insertion and another for
//! filtering. A route either goes through the [`ServiceRegistry`] by
//! component type, or straight to a custom function supplied with the field.
//!
//! [`ServiceRegistry`]: crate::ServiceRegistry

use std::fmt;
use std::sync::Arc;

use crate::element::ElementRef;

/// A concrete component variant, routed to the service registered for `kind`.
///
/// `kind` names the abstract component category (e.g. `"input"`, `"select"`);
/// `key` names the variant the service should drive (e.g. `"md-input"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentType {
    pub kind: String,
    pub key: String,
}

impl ComponentType {
    pub fn new(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.key)
    }
}

/// Whether a filter selects or clears the given values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterStrategy {
    #[default]
    Select,
    Unselect,
}

/// Sort direction requested from a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortingStrategy {
    #[default]
    Ascending,
    Descending,
}

/// Writes values into a cell for a registered component kind.
pub trait ComponentInsertion: Send + Sync {
    fn insert(
        &self,
        cell: &ElementRef,
        component: &ComponentType,
        values: &[String],
    ) -> anyhow::Result<()>;
}

/// Applies a filter on a header cell for a registered component kind.
pub trait ComponentFilter: Send + Sync {
    fn filter(
        &self,
        cell: &ElementRef,
        component: &ComponentType,
        strategy: FilterStrategy,
        values: &[String],
    ) -> anyhow::Result<()>;
}

impl<F> ComponentInsertion for F
where
    F: Fn(&ElementRef, &ComponentType, &[String]) -> anyhow::Result<()> + Send + Sync,
{
    fn insert(
        &self,
        cell: &ElementRef,
        component: &ComponentType,
        values: &[String],
    ) -> anyhow::Result<()> {
        self(cell, component, values)
    }
}

impl<F> ComponentFilter for F
where
    F: Fn(&ElementRef, &ComponentType, FilterStrategy, &[String]) -> anyhow::Result<()>
        + Send
        + Sync,
{
    fn filter(
        &self,
        cell: &ElementRef,
        component: &ComponentType,
        strategy: FilterStrategy,
        values: &[String],
    ) -> anyhow::Result<()> {
        self(cell, component, strategy, values)
    }
}

/// Field-specific insertion logic that bypasses the registry.
pub trait CustomInsertion: Send + Sync {
    fn insert(&self, cell: &ElementRef, values: &[String]) -> anyhow::Result<()>;
}

impl<F> CustomInsertion for F
where
    F: Fn(&ElementRef, &[String]) -> anyhow::Result<()> + Send + Sync,
{
    fn insert(&self, cell: &ElementRef, values: &[String]) -> anyhow::Result<()> {
        self(cell, values)
    }
}

/// Field-specific filter logic that bypasses the registry.
pub trait CustomFilter: Send + Sync {
    fn filter(
        &self,
        cell: &ElementRef,
        strategy: FilterStrategy,
        values: &[String],
    ) -> anyhow::Result<()>;
}

impl<F> CustomFilter for F
where
    F: Fn(&ElementRef, FilterStrategy, &[String]) -> anyhow::Result<()> + Send + Sync,
{
    fn filter(
        &self,
        cell: &ElementRef,
        strategy: FilterStrategy,
        values: &[String],
    ) -> anyhow::Result<()> {
        self(cell, strategy, values)
    }
}

/// Applies a sort to a table by acting on one of its header cells.
///
/// The engine resolves the header cell; what "sorting" means for the page
/// (clicking, opening a menu) is up to the implementation.
pub trait HeaderSorter: Send + Sync {
    fn sort(&self, header_cell: &ElementRef, strategy: SortingStrategy) -> anyhow::Result<()>;
}

impl<F> HeaderSorter for F
where
    F: Fn(&ElementRef, SortingStrategy) -> anyhow::Result<()> + Send + Sync,
{
    fn sort(&self, header_cell: &ElementRef, strategy: SortingStrategy) -> anyhow::Result<()> {
        self(header_cell, strategy)
    }
}

/// Where a field's insertion or filter request is sent.
///
/// `order` sequences fields within one whole-row insert; lower runs first
/// and equal orders keep declaration order.
pub enum CellRoute<F: ?Sized> {
    /// Dispatch to the registry service for `component.kind`.
    Component { component: ComponentType, order: i32 },
    /// Call the supplied function directly.
    Custom { function: Arc<F>, order: i32 },
}

/// Insertion route of a field.
pub type InsertionRoute = CellRoute<dyn CustomInsertion>;

/// Filter route of a field.
pub type FilterRoute = CellRoute<dyn CustomFilter>;

impl<F: ?Sized> CellRoute<F> {
    pub fn component(kind: impl Into<String>, key: impl Into<String>, order: i32) -> Self {
        CellRoute::Component {
            component: ComponentType::new(kind, key),
            order,
        }
    }

    pub fn order(&self) -> i32 {
        match self {
            CellRoute::Component { order, .. } | CellRoute::Custom { order, .. } => *order,
        }
    }
}

impl InsertionRoute {
    pub fn custom<F>(function: F, order: i32) -> Self
    where
        F: CustomInsertion + 'static,
    {
        CellRoute::Custom {
            function: Arc::new(function),
            order,
        }
    }
}

impl FilterRoute {
    pub fn custom<F>(function: F, order: i32) -> Self
    where
        F: CustomFilter + 'static,
    {
        CellRoute::Custom {
            function: Arc::new(function),
            order,
        }
    }
}

impl<F: ?Sized> Clone for CellRoute<F> {
    fn clone(&self) -> Self {
        match self {
            CellRoute::Component { component, order } => CellRoute::Component {
                component: component.clone(),
                order: *order,
            },
            CellRoute::Custom { function, order } => CellRoute::Custom {
                function: Arc::clone(function),
                order: *order,
            },
        }
    }
}

impl<F: ?Sized> fmt::Debug for CellRoute<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellRoute::Component { component, order } => f
                .debug_struct("Component")
                .field("component", component)
                .field("order", order)
                .finish(),
            CellRoute::Custom { order, .. } => {
                f.debug_struct("Custom").field("order", order).finish()
            }
        }
    }
}

// Custom functions cannot be compared, so two custom routes are equal when
// their orders match.
impl<F: ?Sized> PartialEq for CellRoute<F> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                CellRoute::Component { component, order },
                CellRoute::Component {
                    component: other_component,
                    order: other_order,
                },
            ) => component == other_component && order == other_order,
            (CellRoute::Custom { order, .. }, CellRoute::Custom { order: other_order, .. }) => {
                order == other_order
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_insert(_cell: &ElementRef, _values: &[String]) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn route_order() {
        let route = InsertionRoute::component("input", "md-input", 3);
        assert_eq!(route.order(), 3);
        let custom = InsertionRoute::custom(noop_insert, -1);
        assert_eq!(custom.order(), -1);
    }

    #[test]
    fn component_display() {
        assert_eq!(ComponentType::new("select", "native").to_string(), "select:native");
    }

    #[test]
    fn debug_hides_function() {
        let custom = FilterRoute::custom(
            |_: &ElementRef, _: FilterStrategy, _: &[String]| -> anyhow::Result<()> { Ok(()) },
            2,
        );
        assert_eq!(format!("{:?}", custom), "Custom { order: 2 }");
    }

    #[test]
    fn routes_compare_variant_and_component() {
        let input = InsertionRoute::component("input", "text", 1);
        assert_eq!(input, InsertionRoute::component("input", "text", 1));
        assert_ne!(input, InsertionRoute::component("input", "postal", 1));
        assert_ne!(input, InsertionRoute::component("select", "text", 1));
        assert_ne!(input, InsertionRoute::custom(noop_insert, 1));
        assert_eq!(
            InsertionRoute::custom(noop_insert, 1),
            InsertionRoute::custom(noop_insert, 1)
        );
    }
}
