//! Service registry for component-routed cell operations.
//!
//! Fields whose insertion or filter route is [`CellRoute::Component`] are
//! dispatched to the service registered for the component's `kind`. The
//! registry is filled once during setup and shared read-only by the engine.
//!
//! ```
//! use rowbind::{ComponentType, ElementRef, ServiceRegistry};
//!
//! let mut registry = ServiceRegistry::new();
//! registry.register_insertion_service(
//!     "input",
//!     |_cell: &ElementRef, _c: &ComponentType, _values: &[String]| -> anyhow::Result<()> { Ok(()) },
//! );
//! assert!(registry.insertion_service("input").is_some());
//! assert!(registry.insertion_service("select").is_none());
//! ```
//!
//! [`CellRoute::Component`]: crate::CellRoute::Component

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::strategy::{ComponentFilter, ComponentInsertion};

/// Maps component kinds to insertion and filter services.
///
/// Registering a kind twice replaces the earlier service.
#[derive(Default, Clone)]
pub struct ServiceRegistry {
    insertion: HashMap<String, Arc<dyn ComponentInsertion>>,
    filter: HashMap<String, Arc<dyn ComponentFilter>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_insertion_service<S>(&mut self, kind: impl Into<String>, service: S)
    where
        S: ComponentInsertion + 'static,
    {
        self.insertion.insert(kind.into(), Arc::new(service));
    }

    pub fn register_filter_service<S>(&mut self, kind: impl Into<String>, service: S)
    where
        S: ComponentFilter + 'static,
    {
        self.filter.insert(kind.into(), Arc::new(service));
    }

    /// Builder form of [`register_insertion_service`](Self::register_insertion_service).
    pub fn with_insertion_service<S>(mut self, kind: impl Into<String>, service: S) -> Self
    where
        S: ComponentInsertion + 'static,
    {
        self.register_insertion_service(kind, service);
        self
    }

    /// Builder form of [`register_filter_service`](Self::register_filter_service).
    pub fn with_filter_service<S>(mut self, kind: impl Into<String>, service: S) -> Self
    where
        S: ComponentFilter + 'static,
    {
        self.register_filter_service(kind, service);
        self
    }

    pub fn insertion_service(&self, kind: &str) -> Option<&Arc<dyn ComponentInsertion>> {
        self.insertion.get(kind)
    }

    pub fn filter_service(&self, kind: &str) -> Option<&Arc<dyn ComponentFilter>> {
        self.filter.get(kind)
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut insertion: Vec<_> = self.insertion.keys().collect();
        let mut filter: Vec<_> = self.filter.keys().collect();
        insertion.sort();
        filter.sort();
        f.debug_struct("ServiceRegistry")
            .field("insertion", &insertion)
            .field("filter", &filter)
            .finish()
    }
}
