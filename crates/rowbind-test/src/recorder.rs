//! Services that record what the engine asked them to do.

use std::sync::{Arc, Mutex, PoisonError};

use rowbind::{
    ComponentFilter, ComponentInsertion, ComponentType, CustomFilter, CustomInsertion,
    ElementRef, FilterStrategy, HeaderSorter, SortingStrategy,
};

/// One call received by a recording service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Insert {
        cell: String,
        component: Option<ComponentType>,
        values: Vec<String>,
    },
    Filter {
        cell: String,
        component: Option<ComponentType>,
        strategy: FilterStrategy,
        values: Vec<String>,
    },
    Sort {
        cell: String,
        strategy: SortingStrategy,
    },
}

impl Recorded {
    /// The label of the cell the call acted on.
    pub fn cell(&self) -> &str {
        match self {
            Recorded::Insert { cell, .. }
            | Recorded::Filter { cell, .. }
            | Recorded::Sort { cell, .. } => cell,
        }
    }
}

/// A shared call log with service handles writing into it.
///
/// Cells are labelled by their `id` attribute, falling back to their text.
///
/// ```
/// use rowbind::ServiceRegistry;
/// use rowbind_test::Recorder;
///
/// let recorder = Recorder::new();
/// let registry = ServiceRegistry::new()
///     .with_insertion_service("input", recorder.service())
///     .with_filter_service("select", recorder.service());
/// assert!(recorder.calls().is_empty());
/// # let _ = registry;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Recorded>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call recorded so far, oldest first.
    pub fn calls(&self) -> Vec<Recorded> {
        self.log().clone()
    }

    pub fn clear(&self) {
        self.log().clear();
    }

    /// A handle that records into this log; fits any service or sorter slot.
    pub fn service(&self) -> RecordingService {
        RecordingService(self.clone())
    }

    fn push(&self, call: Recorded) {
        self.log().push(call);
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Vec<Recorded>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A service handle that appends every call to its [`Recorder`].
///
/// Implements every service trait, so one handle fits any slot.
#[derive(Debug, Clone)]
pub struct RecordingService(Recorder);

fn label(cell: &ElementRef) -> String {
    cell.attribute("id").unwrap_or_else(|| cell.text())
}

impl ComponentInsertion for RecordingService {
    fn insert(
        &self,
        cell: &ElementRef,
        component: &ComponentType,
        values: &[String],
    ) -> anyhow::Result<()> {
        self.0.push(Recorded::Insert {
            cell: label(cell),
            component: Some(component.clone()),
            values: values.to_vec(),
        });
        Ok(())
    }
}

impl ComponentFilter for RecordingService {
    fn filter(
        &self,
        cell: &ElementRef,
        component: &ComponentType,
        strategy: FilterStrategy,
        values: &[String],
    ) -> anyhow::Result<()> {
        self.0.push(Recorded::Filter {
            cell: label(cell),
            component: Some(component.clone()),
            strategy,
            values: values.to_vec(),
        });
        Ok(())
    }
}

impl CustomInsertion for RecordingService {
    fn insert(&self, cell: &ElementRef, values: &[String]) -> anyhow::Result<()> {
        self.0.push(Recorded::Insert {
            cell: label(cell),
            component: None,
            values: values.to_vec(),
        });
        Ok(())
    }
}

impl CustomFilter for RecordingService {
    fn filter(
        &self,
        cell: &ElementRef,
        strategy: FilterStrategy,
        values: &[String],
    ) -> anyhow::Result<()> {
        self.0.push(Recorded::Filter {
            cell: label(cell),
            component: None,
            strategy,
            values: values.to_vec(),
        });
        Ok(())
    }
}

impl HeaderSorter for RecordingService {
    fn sort(&self, header_cell: &ElementRef, strategy: SortingStrategy) -> anyhow::Result<()> {
        self.0.push(Recorded::Sort {
            cell: label(header_cell),
            strategy,
        });
        Ok(())
    }
}
