//! Integration tests for filtering and sorting through header cells.

use std::sync::Mutex;

use rowbind::{
    ComponentType, ElementRef, FilterStrategy, ServiceRegistry, SortingStrategy, TableCell,
    TableEngine, TableError, TableRow,
};
use rowbind_test::{text_table, MockElement, Recorded, Recorder};

static COUNTRY_FILTERS: Mutex<Vec<(String, FilterStrategy, Vec<String>)>> = Mutex::new(Vec::new());

fn filter_country(
    header: &ElementRef,
    strategy: FilterStrategy,
    values: &[String],
) -> anyhow::Result<()> {
    COUNTRY_FILTERS
        .lock()
        .unwrap()
        .push((header.text(), strategy, values.to_vec()));
    Ok(())
}

#[derive(TableRow, Default, Clone, Debug)]
#[table(container = "id=people", rows = "tbody tr", header_row = "thead tr")]
struct Person {
    #[cell(locator = "td.city", header = "th.city")]
    #[filter(component = "text-filter", key = "contains")]
    city: Option<TableCell>,

    #[cell(locator = "td.country", header = "th.country")]
    #[filter(custom = filter_country)]
    country: Option<TableCell>,

    #[cell(locator = "td.age", header = "th.age")]
    age: Option<TableCell>,

    #[cell(locator = "td.email")]
    #[filter(component = "text-filter")]
    email: Option<TableCell>,

    #[cell(locator = "td.phone", header = "th.phone")]
    #[filter(component = "text-filter")]
    phone: Option<TableCell>,
}

fn people_page() -> ElementRef {
    MockElement::new("body")
        .child(text_table(
            "people",
            &["city", "country", "age", "email"],
            &[&["Utrecht", "NL", "41", "a@example.com"]],
        ))
        .into_ref()
}

fn engine_with(recorder: &Recorder) -> TableEngine {
    TableEngine::builder(people_page())
        .registry(ServiceRegistry::new().with_filter_service("text-filter", recorder.service()))
        .sorter(recorder.service())
        .build()
}

// =============================================================================
// Filtering
// =============================================================================

#[test]
fn filter_dispatches_to_registered_service_with_header_cell() {
    let recorder = Recorder::new();
    engine_with(&recorder)
        .filter_table(Person::CITY, FilterStrategy::Select, &["Utrecht", "Delft"])
        .unwrap();

    assert_eq!(
        recorder.calls(),
        vec![Recorded::Filter {
            cell: "city".to_string(),
            component: Some(ComponentType::new("text-filter", "contains")),
            strategy: FilterStrategy::Select,
            values: vec!["Utrecht".to_string(), "Delft".to_string()],
        }]
    );
}

#[test]
fn filter_passes_unselect_strategy() {
    let recorder = Recorder::new();
    engine_with(&recorder)
        .filter_table(Person::CITY, FilterStrategy::Unselect, &["Delft"])
        .unwrap();
    assert!(matches!(
        recorder.calls()[0],
        Recorded::Filter {
            strategy: FilterStrategy::Unselect,
            ..
        }
    ));
}

#[test]
fn filter_custom_function_bypasses_registry() {
    let engine = TableEngine::new(people_page());
    engine
        .filter_table(Person::COUNTRY, FilterStrategy::Select, &["NL"])
        .unwrap();

    let calls = COUNTRY_FILTERS.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![(
            "country".to_string(),
            FilterStrategy::Select,
            vec!["NL".to_string()]
        )]
    );
}

#[test]
fn filter_without_method_names_the_field() {
    let recorder = Recorder::new();
    let err = engine_with(&recorder)
        .filter_table(Person::AGE, FilterStrategy::Select, &["41"])
        .unwrap_err();
    assert!(matches!(err, TableError::Configuration(_)));
    assert!(err
        .to_string()
        .contains("No table cell filter method provided for field: age"));
}

#[test]
fn filter_without_registry_is_unavailable() {
    let err = TableEngine::new(people_page())
        .filter_table(Person::CITY, FilterStrategy::Select, &["x"])
        .unwrap_err();
    assert!(matches!(
        err,
        TableError::RegistryUnavailable {
            operation: "filter",
            ..
        }
    ));
}

#[test]
fn filter_with_unregistered_component_is_lookup_error() {
    let engine = TableEngine::builder(people_page())
        .registry(ServiceRegistry::new())
        .build();
    let err = engine
        .filter_table(Person::CITY, FilterStrategy::Select, &["x"])
        .unwrap_err();
    assert!(err.to_string().contains("Failed to filter using component"));
}

#[test]
fn filter_field_without_header_locator_is_configuration_error() {
    let recorder = Recorder::new();
    let err = engine_with(&recorder)
        .filter_table(Person::EMAIL, FilterStrategy::Select, &["x"])
        .unwrap_err();
    assert!(matches!(err, TableError::Configuration(_)));
    assert!(err.to_string().contains("no header cell locator"));
}

#[test]
fn filter_missing_header_cell_is_not_found() {
    let recorder = Recorder::new();
    let err = engine_with(&recorder)
        .filter_table(Person::PHONE, FilterStrategy::Select, &["x"])
        .unwrap_err();
    assert!(matches!(err, TableError::NotFound(_)));
    assert!(recorder.calls().is_empty());
}

// =============================================================================
// Sorting
// =============================================================================

#[test]
fn sort_delegates_header_cell_to_sorter() {
    let recorder = Recorder::new();
    engine_with(&recorder)
        .sort_table(Person::AGE, SortingStrategy::Descending)
        .unwrap();
    assert_eq!(
        recorder.calls(),
        vec![Recorded::Sort {
            cell: "age".to_string(),
            strategy: SortingStrategy::Descending,
        }]
    );
}

#[test]
fn sort_without_sorter_is_not_configured() {
    let err = TableEngine::new(people_page())
        .sort_table(Person::AGE, SortingStrategy::Ascending)
        .unwrap_err();
    assert!(matches!(err, TableError::SorterNotConfigured(ref f) if f == "age"));
}

#[test]
fn sorter_failure_is_wrapped() {
    let engine = TableEngine::builder(people_page())
        .sorter(
            |_: &ElementRef, _: SortingStrategy| -> anyhow::Result<()> {
                anyhow::bail!("header is not sortable")
            },
        )
        .build();
    let err = engine
        .sort_table(Person::CITY, SortingStrategy::Ascending)
        .unwrap_err();
    assert!(matches!(err, TableError::CellOperation { .. }));
    assert!(err.to_string().contains("header is not sortable"));
}
