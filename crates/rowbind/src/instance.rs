//! Row construction and merging of partial rows.

use tracing::warn;

use crate::schema::{TableRow, TableSchema};

/// Creates an empty row: every bound field unset.
pub fn create_instance<R: TableRow>() -> R {
    R::default()
}

/// Combines two partially-populated rows.
///
/// Returns `b` when `a` is absent and `a` when `b` is absent. When both are
/// present, every bound field unset in `a` takes `b`'s value; fields already
/// set in `a` are kept. A field that cannot be copied is skipped with a
/// warning and the merge carries on.
pub fn merge_objects<R>(schema: &TableSchema<R>, a: Option<R>, b: Option<R>) -> Option<R> {
    let (mut merged, other) = match (a, b) {
        (None, b) => return b,
        (a, None) => return a,
        (Some(a), Some(b)) => (a, b),
    };

    for binding in schema.bindings() {
        if binding.get(&merged).is_some() {
            continue;
        }
        let Some(value) = binding.get(&other) else {
            continue;
        };
        if let Err(err) = binding.set(&mut merged, value) {
            warn!("Skipping field '{}' during merge: {}", binding.name(), err);
        }
    }

    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CellSlot, TableCell};
    use crate::element::Locator;
    use crate::error::Result;
    use crate::schema::{FieldBinding, TableDescriptor, TableField};
    use proptest::prelude::*;

    #[derive(Default, Clone, Debug, PartialEq)]
    struct Contact {
        name: Option<TableCell>,
        phones: Option<Vec<TableCell>>,
    }

    impl Contact {
        const NAME: TableField<Contact> =
            TableField::new("name", |r, f, v| r.name.write_slot(f, v));
        const PHONES: TableField<Contact> =
            TableField::new("phones", |r, f, v| r.phones.write_slot(f, v));
    }

    impl TableRow for Contact {
        fn table_schema() -> Result<TableSchema<Self>> {
            TableSchema::builder(TableDescriptor::new(
                Locator::id("contacts"),
                Locator::css("tr"),
                Locator::css("thead tr"),
            ))
            .field(FieldBinding::new(Contact::NAME, |c: &Contact| &c.name))
            .field(FieldBinding::new(Contact::PHONES, |c: &Contact| &c.phones))
            .build()
        }
    }

    fn named(name: &str) -> Contact {
        Contact {
            name: Some(name.into()),
            phones: None,
        }
    }

    #[test]
    fn create_instance_is_empty() {
        let contact: Contact = create_instance();
        assert_eq!(contact, Contact::default());
    }

    #[test]
    fn merge_absent_sides() {
        let schema = Contact::table_schema().unwrap();
        assert_eq!(merge_objects::<Contact>(&schema, None, None), None);
        assert_eq!(
            merge_objects(&schema, None, Some(named("b"))),
            Some(named("b"))
        );
        assert_eq!(
            merge_objects(&schema, Some(named("a")), None),
            Some(named("a"))
        );
    }

    #[test]
    fn merge_fills_unset_fields_from_b() {
        let schema = Contact::table_schema().unwrap();
        let a = Contact::default();
        let b = named("x");
        let merged = merge_objects(&schema, Some(a), Some(b)).unwrap();
        assert_eq!(merged.name.unwrap().text(), "x");
    }

    #[test]
    fn merge_keeps_set_fields_of_a() {
        let schema = Contact::table_schema().unwrap();
        let a = named("y");
        let b = Contact {
            name: Some("x".into()),
            phones: Some(vec!["555".into()]),
        };
        let merged = merge_objects(&schema, Some(a), Some(b)).unwrap();
        assert_eq!(merged.name.unwrap().text(), "y");
        assert_eq!(merged.phones.unwrap().len(), 1);
    }

    proptest! {
        #[test]
        fn merge_prefers_first_non_null(a in proptest::option::of("[a-z]{1,5}"), b in proptest::option::of("[a-z]{1,5}")) {
            let schema = Contact::table_schema().unwrap();
            let left = Contact { name: a.clone().map(TableCell::from), phones: None };
            let right = Contact { name: b.clone().map(TableCell::from), phones: None };
            let merged = merge_objects(&schema, Some(left), Some(right)).unwrap();
            let expected = a.or(b);
            prop_assert_eq!(merged.name.map(|c| c.text().to_string()), expected);
        }
    }
}
