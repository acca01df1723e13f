//! Error types for the table engine.

use thiserror::Error;

/// Errors raised while binding, reading or writing a table.
#[derive(Debug, Error)]
pub enum TableError {
    /// The row type's table or field metadata is missing or inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A row, table container or cell could not be found.
    #[error("{0}")]
    NotFound(String),

    /// A 1-based row or cell index fell outside the available range.
    #[error("{0}")]
    IndexRange(String),

    /// A value of the wrong shape was written into a row field.
    #[error("type mismatch for field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A registry-routed operation ran on an engine without a registry.
    #[error("service registry is not configured; cannot {operation} field '{field}'")]
    RegistryUnavailable {
        operation: &'static str,
        field: String,
    },

    /// The registry holds no service for the requested component type.
    #[error("{message}: no service registered for component '{kind}' (key '{key}')")]
    RegistryLookup {
        message: &'static str,
        kind: String,
        key: String,
    },

    /// `sort_table` was called on an engine without a header sorter.
    #[error("no header sorter configured; cannot sort by field '{0}'")]
    SorterNotConfigured(String),

    /// A service, custom function or sorter reported a failure.
    #[error("cell operation failed for field '{field}': {source}")]
    CellOperation {
        field: String,
        #[source]
        source: anyhow::Error,
    },

    /// An externalized table descriptor could not be parsed.
    #[error("invalid table descriptor: {0}")]
    Descriptor(String),
}

impl TableError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Wrap a failure reported by user-supplied cell logic.
    pub fn cell_operation(field: impl Into<String>, source: anyhow::Error) -> Self {
        Self::CellOperation {
            field: field.into(),
            source,
        }
    }
}

impl From<serde_yaml::Error> for TableError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Descriptor(err.to_string())
    }
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        Self::Descriptor(err.to_string())
    }
}

/// Result type for table engine operations.
pub type Result<T> = std::result::Result<T, TableError>;
