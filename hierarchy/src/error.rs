//! Error types for the campus hierarchy.

use thiserror::Error;

use crate::entity::EntityKind;
use crate::format::TableFormat;

/// Result type alias for hierarchy operations.
pub type Result<T> = std::result::Result<T, HierarchyError>;

/// Errors that can occur while importing, exporting or looking up campus data.
///
/// Dangling parent references are not errors: the importer recovers them
/// and records them in the [`ImportReport`](crate::import::ImportReport).
#[derive(Error, Debug)]
pub enum HierarchyError {
    /// Neither the simple nor the standard column set is present.
    #[error(
        "table format not recognized: expected either simple columns [{}] or standard columns [{}]",
        .simple.join(", "),
        .standard.join(", ")
    )]
    FormatUnrecognized {
        simple: Vec<String>,
        standard: Vec<String>,
    },

    /// A format was detected but some of its required columns are absent.
    #[error("missing required {format} columns: {}", .columns.join(", "))]
    MissingColumns {
        format: TableFormat,
        columns: Vec<String>,
    },

    /// An identifier that must be unique appears more than once.
    #[error("duplicate {column} values found: {}", .values.join(", "))]
    DuplicateKey { column: String, values: Vec<String> },

    /// A required identifier cell is empty.
    #[error("row {row}: required field '{column}' is empty")]
    MissingField { row: usize, column: String },

    /// A mandatory cell could not be parsed.
    #[error("row {row}: invalid value '{value}' in column '{column}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    /// Explicit lookup of an entity that is not in the store.
    #[error("{kind} not found: {id}")]
    EntityNotFound { kind: EntityKind, id: String },

    /// CSV reading or writing failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}
