//! Table format detection and structural validation.
//!
//! Two layouts are supported:
//!
//! - **standard**: one row per room, with the department, building and
//!   floor of the room repeated on every row;
//! - **simple**: one row per entity, self-typed through a `type` column,
//!   with a single `building_id` column that names the parent of whatever
//!   kind the row's type expects.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HierarchyError, Result};
use crate::table::Table;

/// Required columns of the standard (wide) format.
pub const STANDARD_COLUMNS: &[&str] = &[
    "department_id",
    "department_name",
    "building_id",
    "building_name",
    "floor_id",
    "floor_name",
    "room_id",
    "room_name",
    "room_type",
    "capacity",
    "x_coordinate",
    "y_coordinate",
];

/// Optional columns of the standard format.
pub const STANDARD_OPTIONAL_COLUMNS: &[&str] = &[
    "department_description",
    "building_description",
    "floor_description",
    "room_description",
    "room_facilities",
    "accessibility",
];

/// Required columns of the simple (flat) format.
pub const SIMPLE_COLUMNS: &[&str] = &["type", "id", "name", "building_id", "description", "x", "y"];

/// Supported tabular layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    Standard,
    Simple,
}

impl TableFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            TableFormat::Standard => "standard",
            TableFormat::Simple => "simple",
        }
    }

    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            TableFormat::Standard => STANDARD_COLUMNS,
            TableFormat::Simple => SIMPLE_COLUMNS,
        }
    }

    /// Full header written on export.
    pub fn export_columns(self) -> Vec<&'static str> {
        match self {
            TableFormat::Standard => STANDARD_COLUMNS
                .iter()
                .chain(STANDARD_OPTIONAL_COLUMNS)
                .copied()
                .collect(),
            TableFormat::Simple => SIMPLE_COLUMNS.to_vec(),
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "wide" => Ok(TableFormat::Standard),
            "simple" | "flat" => Ok(TableFormat::Simple),
            other => Err(format!("unknown table format: {other}")),
        }
    }
}

/// Classify a table by its columns. The simple layout is checked first.
pub fn detect(table: &Table) -> Result<TableFormat> {
    if table.missing_columns(SIMPLE_COLUMNS).is_empty() {
        Ok(TableFormat::Simple)
    } else if table.missing_columns(STANDARD_COLUMNS).is_empty() {
        Ok(TableFormat::Standard)
    } else {
        Err(HierarchyError::FormatUnrecognized {
            simple: owned_list(SIMPLE_COLUMNS),
            standard: owned_list(STANDARD_COLUMNS),
        })
    }
}

/// Detect the format and check the table's structural integrity.
///
/// Fails with `DuplicateKey` when an identifier that must be unique
/// within its kind is used twice:
///
/// - standard: `room_id` must be unique per row; a `building_id` or
///   `floor_id` repeated under a different parent names two distinct
///   entities sharing one ID. Ancestor IDs repeated under the same parent
///   are the normal shape of the format.
/// - simple: `id` is unique across all rows, whatever their type.
pub fn validate(table: &Table) -> Result<TableFormat> {
    let format = detect(table)?;

    let missing = table.missing_columns(format.required_columns());
    if !missing.is_empty() {
        return Err(HierarchyError::MissingColumns {
            format,
            columns: missing,
        });
    }

    match format {
        TableFormat::Standard => {
            check_unique(table, "room_id")?;
            check_single_parent(table, "building_id", "department_id")?;
            check_single_parent(table, "floor_id", "building_id")?;
        }
        TableFormat::Simple => check_unique(table, "id")?,
    }

    Ok(format)
}

fn check_unique(table: &Table, column: &str) -> Result<()> {
    let mut seen = HashSet::new();
    let mut dupes = Vec::new();
    for value in table.rows().filter_map(|row| row.text(column)) {
        if !seen.insert(value) && !dupes.contains(&value) {
            dupes.push(value);
        }
    }
    duplicate_error(column, dupes)
}

fn check_single_parent(table: &Table, column: &str, parent_column: &str) -> Result<()> {
    let mut parents: HashMap<&str, &str> = HashMap::new();
    let mut dupes = Vec::new();
    for row in table.rows() {
        let Some(id) = row.text(column) else {
            continue;
        };
        let parent = row.get(parent_column).unwrap_or_default();
        let first = *parents.entry(id).or_insert(parent);
        if first != parent && !dupes.contains(&id) {
            dupes.push(id);
        }
    }
    duplicate_error(column, dupes)
}

fn duplicate_error(column: &str, dupes: Vec<&str>) -> Result<()> {
    if dupes.is_empty() {
        return Ok(());
    }
    Err(HierarchyError::DuplicateKey {
        column: column.to_string(),
        values: owned_list(&dupes),
    })
}

fn owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}
