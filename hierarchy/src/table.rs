//! Materialized tabular data.
//!
//! A `Table` is the boundary format of the hierarchy: importers consume
//! one and exporters produce one. Reading and writing CSV is provided for
//! collaborators that work with files, but nothing in the importer touches
//! the filesystem.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};
use tracing::debug;

use crate::error::{HierarchyError, Result};

/// A table of string cells with named columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing trailing cells read as empty.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// Builder-style variant of [`Table::push_row`].
    pub fn with_row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_row(cells);
        self
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Columns from `required` that this table lacks, in the given order.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| (*c).to_string())
            .collect()
    }

    /// Iterate over the data rows.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().enumerate().map(move |(index, cells)| Row {
            table: self,
            index,
            cells,
        })
    }

    /// Read a table from CSV with a header line. Cells are trimmed.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.iter().map(str::to_string).collect();
        let mut table = Table {
            headers,
            rows: Vec::new(),
        };
        for record in rdr.records() {
            let record = record?;
            table.rows.push(record.iter().map(str::to_string).collect());
        }

        debug!(
            "Read table with {} columns and {} rows",
            table.headers.len(),
            table.rows.len()
        );
        Ok(table)
    }

    pub fn from_csv_str(csv: &str) -> Result<Self> {
        Self::from_reader(csv.as_bytes())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Write the table as CSV, header line first.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().flexible(true).from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf)
            .map_err(|e| HierarchyError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    pub fn write_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.write_csv(file)
    }
}

/// A borrowed view of one data row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// 1-based position of the row among the data rows.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Raw cell value, trimmed. `None` when the column does not exist.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.table.column_index(column)?;
        Some(self.cells.get(idx).map_or("", |c| c.trim()))
    }

    /// Cell value, or `None` when the column is absent or the cell is blank.
    pub fn text(&self, column: &str) -> Option<&'a str> {
        self.get(column).filter(|v| !v.is_empty())
    }

    /// Required identifier cell.
    pub fn require(&self, column: &str) -> Result<&'a str> {
        self.text(column).ok_or_else(|| HierarchyError::MissingField {
            row: self.number(),
            column: column.to_string(),
        })
    }

    /// Cell parsed as a finite number, `None` when absent, blank or non-numeric.
    pub fn number_or_none(&self, column: &str) -> Option<f64> {
        self.text(column)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    /// Mandatory numeric cell.
    pub fn require_number(&self, column: &str) -> Result<f64> {
        let raw = self.require(column)?;
        self.number_or_none(column)
            .ok_or_else(|| self.invalid(column, raw))
    }

    /// Mandatory non-negative integer cell. Integral floats such as `40.0`
    /// are accepted.
    pub fn require_count(&self, column: &str) -> Result<u32> {
        let raw = self.require(column)?;
        if let Ok(value) = raw.parse::<u32>() {
            return Ok(value);
        }
        match raw.parse::<f64>() {
            Ok(v) if v.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&v) => Ok(v as u32),
            _ => Err(self.invalid(column, raw)),
        }
    }

    fn invalid(&self, column: &str, value: &str) -> HierarchyError {
        HierarchyError::InvalidValue {
            row: self.number(),
            column: column.to_string(),
            value: value.to_string(),
        }
    }
}
