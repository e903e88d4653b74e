//! CSV-backed table used by the finalizer and for rendering the ledger.

use anyhow::{Context, Result};
use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

pub const TEXT_COLUMN: &str = "Task";
pub const LENGTH_COLUMN: &str = "Task_Length";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DatasetError {
    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("row {row}: '{value}' is not a valid {column} value")]
    InvalidLength {
        row: usize,
        column: String,
        value: String,
    },
}

/// One row. `index` is the row's position in the dataset it was first
/// loaded or built into, and survives filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub index: usize,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// An empty dataset with the given header.
    pub fn with_columns<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; the index is its position. Short rows are padded with
    /// empty cells.
    pub fn push_row(&mut self, mut cells: Vec<String>) {
        cells.resize(self.columns.len(), String::new());
        let index = self.rows.len();
        self.rows.push(Row { index, cells });
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r.cells[idx].as_str()).collect())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers().context("Failed to read CSV header")?.clone();
        let mut dataset = Self::with_columns(headers.iter());
        for (i, record) in rdr.records().enumerate() {
            let record = record.with_context(|| format!("Failed to read CSV row {}", i + 1))?;
            dataset.push_row(record.iter().map(str::to_string).collect());
        }
        Ok(dataset)
    }

    /// Read a CSV file. `Ok(None)` when the file does not exist; every other
    /// failure is an error.
    pub fn load_csv(path: &Path) -> Result<Option<Self>> {
        let file = match std::fs::File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to open {}", path.display()))
            }
        };
        let dataset = Self::from_reader(file)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::debug!(path = %path.display(), rows = dataset.len(), "csv loaded");
        Ok(Some(dataset))
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        if !self.columns.is_empty() {
            wtr.write_record(&self.columns)?;
            for row in &self.rows {
                wtr.write_record(&row.cells)?;
            }
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write header and rows, replacing any existing file.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        self.to_writer(file)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Set `Task_Length` to the character count of `Task` on every row,
    /// adding the column if needed.
    pub fn annotate_lengths(&mut self) -> Result<(), DatasetError> {
        let text_idx = self
            .column_index(TEXT_COLUMN)
            .ok_or_else(|| DatasetError::MissingColumn(TEXT_COLUMN.to_string()))?;
        let len_idx = match self.column_index(LENGTH_COLUMN) {
            Some(i) => i,
            None => {
                self.columns.push(LENGTH_COLUMN.to_string());
                for row in &mut self.rows {
                    row.cells.push(String::new());
                }
                self.columns.len() - 1
            }
        };
        for row in &mut self.rows {
            row.cells[len_idx] = row.cells[text_idx].chars().count().to_string();
        }
        Ok(())
    }

    /// Rows whose `Task_Length` is strictly greater than `threshold`.
    /// Blank cells never pass; non-numeric cells are an error.
    pub fn filter_by_length(&self, threshold: usize) -> Result<Self, DatasetError> {
        let len_idx = self
            .column_index(LENGTH_COLUMN)
            .ok_or_else(|| DatasetError::MissingColumn(LENGTH_COLUMN.to_string()))?;

        let mut rows = Vec::new();
        for row in &self.rows {
            let raw = row.cells[len_idx].trim();
            if raw.is_empty() {
                continue;
            }
            let value: f64 = raw.parse().map_err(|_| DatasetError::InvalidLength {
                row: row.index,
                column: LENGTH_COLUMN.to_string(),
                value: raw.to_string(),
            })?;
            if value > threshold as f64 {
                rows.push(row.clone());
            }
        }

        Ok(Self {
            columns: self.columns.clone(),
            rows,
        })
    }
}

/// Right-aligned columns with the row index on the left; empty tables list
/// their header instead.
impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            writeln!(f, "Empty DataFrame")?;
            writeln!(f, "Columns: [{}]", self.columns.join(", "))?;
            return write!(f, "Index: []");
        }

        let index_labels: Vec<String> = self.rows.iter().map(|r| r.index.to_string()).collect();
        let index_width = index_labels.iter().map(|s| s.len()).max().unwrap_or(0);

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                self.rows
                    .iter()
                    .map(|r| r.cells[i].chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:index_width$}", "")?;
        for (name, width) in self.columns.iter().zip(widths.iter().copied()) {
            write!(f, "  {:>width$}", name)?;
        }

        for (row, label) in self.rows.iter().zip(&index_labels) {
            writeln!(f)?;
            write!(f, "{:<index_width$}", label)?;
            for (cell, width) in row.cells.iter().zip(widths.iter().copied()) {
                write!(f, "  {:>width$}", cell)?;
            }
        }
        Ok(())
    }
}
