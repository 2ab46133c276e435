//! Tabular sheet abstraction.
//!
//! The enrichment loop reads URLs from and writes metadata back to a table
//! through the [`SheetTable`] trait, so the row logic never knows whether it
//! is talking to a local CSV file or something fancier. Cells are addressed
//! 1-based, the way sheet users count.
//!
//! # Example
//!
//! ```rust,ignore
//! use channelsheet_core::sheet::{CsvSheet, SheetTable};
//!
//! let mut sheet = CsvSheet::open("channels.csv")?;
//! let url = sheet.cell(2, 2)?;
//! sheet.update_cell(2, 3, "Description goes here")?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result, SheetError};

/// Converts a failure during sheet reading.
fn read_error(path: &Path, e: impl fmt::Display) -> Error {
    Error::Sheet(SheetError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Converts a failure during sheet writing.
fn write_error(path: &Path, e: impl fmt::Display) -> Error {
    Error::Sheet(SheetError::Write {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Abstraction over a writable table of text cells.
///
/// Rows and columns are 1-based. A cell that is absent or holds only
/// whitespace reads as `None`; otherwise the raw cell text is returned,
/// untrimmed.
pub trait SheetTable {
    /// Highest populated 1-based row index; 0 for an empty table.
    fn last_row(&self) -> usize;

    /// Read one cell. `None` for blank, whitespace-only, or absent cells.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero row or column, or if the backend fails.
    fn cell(&self, row: usize, column: usize) -> Result<Option<String>>;

    /// Write one cell, growing the table as needed.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero row or column, or if the backend fails.
    fn update_cell(&mut self, row: usize, column: usize, value: &str) -> Result<()>;
}

fn check_address(row: usize, column: usize) -> Result<()> {
    if row == 0 || column == 0 {
        return Err(Error::Sheet(SheetError::InvalidAddress { row, column }));
    }
    Ok(())
}

/// CSV-file-backed [`SheetTable`].
///
/// The whole file is held in memory; every `update_cell` rewrites the file,
/// mirroring the per-cell remote writes of a hosted sheet. A crash mid-run
/// therefore loses at most the row being worked on, which matters for a job
/// that spends hours sleeping between rows.
#[derive(Debug)]
pub struct CsvSheet {
    path: PathBuf,
    rows: Vec<Vec<String>>,
}

impl CsvSheet {
    /// Load a CSV file. Ragged rows are accepted as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| read_error(&path, e))?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| read_error(&path, e))?;
            rows.push(record.iter().map(ToString::to_string).collect());
        }

        Ok(Self { path, rows })
    }

    /// The file this sheet reads from and writes to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| write_error(&self.path, e))?;

        for row in &self.rows {
            // The csv writer rejects zero-field records.
            if row.is_empty() {
                writer
                    .write_record([""])
                    .map_err(|e| write_error(&self.path, e))?;
            } else {
                writer
                    .write_record(row)
                    .map_err(|e| write_error(&self.path, e))?;
            }
        }

        writer.flush().map_err(|e| write_error(&self.path, e))?;
        Ok(())
    }
}

impl SheetTable for CsvSheet {
    fn last_row(&self) -> usize {
        self.rows.len()
    }

    fn cell(&self, row: usize, column: usize) -> Result<Option<String>> {
        check_address(row, column)?;

        let value = self
            .rows
            .get(row - 1)
            .and_then(|cells| cells.get(column - 1));

        Ok(match value {
            Some(text) if !text.trim().is_empty() => Some(text.clone()),
            _ => None,
        })
    }

    fn update_cell(&mut self, row: usize, column: usize, value: &str) -> Result<()> {
        check_address(row, column)?;

        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < column {
            cells.resize_with(column, String::new);
        }
        cells[column - 1] = value.to_string();

        self.flush()
    }
}
