//! Record sources.
//!
//! A source is a spreadsheet file on disk. Spreadsheet workbooks are read
//! with `calamine`, delimited text with `csv`. A missing file is an expected
//! condition and falls back to the built-in sample table; a file that exists
//! but cannot be read is an error.

mod csv_file;
mod sample;
mod spreadsheet;

pub use csv_file::write_csv;
pub use sample::sample_table;

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

use crate::models::{RecordTable, normalize_field_name};
use crate::{Error, Result};

/// File formats a source can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Excel / OpenDocument workbook (first worksheet)
    Workbook,
    /// Comma-separated values with a header row
    Csv,
}

impl SourceKind {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceKind::Workbook),
            "csv" => Ok(SourceKind::Csv),
            _ => Err(Error::UnsupportedSource(path.display().to_string())),
        }
    }
}

/// Result of loading a source.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// Records read from the file
    Loaded { path: PathBuf, table: RecordTable },
    /// The file was absent; sample records stand in
    Fallback { table: RecordTable, reason: String },
}

impl LoadOutcome {
    pub fn table(&self) -> &RecordTable {
        match self {
            LoadOutcome::Loaded { table, .. } | LoadOutcome::Fallback { table, .. } => table,
        }
    }

    pub fn into_table(self) -> RecordTable {
        match self {
            LoadOutcome::Loaded { table, .. } | LoadOutcome::Fallback { table, .. } => table,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, LoadOutcome::Fallback { .. })
    }
}

/// Read a table from `path` without any fallback.
pub fn read_table(path: &Path) -> Result<RecordTable> {
    match SourceKind::from_path(path)? {
        SourceKind::Workbook => spreadsheet::read_workbook(path),
        SourceKind::Csv => csv_file::read_csv(path),
    }
}

/// Load a source, substituting sample data when the file does not exist.
///
/// `now` dates the sample records.
pub fn load(path: &Path, now: NaiveDateTime) -> Result<LoadOutcome> {
    match std::fs::metadata(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let reason = format!("source not found: {}", path.display());
            tracing::warn!(path = %path.display(), "source missing, using sample records");
            return Ok(LoadOutcome::Fallback {
                table: sample_table(now),
                reason,
            });
        }
        Err(e) => {
            return Err(Error::SourceCorrupt {
                path: path.display().to_string(),
                reason: e.to_string(),
            });
        }
        Ok(meta) if meta.is_dir() => {
            return Err(Error::SourceCorrupt {
                path: path.display().to_string(),
                reason: "is a directory".to_string(),
            });
        }
        Ok(_) => {}
    }

    // Reject unknown extensions before reading anything.
    SourceKind::from_path(path)?;

    let table = read_table(path).map_err(|e| Error::SourceCorrupt {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), rows = table.len(), "source loaded");

    Ok(LoadOutcome::Loaded {
        path: path.to_path_buf(),
        table,
    })
}

/// Column name for a header cell, with a positional name for blank headers.
fn header_name(raw: &str, index: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        format!("Column {}", index + 1)
    } else {
        trimmed.to_string()
    }
}

/// Header cells as `(position, name)` pairs.
///
/// A header that names the same field as an earlier one (after
/// normalization) is dropped, so the first column wins.
fn header_columns<I, S>(cells: I) -> Vec<(usize, String)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut columns: Vec<(usize, String)> = Vec::new();
    for (index, raw) in cells.into_iter().enumerate() {
        let name = header_name(raw.as_ref(), index);
        let key = normalize_field_name(&name);
        if let Some((_, first)) = columns.iter().find(|(_, c)| normalize_field_name(c) == key) {
            tracing::warn!(column = index + 1, header = %name, first = %first, "duplicate column ignored");
            continue;
        }
        columns.push((index, name));
    }
    columns
}
