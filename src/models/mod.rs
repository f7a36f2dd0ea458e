//! Data models for maintenance records.
//!
//! This module defines the core data structures:
//! - `CellValue` - A single spreadsheet cell (text, number, bool, date or empty)
//! - `Record` - One maintenance entry, an ordered field-name to cell mapping
//! - `RecordTable` - The loaded sheet: header order plus rows
//! - `Status` / `Priority` - Parsed views of the two categorical fields

pub mod fields;

use chrono::NaiveDateTime;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// A single cell value as read from the source sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl CellValue {
    /// Build a cell from raw text. Blank text becomes `Empty`.
    pub fn from_text(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Display form used for labels, breakdowns and CSV export.
    ///
    /// Whole numbers print without a fractional part so that `100.0`
    /// round-trips as `100`.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Bool(b) => b.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Normalize a field name for lookup.
///
/// Case-insensitive, trimmed, with runs of whitespace or underscores folded
/// into a single space: `"DATE ADDED"`, `"Date  Added"` and `"date_added"`
/// all normalize to `"date added"`.
pub fn normalize_field_name(name: &str) -> String {
    name.split(|c: char| c.is_whitespace() || c == '_')
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One maintenance entry.
///
/// Fields keep their insertion order and original spelling; lookups go
/// through [`normalize_field_name`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = normalize_field_name(name);
        self.fields
            .iter()
            .position(|(existing, _)| normalize_field_name(existing) == key)
    }

    /// Insert or replace a field. A replaced field keeps its position and
    /// original spelling.
    pub fn insert(&mut self, name: impl Into<String>, value: CellValue) {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => self.fields[idx].1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Look up a field. Missing fields and empty cells both yield `None`.
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.position(name)
            .map(|idx| &self.fields[idx].1)
            .filter(|v| !v.is_empty())
    }

    /// Whether the record carries this field at all (even as an empty cell).
    pub fn has_field(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Text form of a field, trimmed. Non-text cells use their display form.
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name)
            .map(|v| v.display().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A loaded sheet of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordTable {
    /// Column names in source header order
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl RecordTable {
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the header carries this column (normalized match).
    pub fn has_column(&self, name: &str) -> bool {
        let key = normalize_field_name(name);
        self.columns.iter().any(|c| normalize_field_name(c) == key)
    }

    /// The header's own spelling of a column, if present.
    pub fn column_name(&self, name: &str) -> Option<&str> {
        let key = normalize_field_name(name);
        self.columns
            .iter()
            .find(|c| normalize_field_name(c) == key)
            .map(|c| c.as_str())
    }
}

/// Maintenance status, matched exactly and case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Complete,
    InProgress,
    NotStarted,
    Other(String),
}

impl Status {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "complete" => Status::Complete,
            "in progress" => Status::InProgress,
            "not started" => Status::NotStarted,
            _ => Status::Other(s.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Status::Complete => "Complete",
            Status::InProgress => "In Progress",
            Status::NotStarted => "Not Started",
            Status::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Work priority, matched exactly and case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
    Other(String),
}

impl Priority {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "low" => Priority::Low,
            "medium" => Priority::Medium,
            "high" => Priority::High,
            "critical" => Priority::Critical,
            _ => Priority::Other(s.trim().to_string()),
        }
    }

    /// High or Critical.
    pub fn is_high(&self) -> bool {
        matches!(self, Priority::High | Priority::Critical)
    }

    pub fn label(&self) -> &str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
            Priority::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
