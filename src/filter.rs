//! Named filter predicates over derived fields.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;
use crate::derive::{EnrichedRecord, EnrichedTable};
use crate::models::fields;
use crate::stats::is_overdue;

/// The fixed set of dashboard filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Predicate {
    #[default]
    All,
    NotStarted,
    HighPriority,
    Critical,
    Complete,
    /// More than 30 days since the record was added
    Overdue,
    /// High priority or critical
    Urgent,
}

impl Predicate {
    pub const ALL: [Predicate; 7] = [
        Predicate::All,
        Predicate::NotStarted,
        Predicate::HighPriority,
        Predicate::Critical,
        Predicate::Complete,
        Predicate::Overdue,
        Predicate::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Predicate::All => "all",
            Predicate::NotStarted => "not-started",
            Predicate::HighPriority => "high-priority",
            Predicate::Critical => "critical",
            Predicate::Complete => "complete",
            Predicate::Overdue => "overdue",
            Predicate::Urgent => "urgent",
        }
    }

    /// Every accepted name, in declaration order.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Predicate::as_str).collect()
    }

    /// Label describing the active filter.
    pub fn label(&self) -> &'static str {
        match self {
            Predicate::All => "Showing: All Items",
            Predicate::NotStarted => "Filtering: Not Started Items",
            Predicate::HighPriority => "Filtering: High Priority Items",
            Predicate::Critical => "Filtering: Critical Items",
            Predicate::Complete => "Filtering: Complete Items",
            Predicate::Overdue => "Filtering: Overdue Items",
            Predicate::Urgent => "Filtering: Urgent Items",
        }
    }

    pub fn matches(&self, record: &EnrichedRecord) -> bool {
        let d = &record.derived;
        match self {
            Predicate::All => true,
            Predicate::NotStarted => d.is_not_started,
            Predicate::HighPriority => d.is_high_priority,
            Predicate::Critical => d.is_critical,
            Predicate::Complete => d.is_complete,
            Predicate::Overdue => is_overdue(record),
            Predicate::Urgent => d.is_high_priority || d.is_critical,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Predicate {
    type Err = Error;

    /// Parse a filter name. Case-insensitive; underscores and spaces are
    /// accepted in place of hyphens. Unknown names are an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == key)
            .ok_or_else(|| Error::UnknownPredicate(s.to_string()))
    }
}

/// Rows matching `predicate`, in source order.
pub fn filter(table: &EnrichedTable, predicate: Predicate) -> EnrichedTable {
    if predicate == Predicate::All {
        return table.clone();
    }
    table.with_rows(
        table
            .rows
            .iter()
            .filter(|r| predicate.matches(r))
            .cloned()
            .collect(),
    )
}

/// Parse `name` and filter by it.
pub fn filter_by_name(table: &EnrichedTable, name: &str) -> crate::Result<EnrichedTable> {
    let predicate: Predicate = name.parse()?;
    Ok(filter(table, predicate))
}

/// Drill-down: rows whose raw Status equals `status` exactly.
pub fn by_status(table: &EnrichedTable, status: &str) -> EnrichedTable {
    table.with_rows(
        table
            .rows
            .iter()
            .filter(|r| r.record.text(fields::STATUS).as_deref() == Some(status))
            .cloned()
            .collect(),
    )
}

/// The `limit` most recently added rows, newest first.
///
/// Undated rows sort after dated ones; ties keep source order. When no row
/// carries a date the first `limit` rows are returned as they are.
pub fn recent(table: &EnrichedTable, limit: usize) -> EnrichedTable {
    let any_dated = table.rows.iter().any(|r| r.derived.date_added.is_some());
    if !any_dated {
        return table.with_rows(table.rows.iter().take(limit).cloned().collect());
    }

    let mut rows: Vec<_> = table.rows.iter().collect();
    // Stable sort keeps source order among equal dates.
    rows.sort_by(|a, b| b.derived.date_added.cmp(&a.derived.date_added));
    table.with_rows(rows.into_iter().take(limit).cloned().collect())
}
