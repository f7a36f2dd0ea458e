//! Command implementations for the Maintboard CLI.
//!
//! Each command takes a freshly refreshed [`Snapshot`] (or plain input) and
//! returns a result that can be printed as JSON or for humans:
//! - `summary` - Summary cards for a filter
//! - `records` / `recent` / `drilldown` - Record listings
//! - `breakdown` - Status, priority and deck distributions
//! - `add_record` - Validate the add-record form
//! - `sample` - Export the sample records
//! - `config_show` - Show resolved configuration

use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::{ResolvedConfig, ValueSource};
use crate::dashboard::{Snapshot, SnapshotOrigin};
use crate::derive::EnrichedTable;
use crate::filter::{self, Predicate};
use crate::form::NewRecordForm;
use crate::models::{CellValue, Record, fields};
use crate::source::{sample_table, write_csv};
use crate::stats::{Breakdown, Breakdowns, DashboardStats, RiskByPriority};
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json_string<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

fn origin_line(origin: &SnapshotOrigin) -> String {
    match origin {
        SnapshotOrigin::Source { path } => format!("Source: {}", path.display()),
        SnapshotOrigin::Fallback { reason } => format!("Source: sample records ({})", reason),
    }
}

// ==================== summary ====================

/// One dashboard summary card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub id: &'static str,
    pub label: &'static str,
    pub value: String,
    pub color: &'static str,
}

/// The six summary cards, formatted as the dashboard shows them.
pub fn summary_cards(stats: &DashboardStats) -> Vec<Card> {
    vec![
        Card {
            id: "total-items",
            label: "Total Maintenance Items",
            value: stats.total_items.to_string(),
            color: "primary",
        },
        Card {
            id: "completion-rate",
            label: "Overall Completion Rate",
            value: format!("{:.1}%", stats.completion_rate),
            color: "info",
        },
        Card {
            id: "not-started",
            label: "Items Not Started",
            value: stats.not_started.to_string(),
            color: "warning",
        },
        Card {
            id: "high-priority",
            label: "High Priority Items",
            value: stats.high_priority.to_string(),
            color: "danger",
        },
        Card {
            id: "paint-usage",
            label: "Total Paint Usage (gal)",
            value: format!("{:.0}", stats.total_gallons),
            color: "secondary",
        },
        Card {
            id: "avg-risk",
            label: "Average Risk Rating",
            value: format!("{:.1}", stats.avg_risk_rating),
            color: "dark",
        },
    ]
}

#[derive(Debug, Serialize)]
pub struct SummaryResult {
    pub filter: Predicate,
    pub label: String,
    pub last_updated: String,
    pub origin: SnapshotOrigin,
    pub stats: DashboardStats,
    pub cards: Vec<Card>,
}

impl CommandResult for SummaryResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Last Updated: {}", self.last_updated),
            origin_line(&self.origin),
            self.label.clone(),
            String::new(),
        ];
        let width = self.cards.iter().map(|c| c.label.len()).max().unwrap_or(0);
        for card in &self.cards {
            lines.push(format!("  {:<width$}  {}", card.label, card.value, width = width));
        }
        lines.push(String::new());
        lines.push(format!(
            "  Complete: {}  In Progress: {}  Critical: {}  Overdue: {}",
            self.stats.complete, self.stats.in_progress, self.stats.critical, self.stats.overdue
        ));
        lines.push(format!(
            "  Max Risk: {:.1}  Cost Estimate: {:.2}  Estimated Hours: {:.1}",
            self.stats.max_risk_rating, self.stats.total_cost_estimate, self.stats.total_estimated_hours
        ));
        lines.join("\n")
    }
}

pub fn summary(snapshot: &Snapshot, predicate: Predicate) -> SummaryResult {
    let view = snapshot.view(predicate);
    SummaryResult {
        filter: predicate,
        cards: summary_cards(&view.stats),
        label: view.label,
        last_updated: view.last_updated,
        origin: snapshot.origin.clone(),
        stats: view.stats,
    }
}

// ==================== record listings ====================

#[derive(Debug, Serialize)]
pub struct RecordsResult {
    pub title: String,
    /// Rows matching before any limit was applied
    pub total: usize,
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl CommandResult for RecordsResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        let mut out = format!("{} ({} items)\n", self.title, self.total);
        if self.rows.is_empty() {
            out.push_str("  (no items)");
            return out;
        }

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| row.get(c).map(human_cell).unwrap_or_default())
                    .collect()
            })
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(c.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let format_row = |values: Vec<&str>| -> String {
            values
                .iter()
                .zip(&widths)
                .map(|(v, w)| format!("{:<w$}", v, w = *w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut lines = vec![format_row(self.columns.iter().map(String::as_str).collect())];
        lines.push(format_row(widths.iter().map(|_| "--").collect()));
        for row in &cells {
            lines.push(format_row(row.iter().map(String::as_str).collect()));
        }
        out.push_str(&lines.join("\n"));
        out
    }
}

fn human_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        other => other.display(),
    }
}

/// Project the listed fields that the table actually carries.
fn listing(title: String, table: &EnrichedTable, wanted: &[&str], limit: Option<usize>) -> RecordsResult {
    let columns: Vec<String> = wanted
        .iter()
        .filter(|f| table.has_column(f))
        .map(|f| f.to_string())
        .collect();
    let rows = table
        .rows
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|row| {
            let mut record = Record::new();
            for column in &columns {
                record.insert(column.clone(), row.display_cell(column));
            }
            record
        })
        .collect();

    RecordsResult {
        title,
        total: table.len(),
        columns,
        rows,
    }
}

/// Records matching a filter, in source order.
pub fn records(snapshot: &Snapshot, predicate: Predicate, limit: Option<usize>) -> RecordsResult {
    let table = filter::filter(&snapshot.table, predicate);
    listing(predicate.label().to_string(), &table, &fields::TABLE_FIELDS, limit)
}

/// The most recently added records matching a filter.
pub fn recent(snapshot: &Snapshot, predicate: Predicate, limit: usize) -> RecordsResult {
    let filtered = filter::filter(&snapshot.table, predicate);
    let table = filter::recent(&filtered, limit);
    let mut result = listing(
        "Recent Maintenance Items".to_string(),
        &table,
        &fields::TABLE_FIELDS,
        None,
    );
    result.total = filtered.len();
    result
}

/// Every record whose Status equals `status` exactly.
pub fn drilldown(snapshot: &Snapshot, status: &str) -> RecordsResult {
    let table = filter::by_status(&snapshot.table, status);
    listing(
        format!("Items with Status: {}", status),
        &table,
        &fields::DRILLDOWN_FIELDS,
        None,
    )
}

// ==================== breakdown ====================

#[derive(Debug, Serialize)]
pub struct BreakdownResult {
    pub filter: Predicate,
    pub breakdowns: Breakdowns,
}

fn human_breakdown(title: &str, breakdown: &Option<Breakdown>, lines: &mut Vec<String>) {
    lines.push(format!("{}:", title));
    match breakdown {
        Some(b) if !b.counts.is_empty() => {
            let width = b.counts.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
            for (label, count) in &b.counts {
                lines.push(format!("  {:<width$}  {}", label, count, width = width));
            }
        }
        _ => lines.push(format!("  No {} Data Available", title)),
    }
}

fn human_risk_by_priority(risk: &Option<RiskByPriority>, lines: &mut Vec<String>) {
    lines.push("Risk Rating by Priority:".to_string());
    match risk {
        Some(r) if !r.is_empty() => {
            for group in &r.groups {
                let points: Vec<String> = group
                    .points
                    .iter()
                    .map(|p| match &p.asset_tag {
                        Some(tag) => format!("{} {:.1}", tag, p.risk_rating),
                        None => format!("{:.1}", p.risk_rating),
                    })
                    .collect();
                lines.push(format!("  {}: {}", group.priority, points.join(", ")));
            }
        }
        _ => lines.push("  No Risk/Priority Data Available".to_string()),
    }
}

impl CommandResult for BreakdownResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        human_breakdown("Status", &self.breakdowns.status, &mut lines);
        human_breakdown("Priority", &self.breakdowns.priority, &mut lines);
        human_breakdown("Deck Level", &self.breakdowns.deck_level, &mut lines);
        human_risk_by_priority(&self.breakdowns.risk_by_priority, &mut lines);
        lines.join("\n")
    }
}

pub fn breakdown(snapshot: &Snapshot, predicate: Predicate) -> BreakdownResult {
    let table = filter::filter(&snapshot.table, predicate);
    BreakdownResult {
        filter: predicate,
        breakdowns: Breakdowns::of(&table),
    }
}

// ==================== add ====================

#[derive(Debug, Serialize)]
pub struct AddResult {
    pub success: bool,
    pub persisted: bool,
    pub message: String,
}

impl CommandResult for AddResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        format!("{}\n(demo only: the record was not saved)", self.message)
    }
}

/// Validate a submission and echo it back. Nothing is saved.
pub fn add_record(form: &NewRecordForm) -> Result<AddResult> {
    let confirmation = form
        .validate()
        .map_err(|e| Error::InvalidInput(e.to_string()))?;
    Ok(AddResult {
        success: true,
        persisted: false,
        message: confirmation.message,
    })
}

// ==================== sample ====================

#[derive(Debug, Serialize)]
pub struct SampleResult {
    pub path: PathBuf,
    pub rows: usize,
}

impl CommandResult for SampleResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        format!("Wrote {} sample records to {}", self.rows, self.path.display())
    }
}

/// Write the sample records to a CSV file.
pub fn sample(path: &Path, now: NaiveDateTime) -> Result<SampleResult> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(Error::InvalidInput(format!(
            "sample records can only be written as .csv: {}",
            path.display()
        )));
    }
    let table = sample_table(now);
    write_csv(&table, path)?;
    Ok(SampleResult {
        path: path.to_path_buf(),
        rows: table.len(),
    })
}

// ==================== config ====================

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub value: String,
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct ConfigResult {
    pub entries: Vec<ConfigEntry>,
}

impl CommandResult for ConfigResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{} = {} ({})", e.key, e.value, e.source))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn entry(key: &'static str, value: String, source: &ValueSource) -> ConfigEntry {
    ConfigEntry {
        key,
        value,
        source: source.to_string(),
    }
}

pub fn config_show(config: &ResolvedConfig) -> ConfigResult {
    ConfigResult {
        entries: vec![
            entry("source", config.source().display().to_string(), &config.source.source),
            entry(
                "refresh-interval",
                config.refresh_interval().to_string(),
                &config.refresh_interval.source,
            ),
            entry(
                "recent-limit",
                config.recent_limit().to_string(),
                &config.recent_limit.source,
            ),
            entry(
                "output-format",
                config.output_format().to_string(),
                &config.output_format.source,
            ),
        ],
    }
}
