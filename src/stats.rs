//! Dashboard statistics and value-count breakdowns.

use serde::Serialize;
use std::collections::HashMap;

use crate::derive::{EnrichedRecord, EnrichedTable};
use crate::models::fields;

/// Records older than this many days count as overdue.
pub const OVERDUE_DAYS: i64 = 30;

/// Whether a record is overdue (strictly more than [`OVERDUE_DAYS`]).
pub fn is_overdue(record: &EnrichedRecord) -> bool {
    record
        .derived
        .days_since_added
        .is_some_and(|days| days > OVERDUE_DAYS)
}

/// Fixed-shape summary of a table.
///
/// Always computed from the table it describes; an empty table gives all
/// zeros.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_items: usize,
    /// Mean percent complete
    pub completion_rate: f64,
    pub complete: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub high_priority: usize,
    pub critical: usize,
    pub total_gallons: f64,
    pub avg_risk_rating: f64,
    pub max_risk_rating: f64,
    pub overdue: usize,
    pub total_cost_estimate: f64,
    pub total_estimated_hours: f64,
    pub avg_urgency: f64,
}

impl DashboardStats {
    pub fn compute(rows: &[EnrichedRecord]) -> Self {
        let mut stats = Self {
            total_items: rows.len(),
            ..Self::default()
        };
        if rows.is_empty() {
            return stats;
        }

        let mut completion_sum = 0.0;
        let mut risk_sum = 0.0;
        let mut urgency_sum = 0.0;
        let mut max_risk = f64::NEG_INFINITY;

        for row in rows {
            let d = &row.derived;
            completion_sum += d.percent_complete;
            risk_sum += d.risk_rating;
            urgency_sum += d.urgency_score;
            max_risk = max_risk.max(d.risk_rating);

            stats.complete += usize::from(d.is_complete);
            stats.in_progress += usize::from(d.is_in_progress);
            stats.not_started += usize::from(d.is_not_started);
            stats.high_priority += usize::from(d.is_high_priority);
            stats.critical += usize::from(d.is_critical);
            stats.overdue += usize::from(is_overdue(row));
            stats.total_gallons += d.gallons;
            stats.total_cost_estimate += d.cost_estimate;
            stats.total_estimated_hours += d.estimated_hours;
        }

        let n = rows.len() as f64;
        stats.completion_rate = completion_sum / n;
        stats.avg_risk_rating = risk_sum / n;
        stats.avg_urgency = urgency_sum / n;
        stats.max_risk_rating = max_risk;
        stats
    }

    pub fn for_table(table: &EnrichedTable) -> Self {
        Self::compute(&table.rows)
    }
}

/// Value counts of one column, most frequent first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub field: String,
    pub counts: Vec<(String, usize)>,
}

impl Breakdown {
    /// Count the distinct values of `field`.
    ///
    /// Rows without the field are left out. Returns `None` when the table
    /// has no such column at all.
    pub fn of(table: &EnrichedTable, field: &str) -> Option<Self> {
        if !table.has_column(field) {
            return None;
        }

        let mut counts: HashMap<String, usize> = HashMap::new();
        for row in &table.rows {
            if let Some(value) = row.record.text(field) {
                *counts.entry(value).or_insert(0) += 1;
            }
        }

        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Some(Self {
            field: field.to_string(),
            counts,
        })
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

/// One record's risk rating, labelled by its asset tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskPoint {
    pub asset_tag: Option<String>,
    pub risk_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityRisk {
    pub priority: String,
    pub points: Vec<RiskPoint>,
}

/// Risk ratings grouped by Priority value, groups in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskByPriority {
    pub groups: Vec<PriorityRisk>,
}

impl RiskByPriority {
    /// Returns `None` when the table has no Priority column. Rows with an
    /// empty Priority are left out.
    pub fn of(table: &EnrichedTable) -> Option<Self> {
        if !table.has_column(fields::PRIORITY) {
            return None;
        }

        let mut groups: Vec<PriorityRisk> = Vec::new();
        for row in &table.rows {
            let Some(priority) = row.record.text(fields::PRIORITY) else {
                continue;
            };
            let point = RiskPoint {
                asset_tag: row.record.text(fields::ASSET_TAG),
                risk_rating: row.derived.risk_rating,
            };
            match groups.iter_mut().find(|g| g.priority == priority) {
                Some(group) => group.points.push(point),
                None => groups.push(PriorityRisk {
                    priority,
                    points: vec![point],
                }),
            }
        }

        Some(Self { groups })
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// The four distributions the dashboard charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdowns {
    pub status: Option<Breakdown>,
    pub priority: Option<Breakdown>,
    pub deck_level: Option<Breakdown>,
    pub risk_by_priority: Option<RiskByPriority>,
}

impl Breakdowns {
    pub fn of(table: &EnrichedTable) -> Self {
        Self {
            status: Breakdown::of(table, fields::STATUS),
            priority: Breakdown::of(table, fields::PRIORITY),
            deck_level: Breakdown::of(table, fields::DECK_LEVEL),
            risk_by_priority: RiskByPriority::of(table),
        }
    }
}
