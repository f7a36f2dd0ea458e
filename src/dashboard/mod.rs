//! Refresh and snapshot state.
//!
//! A refresh reloads the source and recomputes the enriched table and its
//! statistics from scratch, producing an immutable [`Snapshot`]. Callers own
//! the snapshot (or share it through a [`SnapshotStore`]); there is no
//! module-level cache.

mod store;
#[cfg(feature = "watch")]
mod watch;

pub use store::SnapshotStore;
#[cfg(feature = "watch")]
pub use watch::{RefreshTrigger, WatchOptions, watch};

use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::Result;
use crate::derive::{EnrichedTable, derive_table};
use crate::filter::{Predicate, filter};
use crate::source::{LoadOutcome, load};
use crate::stats::DashboardStats;

/// Timestamp format for "last updated" displays.
pub const LAST_UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where a snapshot's records came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotOrigin {
    Source { path: PathBuf },
    Fallback { reason: String },
}

/// The result of one refresh.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub table: EnrichedTable,
    pub stats: DashboardStats,
    pub refreshed_at: NaiveDateTime,
    pub origin: SnapshotOrigin,
    /// Publish count; 0 until the snapshot is published to a store
    pub generation: u64,
}

impl Snapshot {
    /// Build a snapshot from an already loaded source.
    pub fn from_outcome(outcome: LoadOutcome, now: NaiveDateTime) -> Self {
        let (origin, raw) = match outcome {
            LoadOutcome::Loaded { path, table } => (SnapshotOrigin::Source { path }, table),
            LoadOutcome::Fallback { table, reason } => (SnapshotOrigin::Fallback { reason }, table),
        };
        let table = derive_table(&raw, now);
        let stats = DashboardStats::for_table(&table);
        Self {
            table,
            stats,
            refreshed_at: now,
            origin,
            generation: 0,
        }
    }

    pub fn last_updated(&self) -> String {
        self.refreshed_at.format(LAST_UPDATED_FORMAT).to_string()
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, SnapshotOrigin::Fallback { .. })
    }

    /// Apply a filter and recompute statistics over the result.
    pub fn view(&self, predicate: Predicate) -> View {
        let table = filter(&self.table, predicate);
        let stats = DashboardStats::for_table(&table);
        View {
            predicate,
            label: predicate.label().to_string(),
            last_updated: self.last_updated(),
            stats,
            table,
        }
    }
}

/// Load `path` and compute a fresh snapshot dated `now`.
pub fn refresh(path: &Path, now: NaiveDateTime) -> Result<Snapshot> {
    let outcome = load(path, now)?;
    let snapshot = Snapshot::from_outcome(outcome, now);
    if snapshot.is_fallback() {
        tracing::warn!(rows = snapshot.table.len(), "refreshed from sample records");
    } else {
        tracing::info!(
            path = %path.display(),
            rows = snapshot.table.len(),
            "refreshed"
        );
    }
    Ok(snapshot)
}

/// What one dashboard request shows: a filtered table and its statistics.
#[derive(Debug, Clone, Serialize)]
pub struct View {
    pub predicate: Predicate,
    pub label: String,
    pub last_updated: String,
    pub stats: DashboardStats,
    pub table: EnrichedTable,
}
