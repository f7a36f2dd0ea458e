//! Shared snapshot cell with copy-on-publish semantics.

use chrono::NaiveDateTime;
use std::path::Path;
use std::sync::{Arc, RwLock};

use super::{Snapshot, refresh};
use crate::Result;

/// Holds the current snapshot for concurrent readers.
///
/// Readers clone the current `Arc` and work on it without holding the lock.
/// A refresh computes its snapshot outside the lock and swaps it in whole,
/// so a reader sees either the old snapshot or the new one, never a mix.
#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new(mut initial: Snapshot) -> Self {
        initial.generation = 1;
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// The snapshot published most recently.
    pub fn current(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Replace the current snapshot, returning the one it replaced.
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        self.swap(snapshot).1
    }

    /// Publish `snapshot`, returning it as published and the one it replaced.
    fn swap(&self, mut snapshot: Snapshot) -> (Arc<Snapshot>, Arc<Snapshot>) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        snapshot.generation = guard.generation + 1;
        let published = Arc::new(snapshot);
        let previous = std::mem::replace(&mut *guard, Arc::clone(&published));
        (published, previous)
    }

    /// Refresh from `path` and publish the result.
    ///
    /// On failure the previous snapshot stays published and the error is
    /// returned.
    pub fn refresh(&self, path: &Path, now: NaiveDateTime) -> Result<Arc<Snapshot>> {
        match refresh(path, now) {
            Ok(snapshot) => Ok(self.swap(snapshot).0),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "refresh failed, keeping previous snapshot");
                Err(e)
            }
        }
    }
}
