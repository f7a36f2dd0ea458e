//! Periodic and change-driven refresh loop.

use chrono::Local;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use super::{Snapshot, SnapshotStore};
use crate::Result;

/// Debounce duration - wait this long after the last file event before refreshing
const DEBOUNCE_MS: u64 = 100;

/// What caused a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshTrigger {
    Interval,
    FileChanged,
    Manual,
}

/// Settings for [`watch`].
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub source: PathBuf,
    pub interval: Duration,
    /// Refresh when the source file changes on disk
    pub watch_file: bool,
    /// Refresh when a line is read from stdin
    pub manual: bool,
}

/// Keep `store` current until `shutdown` completes.
///
/// Refreshes run on every interval tick, on source changes and on manual
/// requests. Triggers are not coalesced; each one performs a full refresh.
/// A failed refresh is logged and the previous snapshot stays published.
pub async fn watch<F, S>(
    options: WatchOptions,
    store: Arc<SnapshotStore>,
    shutdown: S,
    on_refresh: F,
) -> Result<()>
where
    F: FnMut(RefreshTrigger, &Snapshot),
    S: Future<Output = ()>,
{
    let (file_tx, file_rx) = mpsc::channel::<Event>(100);
    // The watcher must stay alive for the duration of the loop.
    let _watcher = if options.watch_file {
        Some(watch_source(&options.source, file_tx)?)
    } else {
        None
    };

    let (manual_tx, manual_rx) = mpsc::channel::<()>(8);
    if options.manual {
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(_)) = lines.next_line().await {
                if manual_tx.send(()).await.is_err() {
                    break;
                }
            }
        });
    }

    run_loop(options, store, file_rx, manual_rx, shutdown, on_refresh).await;
    Ok(())
}

async fn run_loop<F, S>(
    options: WatchOptions,
    store: Arc<SnapshotStore>,
    mut file_rx: mpsc::Receiver<Event>,
    mut manual_rx: mpsc::Receiver<()>,
    shutdown: S,
    mut on_refresh: F,
) where
    F: FnMut(RefreshTrigger, &Snapshot),
    S: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(options.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the caller already holds a fresh snapshot.
    ticker.tick().await;

    let file_name = options.source.file_name().map(|n| n.to_os_string());
    let mut pending_change = false;
    let mut last_event_time = Instant::now();

    tokio::pin!(shutdown);

    loop {
        let debounce_left = Duration::from_millis(DEBOUNCE_MS).saturating_sub(last_event_time.elapsed());

        let trigger = tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("watch stopped");
                break;
            }
            _ = ticker.tick() => Some(RefreshTrigger::Interval),
            Some(()) = manual_rx.recv() => Some(RefreshTrigger::Manual),
            Some(event) = file_rx.recv() => {
                let relevant = matches!(
                    event.kind,
                    notify::EventKind::Create(_) | notify::EventKind::Modify(_) | notify::EventKind::Remove(_)
                ) && event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                if relevant {
                    pending_change = true;
                    last_event_time = Instant::now();
                }
                None
            }
            _ = tokio::time::sleep(debounce_left), if pending_change => {
                pending_change = false;
                Some(RefreshTrigger::FileChanged)
            }
        };

        if let Some(trigger) = trigger {
            let now = Local::now().naive_local();
            tracing::debug!(?trigger, "refresh triggered");
            if let Ok(snapshot) = store.refresh(&options.source, now) {
                on_refresh(trigger, snapshot.as_ref());
            }
        }
    }
}

/// Watch the directory holding `source` (the file itself may not exist yet).
fn watch_source(source: &Path, tx: mpsc::Sender<Event>) -> Result<RecommendedWatcher> {
    let dir = match source.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut watcher = RecommendedWatcher::new(
        move |res: std::result::Result<Event, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        },
        Config::default(),
    )
    .map_err(|e| crate::Error::Other(format!("Failed to start file watcher: {}", e)))?;

    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|e| crate::Error::Other(format!("Failed to watch {}: {}", dir.display(), e)))?;
    tracing::debug!(dir = %dir.display(), "watching source directory");

    Ok(watcher)
}
