//! File-system watcher feeding plugin-directory change notifications into a
//! channel the host drains on `poll()`.
//!
//! Grounded in the teacher's `systems/module-loader/src/watcher.rs`: a
//! `notify::recommended_watcher` closure forwards raw events to a channel,
//! and all the interesting decisions (is this a plugin file, do we
//! load/reload/ignore) happen on the consumer side. The difference from the
//! teacher is the channel: the base spec (§5, "confined to producing PathBufs
//! into a channel") requires that nothing past the channel run off the
//! embedder's thread, so this uses a plain `crossbeam_channel` drained
//! synchronously by `PluginHost::poll`, not a spawned `tokio` task that
//! calls back into the loader itself.

use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::PluginResult;

/// One coalesced change to a candidate plugin file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    CreatedOrModified,
    Removed,
}

#[derive(Debug, Clone)]
pub struct PathChange {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

/// Watches one directory (non-recursive: plugins are flat files) and
/// forwards coalesced-by-kind events to `rx`.
pub struct DirectoryWatcher {
    _watcher: RecommendedWatcher,
    rx: crossbeam_channel::Receiver<PathChange>,
}

impl DirectoryWatcher {
    pub fn new(dir: &Path) -> PluginResult<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    tracing::error!(%err, "plugin directory watcher error");
                    return;
                }
            };
            let kind = match event.kind {
                EventKind::Create(_) | EventKind::Modify(_) => ChangeKind::CreatedOrModified,
                EventKind::Remove(_) => ChangeKind::Removed,
                _ => return,
            };
            for path in event.paths {
                if tx.send(PathChange { path, kind }).is_err() {
                    return;
                }
            }
        })?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        tracing::info!(dir = %dir.display(), "watching plugin directory");

        Ok(Self { _watcher: watcher, rx })
    }

    /// Drains every change queued since the last poll without blocking.
    pub fn try_iter(&self) -> crossbeam_channel::TryIter<'_, PathChange> {
        self.rx.try_iter()
    }
}
