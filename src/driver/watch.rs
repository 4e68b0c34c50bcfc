//! Filesystem watch loop.
//!
//! Uses the notify crate to watch the repository root recursively and forwards
//! relevant events to the [`Coordinator`]. Runs until the cancellation token
//! fires, then shuts the coordinator down.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::coordinator::Coordinator;
use crate::error::WatchError;
use crate::git::Repository;
use crate::summarize::Summarize;

/// Whether an event should count as "something changed".
///
/// Access events are ignored (collection itself reads files). Paths inside
/// `.git/` are ignored, except the index when `watch_index` is set so a manual
/// `git add` is noticed in staged-only mode. Outside that mode the index is
/// only rewritten by our own staging, which must not count as a change.
pub fn is_relevant_event(event: &Event, root: &Path, watch_index: bool) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    event
        .paths
        .iter()
        .any(|path| is_relevant_path(path, root, watch_index))
}

fn is_relevant_path(path: &Path, root: &Path, watch_index: bool) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut components = relative.components();

    if components.next() == Some(Component::Normal(OsStr::new(".git"))) {
        return watch_index && components.as_path() == Path::new("index");
    }

    !path.is_dir()
}

/// Watch `root` and drive `coordinator` until `cancel` is triggered.
///
/// An in-flight attempt is allowed to finish before this returns.
pub async fn watch_repository<R, S>(
    root: &Path,
    coordinator: Coordinator<R, S>,
    cancel: CancellationToken,
) -> Result<(), WatchError>
where
    R: Repository + 'static,
    S: Summarize + 'static,
{
    let root: PathBuf = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let (tx, mut rx) = mpsc::unbounded_channel::<()>();

    let filter_root = root.clone();
    let watch_index = coordinator.staged_only();
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        match res {
            Ok(event) => {
                if is_relevant_event(&event, &filter_root, watch_index) {
                    debug!("Change detected: {:?} {:?}", event.kind, event.paths);
                    let _ = tx.send(());
                }
            }
            Err(e) => warn!("Watch error: {}", e),
        }
    })?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!("Watching {} for changes", root.display());

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            received = rx.recv() => match received {
                Some(()) => coordinator.notify().await,
                None => break,
            },
        }
    }

    drop(watcher);
    coordinator.shutdown().await;
    info!("Stopped watching {}", root.display());
    Ok(())
}
