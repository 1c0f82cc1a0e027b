// src/watch/watcher.rs

use std::path::PathBuf;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::watch::SessionEvent;

/// Handle for the filesystem watcher.
///
/// Exists mainly so the underlying `RecommendedWatcher` stays alive for as
/// long as the session runs. Dropping this handle stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a recursive filesystem watcher on `root` that forwards every
/// changed path into the session channel as [`SessionEvent::Changed`].
///
/// The notify callback runs on a non-async thread, so events hop through an
/// unbounded channel into a forwarding task before reaching the session.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    session_tx: mpsc::UnboundedSender<SessionEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    // Canonicalize once so event paths strip cleanly.
    let root = root.canonicalize().unwrap_or_else(|_| root.clone());

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // No tracing subscriber is guaranteed on this thread.
                    eprintln!("gantry: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("gantry: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!(root = %root.display(), "file watcher started");

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(?event, "received notify event");
            for path in event.paths {
                if session_tx.send(SessionEvent::Changed(path)).is_err() {
                    debug!("session channel closed; stopping event forwarding");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
