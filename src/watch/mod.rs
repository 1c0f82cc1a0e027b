// src/watch/mod.rs

//! The watch session: filesystem changes re-run tasks through the graph.
//!
//! The watcher turns filesystem events into [`SessionEvent`]s; the session
//! loop matches each changed path against the compiled bindings and spawns
//! one graph invocation per matching task. Invocations are not coalesced or
//! deduplicated, and a failing rebuild never terminates the session. Changes
//! to built assets are forwarded to the dev server as live-reload
//! notifications instead of triggering tasks.

pub mod bindings;
pub mod path_utils;
pub mod watcher;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::fileset::CompiledSelection;
use crate::graph::{run_task, ActionRunner, TaskGraph};
use crate::tasks::PipelineRunner;
use crate::watch::bindings::{build_bindings, reload_selection, WatchBinding};
use crate::watch::path_utils::relative_str;
use crate::watch::watcher::spawn_watcher;

pub use watcher::WatcherHandle;

/// Events feeding the session loop.
#[derive(Debug)]
pub enum SessionEvent {
    Changed(PathBuf),
    ShutdownRequested,
}

/// Run the watch session until Ctrl-C.
///
/// Seeds one `default` invocation up front so the session starts from a
/// fresh build, then reacts to changes for as long as it runs.
pub async fn watch_session(
    root: PathBuf,
    graph: Arc<TaskGraph>,
    runner: Arc<PipelineRunner>,
) -> Result<()> {
    let bindings = build_bindings(runner.options(), runner.filesets())?;
    let reload = reload_selection(runner.options(), runner.filesets())?;

    let (session_tx, mut session_rx) = mpsc::unbounded_channel::<SessionEvent>();
    let _watcher = spawn_watcher(root.clone(), session_tx.clone())?;

    {
        let tx = session_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("gantry: failed to listen for Ctrl-C: {e}");
                return;
            }
            let _ = tx.send(SessionEvent::ShutdownRequested);
        });
    }

    info!("watch session started; initial build");
    spawn_invocation(&graph, &runner, "default");

    while let Some(event) = session_rx.recv().await {
        match event {
            SessionEvent::Changed(path) => {
                handle_change(&root, &graph, &runner, &bindings, reload.as_ref(), path);
            }
            SessionEvent::ShutdownRequested => {
                info!("shutdown requested; ending watch session");
                break;
            }
        }
    }

    Ok(())
}

/// React to a single changed path: trigger every bound task whose selection
/// matches, and forward reload-set changes to the dev server.
fn handle_change(
    root: &PathBuf,
    graph: &Arc<TaskGraph>,
    runner: &Arc<PipelineRunner>,
    bindings: &[WatchBinding],
    reload: Option<&CompiledSelection>,
    path: PathBuf,
) {
    let Some(rel) = relative_str(root, &path) else {
        warn!(path = %path.display(), "could not relativize event path; ignoring");
        return;
    };

    for binding in bindings {
        if binding.matches(&rel) {
            for task in &binding.tasks {
                debug!(path = %rel, task = %task, "watch match");
                spawn_invocation(graph, runner, task);
            }
        }
    }

    if let Some(selection) = reload {
        if selection.matches(&rel) {
            let runner = Arc::clone(runner);
            tokio::spawn(async move {
                runner.notify_reload(&path).await;
            });
        }
    }
}

/// Start one graph invocation in the background. Failures are reported and
/// swallowed; the session keeps running.
fn spawn_invocation(graph: &Arc<TaskGraph>, runner: &Arc<PipelineRunner>, target: &str) {
    let graph = Arc::clone(graph);
    let runner = Arc::clone(runner) as Arc<dyn ActionRunner>;
    let target = target.to_string();

    tokio::spawn(async move {
        if let Err(err) = run_task(&graph, runner, &target).await {
            warn!(task = %target, error = %err, "rebuild failed; still watching");
        }
    });
}
