// src/graph/executor.rs

//! Per-invocation task execution.
//!
//! `run_task` owns all per-run state; the [`TaskGraph`] itself stays
//! immutable and shareable, so overlapping invocations (as the watch loop
//! produces) never interfere beyond the filesystem.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::{GantryError, Result};
use crate::graph::{TaskAction, TaskGraph, TaskName};

/// Trait abstracting how task actions are executed.
///
/// Production code uses `tasks::PipelineRunner`; tests can provide an
/// implementation that records invocations and fails selected tasks without
/// touching any external tool.
pub trait ActionRunner: Send + Sync {
    fn run(
        &self,
        task: &str,
        action: TaskAction,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Per-run state of a task within one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Pending,
    Running,
    DoneSuccess,
    DoneFailed,
}

impl RunState {
    fn is_terminal(self) -> bool {
        matches!(self, RunState::DoneSuccess | RunState::DoneFailed)
    }
}

/// Run `target` and its prerequisite closure.
///
/// - Each reachable task runs at most once, however many dependents reach it.
/// - A task's action starts only after all its prerequisites succeeded;
///   independent prerequisites run concurrently with no ordering guarantee.
/// - A failure marks all pending dependents failed; sibling branches already
///   in flight are left to finish on their own.
/// - The returned error is the failing task's own error when `target` itself
///   failed, otherwise a [`GantryError::TaskFailed`] naming the prerequisite.
pub async fn run_task(
    graph: &TaskGraph,
    runner: Arc<dyn ActionRunner>,
    target: &str,
) -> Result<()> {
    let reachable = graph.reachable_from(target)?;

    let mut states: HashMap<TaskName, RunState> = reachable
        .iter()
        .map(|name| (name.clone(), RunState::Pending))
        .collect();
    let mut failures: Vec<(TaskName, GantryError)> = Vec::new();
    let mut running = 0usize;

    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(TaskName, Result<()>)>();

    debug!(target = %target, tasks = reachable.len(), "starting invocation");

    loop {
        // Dispatch to fixpoint: aggregators complete immediately and may
        // release further tasks in the same pass.
        loop {
            let ready: Vec<TaskName> = states
                .iter()
                .filter(|(name, state)| {
                    **state == RunState::Pending && deps_satisfied(graph, &states, name)
                })
                .map(|(name, _)| name.clone())
                .collect();

            if ready.is_empty() {
                break;
            }

            for name in ready {
                match graph.get(&name).and_then(|t| t.action) {
                    None => {
                        debug!(task = %name, "aggregator complete");
                        states.insert(name, RunState::DoneSuccess);
                    }
                    Some(action) => {
                        info!(task = %name, "starting task");
                        states.insert(name.clone(), RunState::Running);
                        running += 1;

                        let runner = Arc::clone(&runner);
                        let done_tx = done_tx.clone();
                        tokio::spawn(async move {
                            let result = runner.run(&name, action).await;
                            let _ = done_tx.send((name, result));
                        });
                    }
                }
            }
        }

        if states.values().all(|s| s.is_terminal()) {
            break;
        }

        if running == 0 {
            // Nothing running and nothing dispatchable: every remaining
            // pending task is blocked behind a failed prerequisite.
            for state in states.values_mut() {
                if *state == RunState::Pending {
                    *state = RunState::DoneFailed;
                }
            }
            break;
        }

        let Some((name, result)) = done_rx.recv().await else {
            break;
        };
        running -= 1;

        match result {
            Ok(()) => {
                info!(task = %name, "task succeeded");
                states.insert(name, RunState::DoneSuccess);
            }
            Err(err) => {
                warn!(task = %name, error = %err, "task failed; failing dependents");
                states.insert(name.clone(), RunState::DoneFailed);
                fail_pending_dependents(graph, &mut states, &name);
                failures.push((name, err));
            }
        }
    }

    summarize(target, &states, failures)
}

/// All prerequisites succeeded in this run?
fn deps_satisfied(graph: &TaskGraph, states: &HashMap<TaskName, RunState>, name: &str) -> bool {
    graph
        .dependencies_of(name)
        .iter()
        .all(|dep| states.get(dep) == Some(&RunState::DoneSuccess))
}

/// Mark every pending transitive dependent of `failed` as failed for this
/// run. Running tasks are left alone; there is no cancellation primitive.
fn fail_pending_dependents(
    graph: &TaskGraph,
    states: &mut HashMap<TaskName, RunState>,
    failed: &str,
) {
    let mut stack: Vec<TaskName> = graph.dependents_of(failed).to_vec();

    while let Some(name) = stack.pop() {
        if let Some(state) = states.get_mut(&name) {
            if *state == RunState::Pending {
                debug!(task = %name, "blocked by failed prerequisite");
                *state = RunState::DoneFailed;
                stack.extend(graph.dependents_of(&name).iter().cloned());
            }
        }
    }
}

fn summarize(
    target: &str,
    states: &HashMap<TaskName, RunState>,
    mut failures: Vec<(TaskName, GantryError)>,
) -> Result<()> {
    if states.get(target) == Some(&RunState::DoneSuccess) {
        return Ok(());
    }

    if let Some(pos) = failures.iter().position(|(name, _)| name == target) {
        return Err(failures.swap_remove(pos).1);
    }

    match failures.into_iter().next() {
        Some((name, err)) => Err(GantryError::TaskFailed {
            task: target.to_string(),
            message: format!("prerequisite '{name}' failed: {err}"),
        }),
        None => Err(GantryError::TaskFailed {
            task: target.to_string(),
            message: "did not complete".to_string(),
        }),
    }
}
