//! An [`ActionRunner`] fake that records execution order and fails selected
//! tasks on demand.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gantry::errors::{GantryError, Result};
use gantry::graph::{ActionRunner, TaskAction};

/// Records every task whose action starts, in start order, and reports
/// failure for the tasks named at construction.
pub struct RecordingRunner {
    started: Arc<Mutex<Vec<String>>>,
    failing: HashSet<String>,
    /// Per-action delay, to keep start-order assertions meaningful when
    /// independent tasks run concurrently.
    delay: Option<Duration>,
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            started: Arc::new(Mutex::new(Vec::new())),
            failing: HashSet::new(),
            delay: None,
        }
    }

    /// Every task in `tasks` fails when its action runs.
    pub fn failing(tasks: &[&str]) -> Self {
        Self {
            failing: tasks.iter().map(|t| t.to_string()).collect(),
            ..Self::new()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Tasks whose action started, in order.
    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    /// How many times the named task's action started.
    pub fn start_count(&self, task: &str) -> usize {
        self.started
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.as_str() == task)
            .count()
    }
}

impl ActionRunner for RecordingRunner {
    fn run(
        &self,
        task: &str,
        _action: TaskAction,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let task = task.to_string();
        let started = Arc::clone(&self.started);
        let fail = self.failing.contains(&task);
        let delay = self.delay;

        Box::pin(async move {
            started.lock().unwrap().push(task.clone());
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if fail {
                Err(GantryError::TaskFailed {
                    task,
                    message: "induced failure".to_string(),
                })
            } else {
                Ok(())
            }
        })
    }
}
