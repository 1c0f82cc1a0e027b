// src/graph/graph.rs

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::errors::{GantryError, Result};
use crate::graph::validate::validate_tasks;
use crate::graph::{TaskAction, TaskName};

/// One registered task: unique name, ordered prerequisite list, optional
/// action.
#[derive(Debug, Clone)]
pub struct Task {
    pub name: TaskName,
    pub deps: Vec<TaskName>,
    pub action: Option<TaskAction>,
}

/// Immutable task graph keyed by task name.
///
/// All tasks are registered once through [`TaskGraphBuilder`]; after `build`
/// the graph never changes. Acyclicity and dependency existence are
/// guaranteed by validation, so lookups here can stay lightweight.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    tasks: BTreeMap<TaskName, Task>,
    /// Reverse adjacency: task → tasks that list it as a prerequisite.
    dependents: HashMap<TaskName, Vec<TaskName>>,
}

impl TaskGraph {
    pub fn builder() -> TaskGraphBuilder {
        TaskGraphBuilder::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// All task names, in stable (sorted) order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Immediate prerequisites of a task.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.tasks.get(name).map(|t| t.deps.as_slice()).unwrap_or(&[])
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.dependents
            .get(name)
            .map(|d| d.as_slice())
            .unwrap_or(&[])
    }

    /// The prerequisite closure of `target`, including `target` itself.
    ///
    /// Errors with [`GantryError::UnknownTask`] if `target` is not
    /// registered.
    pub fn reachable_from(&self, target: &str) -> Result<BTreeSet<TaskName>> {
        if !self.contains(target) {
            return Err(GantryError::UnknownTask(target.to_string()));
        }

        let mut reachable = BTreeSet::new();
        let mut stack = vec![target.to_string()];

        while let Some(name) = stack.pop() {
            if !reachable.insert(name.clone()) {
                continue;
            }
            for dep in self.dependencies_of(&name) {
                stack.push(dep.clone());
            }
        }

        Ok(reachable)
    }
}

/// Builder collecting task registrations before validation.
#[derive(Debug, Default)]
pub struct TaskGraphBuilder {
    tasks: BTreeMap<TaskName, Task>,
    duplicates: Vec<TaskName>,
}

impl TaskGraphBuilder {
    /// Register a task. Registering the same name twice is a configuration
    /// error, reported at `build`.
    pub fn task(mut self, name: &str, deps: &[&str], action: Option<TaskAction>) -> Self {
        let task = Task {
            name: name.to_string(),
            deps: deps.iter().map(|d| d.to_string()).collect(),
            action,
        };
        if self.tasks.insert(name.to_string(), task).is_some() {
            self.duplicates.push(name.to_string());
        }
        self
    }

    /// Validate and freeze the graph.
    pub fn build(self) -> Result<TaskGraph> {
        if let Some(dup) = self.duplicates.first() {
            return Err(GantryError::Config(format!(
                "task '{dup}' registered more than once"
            )));
        }

        validate_tasks(&self.tasks)?;

        let mut dependents: HashMap<TaskName, Vec<TaskName>> = HashMap::new();
        for task in self.tasks.values() {
            for dep in &task.deps {
                dependents
                    .entry(dep.clone())
                    .or_default()
                    .push(task.name.clone());
            }
        }

        Ok(TaskGraph {
            tasks: self.tasks,
            dependents,
        })
    }
}
