// src/graph/validate.rs

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{GantryError, Result};
use crate::graph::graph::Task;
use crate::graph::TaskName;

/// Validate a registered task set before any task executes.
///
/// Checks, in order:
/// - every prerequisite refers to a registered task,
/// - no task depends on itself,
/// - the declared graph is acyclic.
pub fn validate_tasks(tasks: &BTreeMap<TaskName, Task>) -> Result<()> {
    validate_dependencies(tasks)?;
    validate_acyclic(tasks)?;
    Ok(())
}

fn validate_dependencies(tasks: &BTreeMap<TaskName, Task>) -> Result<()> {
    for (name, task) in tasks {
        for dep in &task.deps {
            if !tasks.contains_key(dep) {
                return Err(GantryError::Config(format!(
                    "task '{name}' has unknown prerequisite '{dep}'"
                )));
            }
            if dep == name {
                return Err(GantryError::Config(format!(
                    "task '{name}' cannot depend on itself"
                )));
            }
        }
    }
    Ok(())
}

fn validate_acyclic(tasks: &BTreeMap<TaskName, Task>) -> Result<()> {
    // Edge direction: prerequisite -> task.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in tasks.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in tasks {
        for dep in &task.deps {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    // A topological sort fails exactly when there is a cycle.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(GantryError::GraphCycle(format!(
            "cycle involving task '{}'",
            cycle.node_id()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TaskGraph;

    #[test]
    fn cycle_is_rejected_at_build_time() {
        let err = TaskGraph::builder()
            .task("a", &["b"], None)
            .task("b", &["a"], None)
            .build()
            .unwrap_err();
        assert!(matches!(err, GantryError::GraphCycle(_)));
    }

    #[test]
    fn unknown_prerequisite_is_rejected() {
        let err = TaskGraph::builder()
            .task("a", &["missing"], None)
            .build()
            .unwrap_err();
        assert!(matches!(err, GantryError::Config(_)));
    }

    #[test]
    fn self_dependency_is_rejected() {
        let err = TaskGraph::builder()
            .task("a", &["a"], None)
            .build()
            .unwrap_err();
        assert!(matches!(err, GantryError::Config(_)));
    }
}
