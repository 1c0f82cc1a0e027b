// src/graph/mod.rs

//! The static task graph and its execution engine.
//!
//! - [`graph`] holds the immutable name → (prerequisites, action) mapping,
//!   built once per invocation by [`builder`]; there is no process-wide
//!   registry.
//! - [`validate`] rejects unknown prerequisites and cycles before anything
//!   executes.
//! - [`executor`] runs a named task: every reachable prerequisite exactly
//!   once, independent branches concurrently, failures cascading to
//!   dependents.

pub mod builder;
pub mod executor;
pub mod graph;
pub mod validate;

pub use builder::build_pipeline;
pub use executor::{run_task, ActionRunner};
pub use graph::{Task, TaskGraph, TaskGraphBuilder};

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// The unit of real work a task performs. Tasks without an action are pure
/// aggregators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// Lint non-test source with the default rule set.
    EslintDefault,
    /// Lint tests and mocks with the test-framework rule set.
    EslintJest,
    /// Parse every config JSON file.
    Jsonlint,
    /// Stale-artifact reconciliation of the compiled-output tree.
    SyncOutput,
    /// Transpile source into the output tree.
    Transpile,
    /// Bundle the browser entry.
    Bundle,
    /// Minify the browser bundle.
    Minify,
    /// Run the delegated test runner.
    Test,
    /// (Re)start the dev server.
    Server,
    /// Count source lines.
    Sloc,
}
