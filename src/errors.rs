// src/errors.rs

//! Crate-wide error taxonomy.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GantryError {
    /// Startup-fatal problems: unparseable config, invalid glob, bad options.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cycle detected in task graph: {0}")]
    GraphCycle(String),

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    /// The external linter reported violations.
    #[error("Lint failed ({ruleset} rules): {detail}")]
    Lint { ruleset: String, detail: String },

    /// A config JSON file failed to parse; `source` carries line/column.
    #[error("JSON lint failed for {path}: {source}")]
    JsonLint {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The delegated test runner reported failure. Fixed summary message.
    #[error("{0}")]
    TestFailure(String),

    #[error("Bundle failed: {0}")]
    Bundle(String),

    /// Propagation wrapper naming the task whose subgraph failed.
    #[error("Task '{task}' failed: {message}")]
    TaskFailed { task: String, message: String },

    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GantryError {
    /// The fixed message carried by every test-runner failure.
    pub fn test_failed() -> Self {
        GantryError::TestFailure("Test Failed".to_string())
    }
}

pub type Result<T> = std::result::Result<T, GantryError>;
