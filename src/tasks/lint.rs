// src/tasks/lint.rs

//! Lint actions: the external linter for source style, `serde_json` for
//! config files.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::errors::{GantryError, Result};
use crate::fileset::{self, FileSelection};
use crate::tools::Toolchain;

/// Run the external linter with one rule set over a file selection.
pub async fn eslint(
    toolchain: &Arc<dyn Toolchain>,
    root: &Path,
    ruleset_name: &str,
    ruleset: &Path,
    selection: &FileSelection,
) -> Result<()> {
    let compiled = selection.compile()?;
    let files = fileset::collect_files(root, &compiled)?;

    let status = toolchain.lint(ruleset.to_path_buf(), files).await?;

    if status.success {
        if !status.detail.is_empty() {
            info!("linter ({ruleset_name}):\n{}", status.detail);
        }
        Ok(())
    } else {
        Err(GantryError::Lint {
            ruleset: ruleset_name.to_string(),
            detail: status.detail,
        })
    }
}

/// Parse every config JSON file; any parse error fails the task with
/// file/line detail.
pub async fn jsonlint(root: &Path, selection: &FileSelection) -> Result<()> {
    let compiled = selection.compile()?;
    let files = fileset::collect_files(root, &compiled)?;

    for path in files {
        let contents = tokio::fs::read_to_string(&path).await?;
        if let Err(source) = serde_json::from_str::<serde_json::Value>(&contents) {
            return Err(GantryError::JsonLint { path, source });
        }
    }

    Ok(())
}
