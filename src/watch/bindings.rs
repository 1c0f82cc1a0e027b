// src/watch/bindings.rs

//! Watch bindings: which file-set re-runs which task(s).

use crate::config::Options;
use crate::errors::Result;
use crate::fileset::{CompiledSelection, ResolvedFileSets};
use crate::graph::TaskName;

/// One binding: a compiled file selection paired with the tasks to re-run
/// when a matching path changes. Created at startup from the static
/// declarations below; lives for the watch session.
#[derive(Debug)]
pub struct WatchBinding {
    pub tasks: Vec<TaskName>,
    selection: CompiledSelection,
}

impl WatchBinding {
    fn new(tasks: &[&str], selection: CompiledSelection) -> Self {
        Self {
            tasks: tasks.iter().map(|t| t.to_string()).collect(),
            selection,
        }
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.selection.matches(rel_path)
    }
}

/// Build the session's bindings from the resolved file sets.
///
/// Bindings target the leaf tasks; prerequisites still apply because
/// re-runs go through the task graph.
pub fn build_bindings(
    options: &Options,
    filesets: &ResolvedFileSets,
) -> Result<Vec<WatchBinding>> {
    let mut bindings = vec![
        WatchBinding::new(&["transpile"], filesets.transpile.compile()?),
        WatchBinding::new(&["eslint:default"], filesets.eslint_default.compile()?),
        WatchBinding::new(&["eslint:jest"], filesets.eslint_jest.compile()?),
        WatchBinding::new(&["jsonlint"], filesets.jsonlint.compile()?),
        WatchBinding::new(&["test"], filesets.test.compile()?),
        WatchBinding::new(&["sloc"], filesets.sloc.compile()?),
    ];

    if options.browser {
        bindings.push(WatchBinding::new(&["bundle"], filesets.bundle.compile()?));
    }
    if options.server {
        bindings.push(WatchBinding::new(&["server"], filesets.server.compile()?));
    }

    Ok(bindings)
}

/// The live-reload selection: changes here notify the dev server directly,
/// without running any task. Only active when both optional branches are
/// enabled.
pub fn reload_selection(
    options: &Options,
    filesets: &ResolvedFileSets,
) -> Result<Option<CompiledSelection>> {
    if options.server && options.browser {
        Ok(Some(filesets.reload.compile()?))
    } else {
        Ok(None)
    }
}
