// src/fileset/mod.rs

//! File-set resolver: expands the six named glob patterns from
//! [`FileSetConfig`] into the include/exclude lists each task family
//! consumes.
//!
//! Exclusions are expressed by prefixing a pattern with `!`. Resolution is a
//! pure function of configuration; nothing is checked against the
//! filesystem, and an empty match set is legal (the task simply becomes a
//! no-op run).

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::model::FileSetConfig;
use crate::errors::{GantryError, Result};

/// Marker that turns a pattern into an exclusion.
const NEGATION: char = '!';

/// An include/exclude pattern list for one task family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl FileSelection {
    /// Split a flat pattern list on the `!` negation marker.
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = FileSelection::default();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            match pattern.strip_prefix(NEGATION) {
                Some(rest) => selection.exclude.push(rest.to_string()),
                None => selection.include.push(pattern.to_string()),
            }
        }
        selection
    }

    /// Compile into matchable glob sets. Invalid globs are a fatal
    /// configuration error.
    pub fn compile(&self) -> Result<CompiledSelection> {
        let include = build_globset(&self.include)?;
        let exclude = if self.exclude.is_empty() {
            None
        } else {
            Some(build_globset(&self.exclude)?)
        };
        Ok(CompiledSelection { include, exclude })
    }
}

/// Compiled form of a [`FileSelection`], matched against paths relative to
/// the project root (forward-slash separated).
#[derive(Clone)]
pub struct CompiledSelection {
    include: GlobSet,
    exclude: Option<GlobSet>,
}

impl fmt::Debug for CompiledSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSelection").finish_non_exhaustive()
    }
}

impl CompiledSelection {
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)
            .map_err(|e| GantryError::Config(format!("invalid glob pattern '{pat}': {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| GantryError::Config(format!("building glob set: {e}")))
}

/// The concrete input selection for every task family.
#[derive(Debug, Clone)]
pub struct ResolvedFileSets {
    /// All source except tests and mocks; input to transpilation.
    pub transpile: FileSelection,
    /// All source except tests, mocks and the server subtree; what the
    /// bundler may pull in.
    pub bundle: FileSelection,
    /// Non-test source, linted with the default rule set.
    pub eslint_default: FileSelection,
    /// Tests and mocks, linted with the test-framework rule set.
    pub eslint_jest: FileSelection,
    /// Config JSON files.
    pub jsonlint: FileSelection,
    /// Everything the test runner may load; also the coverage restriction.
    pub test: FileSelection,
    /// Config plus non-browser source; a change here restarts the server.
    pub server: FileSelection,
    /// Built/static assets whose change triggers a live-reload notify.
    pub reload: FileSelection,
    /// All source, for the line-count report.
    pub sloc: FileSelection,
}

/// Expand the named patterns into per-family selections.
///
/// Pure: the result depends only on `cfg`.
pub fn resolve(cfg: &FileSetConfig) -> ResolvedFileSets {
    let not = |p: &str| format!("{NEGATION}{p}");

    ResolvedFileSets {
        transpile: FileSelection::from_patterns([
            cfg.src.clone(),
            not(&cfg.tests),
            not(&cfg.mocks),
        ]),
        bundle: FileSelection::from_patterns([
            cfg.src.clone(),
            not(&cfg.tests),
            not(&cfg.mocks),
            not(&cfg.server),
        ]),
        eslint_default: FileSelection::from_patterns([
            cfg.src.clone(),
            not(&cfg.tests),
            not(&cfg.mocks),
        ]),
        eslint_jest: FileSelection::from_patterns([cfg.tests.clone(), cfg.mocks.clone()]),
        jsonlint: FileSelection::from_patterns([cfg.config.clone()]),
        test: FileSelection::from_patterns([cfg.src.clone()]),
        server: FileSelection::from_patterns([
            "config/*.*".to_string(),
            cfg.src.clone(),
            not(&cfg.tests),
            not(&cfg.mocks),
            not(&cfg.browser),
        ]),
        reload: FileSelection::from_patterns([
            "dist/**/*".to_string(),
            "public/**/*".to_string(),
            "views/**/*".to_string(),
        ]),
        sloc: FileSelection::from_patterns([cfg.src.clone()]),
    }
}

/// Collect all files under `root` matching the selection.
///
/// Missing `root` yields an empty list rather than an error; resolution never
/// requires inputs to exist.
pub fn collect_files(root: &Path, selection: &CompiledSelection) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if !root.is_dir() {
        return Ok(files);
    }

    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.is_file() {
                if let Ok(rel) = path.strip_prefix(root) {
                    let rel_str = rel.to_string_lossy().replace('\\', "/");
                    if selection.matches(&rel_str) {
                        files.push(path);
                    }
                }
            }
        }
    }

    files.sort();
    Ok(files)
}
