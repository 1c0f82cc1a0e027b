// src/tasks/sloc.rs

//! Source line counting, reported through the log.

use std::path::Path;

use tracing::info;

use crate::errors::Result;
use crate::fileset::{self, FileSelection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlocReport {
    pub files: usize,
    pub lines: usize,
}

/// Count lines over a file selection and log a summary.
pub fn count_lines(root: &Path, selection: &FileSelection) -> Result<SlocReport> {
    let compiled = selection.compile()?;
    let files = fileset::collect_files(root, &compiled)?;

    let mut report = SlocReport {
        files: files.len(),
        lines: 0,
    };

    for path in &files {
        let contents = std::fs::read_to_string(path)?;
        report.lines += contents.lines().count();
    }

    info!(files = report.files, lines = report.lines, "source line count");
    Ok(report)
}
