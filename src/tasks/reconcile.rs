// src/tasks/reconcile.rs

//! Stale-artifact reconciliation.
//!
//! The transpiler only ever writes into the output tree; nothing removes
//! entries whose source file was deleted or renamed. This pass walks the
//! compiled-output root, derives each entry's expected source counterpart
//! (output prefix swapped for the source root, trailing `.map` stripped) and
//! deletes orphans. It must complete before transpilation writes fresh files
//! into the same tree.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::Result;

/// One enumerated entry in the output tree.
#[derive(Debug, Clone)]
struct ReconcileEntry {
    path: PathBuf,
    is_dir: bool,
}

/// Delete every output entry whose derived source path is missing.
///
/// - A missing `out_root` is success with no action.
/// - Enumeration lists children before their directory, so orphaned
///   directories are empty by the time their turn comes.
/// - The first I/O error aborts the whole pass: a partially cleaned tree
///   would mask stale files.
pub fn sync_output(out_root: &Path, src_root: &Path) -> Result<()> {
    if !out_root.exists() {
        debug!(out = %out_root.display(), "no output tree; nothing to reconcile");
        return Ok(());
    }

    let entries = enumerate(out_root)?;

    for entry in entries {
        let expected = expected_source(&entry.path, out_root, src_root);
        if expected.exists() {
            continue;
        }

        info!("rm {}", entry.path.display());
        if entry.is_dir {
            // Children were processed first; a non-empty directory here
            // still holds live outputs and must stay.
            if std::fs::read_dir(&entry.path)?.next().is_none() {
                std::fs::remove_dir(&entry.path)?;
            }
        } else {
            std::fs::remove_file(&entry.path)?;
        }
    }

    Ok(())
}

/// Flat listing of the tree under `dir`: for each subdirectory, its children
/// first, then the directory itself.
fn enumerate(dir: &Path) -> Result<Vec<ReconcileEntry>> {
    let mut entries = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            entries.extend(enumerate(&path)?);
            entries.push(ReconcileEntry { path, is_dir: true });
        } else {
            entries.push(ReconcileEntry {
                path,
                is_dir: false,
            });
        }
    }

    Ok(entries)
}

/// Map an output path to the source path that would justify its existence.
fn expected_source(out_path: &Path, out_root: &Path, src_root: &Path) -> PathBuf {
    let rel = out_path.strip_prefix(out_root).unwrap_or(out_path);

    let rel_str = rel.to_string_lossy();
    let rel_str = rel_str.strip_suffix(".map").unwrap_or(&rel_str);

    src_root.join(rel_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_suffix_is_stripped() {
        let expected = expected_source(
            Path::new("lib/app/index.js.map"),
            Path::new("lib"),
            Path::new("src"),
        );
        assert_eq!(expected, Path::new("src/app/index.js"));
    }

    #[test]
    fn plain_files_keep_their_relative_path() {
        let expected = expected_source(
            Path::new("lib/app/index.js"),
            Path::new("lib"),
            Path::new("src"),
        );
        assert_eq!(expected, Path::new("src/app/index.js"));
    }
}
