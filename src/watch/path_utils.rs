// src/watch/path_utils.rs

//! Path normalization for watcher events.

use std::path::Path;

/// Convert an event path into a root-relative, forward-slash string.
///
/// Event paths are usually absolute and may go through symlinked prefixes
/// (notably on macOS), so a failed direct `strip_prefix` falls back to
/// canonicalizing both sides before giving up.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(rel.to_string_lossy().replace('\\', "/"));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn strips_root_prefix() {
        let root = PathBuf::from("/project");
        let path = PathBuf::from("/project/src/app.js");
        assert_eq!(relative_str(&root, &path).as_deref(), Some("src/app.js"));
    }

    #[test]
    fn unrelated_path_is_none() {
        let root = PathBuf::from("/project");
        let path = PathBuf::from("/elsewhere/app.js");
        assert_eq!(relative_str(&root, &path), None);
    }
}
