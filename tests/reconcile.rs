// tests/reconcile.rs

//! Stale-artifact reconciliation against a real temp filesystem.

use std::error::Error;
use std::fs;
use std::path::Path;

use gantry::tasks::reconcile::sync_output;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

fn touch(path: &Path) -> TestResult {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, "x")?;
    Ok(())
}

#[test]
fn orphaned_output_is_deleted_survivors_stay() -> TestResult {
    let dir = TempDir::new()?;
    let src = dir.path().join("src");
    let lib = dir.path().join("lib");

    touch(&src.join("a.js"))?;
    touch(&lib.join("a.js"))?;
    touch(&lib.join("b.js"))?;

    sync_output(&lib, &src)?;

    assert!(lib.join("a.js").exists());
    assert!(!lib.join("b.js").exists());
    Ok(())
}

#[test]
fn map_files_share_their_base_files_fate() -> TestResult {
    let dir = TempDir::new()?;
    let src = dir.path().join("src");
    let lib = dir.path().join("lib");

    touch(&src.join("a.js"))?;
    touch(&lib.join("a.js"))?;
    touch(&lib.join("a.js.map"))?;
    touch(&lib.join("b.js"))?;
    touch(&lib.join("b.js.map"))?;

    sync_output(&lib, &src)?;

    assert!(lib.join("a.js.map").exists());
    assert!(!lib.join("b.js").exists());
    assert!(!lib.join("b.js.map").exists());
    Ok(())
}

#[test]
fn orphaned_directories_are_removed_after_their_children() -> TestResult {
    let dir = TempDir::new()?;
    let src = dir.path().join("src");
    let lib = dir.path().join("lib");

    fs::create_dir_all(&src)?;
    touch(&lib.join("gone/deep/x.js"))?;

    sync_output(&lib, &src)?;

    assert!(!lib.join("gone").exists());
    assert!(lib.exists());
    Ok(())
}

#[test]
fn directory_with_surviving_children_is_kept() -> TestResult {
    let dir = TempDir::new()?;
    let src = dir.path().join("src");
    let lib = dir.path().join("lib");

    touch(&src.join("sub/a.js"))?;
    touch(&lib.join("sub/a.js"))?;
    touch(&lib.join("sub/b.js"))?;

    sync_output(&lib, &src)?;

    assert!(lib.join("sub/a.js").exists());
    assert!(!lib.join("sub/b.js").exists());
    Ok(())
}

#[test]
fn missing_output_root_is_success() -> TestResult {
    let dir = TempDir::new()?;
    let src = dir.path().join("src");
    touch(&src.join("a.js"))?;

    sync_output(&dir.path().join("lib"), &src)?;
    Ok(())
}

#[cfg(unix)]
#[test]
fn io_error_aborts_the_whole_pass() -> TestResult {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new()?;
    let src = dir.path().join("src");
    let lib = dir.path().join("lib");
    fs::create_dir_all(&src)?;
    touch(&lib.join("locked/probe.js"))?;
    touch(&lib.join("locked/x.js"))?;

    let locked = lib.join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555))?;

    // Root is not bound by directory write bits; the scenario cannot be
    // produced then, so there is nothing to assert.
    if fs::remove_file(locked.join("probe.js")).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;
        return Ok(());
    }

    let err = sync_output(&lib, &src).expect_err("orphan removal must fail");
    assert!(matches!(err, gantry::errors::GantryError::Io(_)));
    // The failing entry was left in place, not skipped over.
    assert!(locked.join("x.js").exists());

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[test]
fn reconciliation_is_idempotent() -> TestResult {
    let dir = TempDir::new()?;
    let src = dir.path().join("src");
    let lib = dir.path().join("lib");

    touch(&src.join("a.js"))?;
    touch(&lib.join("a.js"))?;
    touch(&lib.join("b.js"))?;

    sync_output(&lib, &src)?;
    sync_output(&lib, &src)?;

    assert!(lib.join("a.js").exists());
    assert!(!lib.join("b.js").exists());
    Ok(())
}
