// src/tasks/preprocess.rs

//! Source-transform preprocessor: the hook the delegated test runner calls
//! once per file before executing it.
//!
//! Deterministic and side-effect-free; the runner caches the output, not us.

use std::path::Path;

use crate::config::TranspileOptions;
use crate::errors::Result;
use crate::tools::{Toolchain, TransformRequest};

/// Files under this directory are assumed already consumable and pass
/// through untouched.
pub const DEPENDENCY_ROOT: &str = "node_modules";

/// Marker comment inserted before generated scaffolding so coverage tooling
/// excludes it.
pub const COVERAGE_MARKER: &str = "istanbul ignore next";

/// Transform `source` for execution by the test runner.
///
/// - Paths under [`DEPENDENCY_ROOT`] are returned unchanged.
/// - Everything else goes through the transpiler with the shared transpile
///   config, the optional test-framework preset prefixed to the caller's
///   preset list, line numbers retained, and the coverage marker enabled.
pub fn preprocess(
    toolchain: &dyn Toolchain,
    source: &str,
    path: &Path,
    transpile: &TranspileOptions,
    test_preset: Option<&str>,
) -> Result<String> {
    if path
        .components()
        .any(|c| c.as_os_str() == DEPENDENCY_ROOT)
    {
        return Ok(source.to_string());
    }

    let mut presets = Vec::with_capacity(transpile.presets.len() + 1);
    if let Some(preset) = test_preset {
        presets.push(preset.to_string());
    }
    presets.extend(transpile.presets.iter().cloned());

    toolchain.transform(TransformRequest {
        source: source.to_string(),
        filename: path.to_path_buf(),
        presets,
        retain_lines: true,
        auxiliary_comment_before: Some(COVERAGE_MARKER.to_string()),
    })
}
