// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::merge::deep_merge;
use crate::config::model::Options;
use crate::errors::{GantryError, Result};

/// Load project options from a JSON file, deep-merged over defaults.
///
/// - A missing file is not an error: the project simply runs with all
///   defaults.
/// - A present-but-unparseable file is a fatal [`GantryError::Config`].
pub fn load_options(path: impl AsRef<Path>) -> Result<Options> {
    let path = path.as_ref();

    if !path.exists() {
        debug!(?path, "no config file; using defaults");
        return Ok(Options::default());
    }

    let contents = fs::read_to_string(path)?;
    let overrides: serde_json::Value = serde_json::from_str(&contents)
        .map_err(|e| GantryError::Config(format!("{}: {e}", path.display())))?;

    merge_over_defaults(overrides)
}

/// Merge a caller-supplied options value over the documented defaults and
/// deserialize the result.
///
/// This is the single place the right-biased merge law is applied to project
/// configuration, shared by the loader and by tests that build options from
/// literal JSON.
pub fn merge_over_defaults(overrides: serde_json::Value) -> Result<Options> {
    let mut base = serde_json::to_value(Options::default())
        .map_err(|e| GantryError::Config(format!("serializing default options: {e}")))?;

    deep_merge(&mut base, overrides);

    let options: Options = serde_json::from_value(base)
        .map_err(|e| GantryError::Config(format!("invalid options: {e}")))?;

    Ok(options)
}