// src/tasks/transpile.rs

//! Transpilation of the source tree into the output tree.

use std::path::Path;
use std::sync::Arc;

use crate::config::Options;
use crate::errors::Result;
use crate::fileset::ResolvedFileSets;
use crate::tools::{Toolchain, TranspileRequest};

/// Transpile everything in the transpile file set into `out.lib`, with
/// source maps when configured.
///
/// Ordering with reconciliation is a graph edge: `transpile` depends on
/// `sync-output`, so the output tree is consistent before we write into it.
pub async fn transpile(
    toolchain: &Arc<dyn Toolchain>,
    root: &Path,
    options: &Options,
    filesets: &ResolvedFileSets,
) -> Result<()> {
    let request = TranspileRequest {
        source_root: root.join(&options.out.src),
        out_dir: root.join(&options.out.lib),
        ignore: filesets.transpile.exclude.clone(),
        presets: options.transpile.presets.clone(),
        source_maps: options.transpile.source_maps,
    };

    toolchain.transpile(request).await
}
