// src/tasks/mod.rs

//! Task actions and the production [`ActionRunner`].
//!
//! [`PipelineRunner`] owns everything an action needs: the merged options,
//! the resolved file sets, the toolchain, the incremental bundler slot and
//! the dev-server handle. One runner lives for a whole session (one-shot or
//! watch), which is exactly the lifetime the incremental bundle state and
//! the server child need.

pub mod lint;
pub mod preprocess;
pub mod reconcile;
pub mod sloc;
pub mod transpile;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::Options;
use crate::errors::{GantryError, Result};
use crate::fileset::{self, ResolvedFileSets};
use crate::graph::{ActionRunner, TaskAction};
use crate::tools::{Bundler, DevServer, Toolchain};

/// Bundle output file names under `out.dist`.
pub const BUNDLE_FILE: &str = "browser.js";
pub const BUNDLE_MIN_FILE: &str = "browser.min.js";

/// Production action runner.
pub struct PipelineRunner {
    root: PathBuf,
    options: Options,
    filesets: ResolvedFileSets,
    toolchain: Arc<dyn Toolchain>,
    /// Incremental bundle state: created on first use, reused for every
    /// rebuild in this session, dropped with the runner.
    bundler: Mutex<Option<Box<dyn Bundler>>>,
    /// The running dev server, if any.
    server: Mutex<Option<Box<dyn DevServer>>>,
}

impl PipelineRunner {
    pub fn new(root: PathBuf, options: Options, toolchain: Arc<dyn Toolchain>) -> Self {
        let filesets = fileset::resolve(&options.src);
        Self {
            root,
            options,
            filesets,
            toolchain,
            bundler: Mutex::new(None),
            server: Mutex::new(None),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn filesets(&self) -> &ResolvedFileSets {
        &self.filesets
    }

    /// Best-effort live-reload notification. Failures are logged, never
    /// propagated: a missed refresh must not fail a build.
    pub async fn notify_reload(&self, path: &Path) {
        let mut slot = self.server.lock().await;
        let Some(server) = slot.as_mut() else {
            debug!("no dev server running; skipping reload notify");
            return;
        };

        if !server.is_running() {
            debug!("dev server exited; skipping reload notify");
            return;
        }

        if let Err(err) = server.notify_changed(path).await {
            warn!(error = %err, path = %path.display(), "reload notify failed");
        }
    }

    async fn run_bundle(&self) -> Result<()> {
        let out_file = self.root.join(&self.options.out.dist).join(BUNDLE_FILE);
        let mut slot = self.bundler.lock().await;

        match &mut *slot {
            Some(bundler) => bundler.bundle().await,
            None => {
                let mut bundler = self.toolchain.new_bundler(out_file)?;
                let result = bundler.bundle().await;
                *slot = Some(bundler);
                result
            }
        }
    }

    async fn run_minify(&self) -> Result<()> {
        let dist = self.root.join(&self.options.out.dist);
        self.toolchain
            .minify(dist.join(BUNDLE_FILE), dist.join(BUNDLE_MIN_FILE))
            .await
    }

    async fn run_server(&self) -> Result<()> {
        let mut slot = self.server.lock().await;

        // Re-running the task restarts the server (watch mode re-triggers it
        // when server-side source changes).
        if let Some(existing) = slot.as_mut() {
            debug!("stopping previous dev server instance");
            let _ = existing.stop().await;
        }

        *slot = Some(self.toolchain.start_server().await?);
        Ok(())
    }

    async fn run_sync_output(&self) -> Result<()> {
        let out_root = self.root.join(&self.options.out.lib);
        let src_root = self.root.join(&self.options.out.src);
        tokio::task::spawn_blocking(move || reconcile::sync_output(&out_root, &src_root))
            .await
            .map_err(|e| GantryError::Other(anyhow::anyhow!("reconciler panicked: {e}")))?
    }

    async fn run_sloc(&self) -> Result<()> {
        let root = self.root.clone();
        let selection = self.filesets.sloc.clone();
        tokio::task::spawn_blocking(move || sloc::count_lines(&root, &selection))
            .await
            .map_err(|e| GantryError::Other(anyhow::anyhow!("sloc panicked: {e}")))?
            .map(|_| ())
    }
}

impl ActionRunner for PipelineRunner {
    fn run(
        &self,
        task: &str,
        action: TaskAction,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let task = task.to_string();
        Box::pin(async move {
            debug!(task = %task, ?action, "running action");
            match action {
                TaskAction::EslintDefault => {
                    lint::eslint(
                        &self.toolchain,
                        &self.root,
                        "default",
                        &self.options.eslint.default,
                        &self.filesets.eslint_default,
                    )
                    .await
                }
                TaskAction::EslintJest => {
                    lint::eslint(
                        &self.toolchain,
                        &self.root,
                        "jest",
                        &self.options.eslint.jest,
                        &self.filesets.eslint_jest,
                    )
                    .await
                }
                TaskAction::Jsonlint => {
                    lint::jsonlint(&self.root, &self.filesets.jsonlint).await
                }
                TaskAction::SyncOutput => self.run_sync_output().await,
                TaskAction::Transpile => {
                    transpile::transpile(&self.toolchain, &self.root, &self.options, &self.filesets)
                        .await
                }
                TaskAction::Bundle => self.run_bundle().await,
                TaskAction::Minify => self.run_minify().await,
                TaskAction::Test => {
                    test::run(&self.toolchain, &self.options, &self.filesets).await
                }
                TaskAction::Server => self.run_server().await,
                TaskAction::Sloc => self.run_sloc().await,
            }
        })
    }
}
