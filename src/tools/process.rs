// src/tools/process.rs

//! Production toolchain: shells out to the configured external commands.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{anyhow, Context};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tracing::{debug, info, warn};

use crate::config::Options;
use crate::errors::{GantryError, Result};
use crate::tools::backend::{
    BoxFuture, Bundler, DevServer, TestRunSpec, Toolchain, ToolStatus, TransformRequest,
    TranspileRequest,
};

/// Toolchain implementation that delegates every operation to an external
/// process, with commands taken from the project options.
#[derive(Debug, Clone)]
pub struct ProcessToolchain {
    options: Options,
}

impl ProcessToolchain {
    pub fn new(options: Options) -> Self {
        Self { options }
    }
}

/// Build a `tokio::process::Command` from a configured command vector.
fn command_from(parts: &[String]) -> Result<Command> {
    let (program, args) = parts
        .split_first()
        .ok_or_else(|| GantryError::Config("empty tool command".to_string()))?;
    let mut cmd = Command::new(program);
    cmd.args(args);
    Ok(cmd)
}

static RUNNER_CONFIG_SEQ: AtomicU64 = AtomicU64::new(0);

/// A fresh path for one generated runner config. Overlapping test runs in a
/// watch session each get their own file, so one run's cleanup cannot pull
/// the config out from under another.
fn runner_config_path() -> PathBuf {
    std::env::temp_dir().join(format!(
        "gantry-test-config-{}-{}.json",
        std::process::id(),
        RUNNER_CONFIG_SEQ.fetch_add(1, Ordering::Relaxed)
    ))
}

/// Run a command to completion, capturing its combined output.
async fn run_to_status(mut cmd: Command, what: &str) -> Result<ToolStatus> {
    debug!(tool = %what, ?cmd, "running external tool");

    let output = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .with_context(|| format!("spawning {what}"))?;

    let mut detail = String::from_utf8_lossy(&output.stdout).into_owned();
    detail.push_str(&String::from_utf8_lossy(&output.stderr));

    Ok(ToolStatus {
        success: output.status.success(),
        detail: detail.trim().to_string(),
    })
}

impl Toolchain for ProcessToolchain {
    fn lint(&self, ruleset: PathBuf, files: Vec<PathBuf>) -> BoxFuture<'_, Result<ToolStatus>> {
        let parts = self.options.eslint.command.clone();
        Box::pin(async move {
            if files.is_empty() {
                // Empty match set: legal, no-op run.
                return Ok(ToolStatus {
                    success: true,
                    detail: String::new(),
                });
            }

            let mut cmd = command_from(&parts)?;
            cmd.arg("--config").arg(&ruleset);
            cmd.args(&files);
            run_to_status(cmd, "linter").await
        })
    }

    fn transpile(&self, request: TranspileRequest) -> BoxFuture<'_, Result<()>> {
        let parts = self.options.transpile.command.clone();
        Box::pin(async move {
            let mut cmd = command_from(&parts)?;
            cmd.arg(&request.source_root)
                .arg("--out-dir")
                .arg(&request.out_dir);
            if request.source_maps {
                cmd.arg("--source-maps");
            }
            if !request.ignore.is_empty() {
                cmd.arg("--ignore").arg(request.ignore.join(","));
            }
            for preset in &request.presets {
                cmd.arg("--presets").arg(preset);
            }

            let status = run_to_status(cmd, "transpiler").await?;
            if status.success {
                Ok(())
            } else {
                // Transpiler output carries the file/line detail.
                Err(GantryError::Other(anyhow!(
                    "transpile failed:\n{}",
                    status.detail
                )))
            }
        })
    }

    fn transform(&self, request: TransformRequest) -> Result<String> {
        // Synchronous by contract: invoked once per file by the test
        // runner's loader, which caches the output itself.
        let (program, args) = self
            .options
            .transpile
            .command
            .split_first()
            .ok_or_else(|| GantryError::Config("empty transpile command".to_string()))?;

        let mut cmd = std::process::Command::new(program);
        cmd.args(args);
        cmd.arg("--filename").arg(&request.filename);
        if request.retain_lines {
            cmd.arg("--retain-lines");
        }
        for preset in &request.presets {
            cmd.arg("--presets").arg(preset);
        }
        if let Some(marker) = &request.auxiliary_comment_before {
            cmd.arg("--auxiliary-comment-before").arg(marker);
        }

        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().context("spawning transpiler for transform")?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| GantryError::Other(anyhow!("transpiler stdin unavailable")))?;

        // The child can fill its stdout pipe before it has consumed all of
        // stdin, so the write must not block the output drain. Write on a
        // separate thread while `wait_with_output` reads both pipes.
        let source = request.source.clone();
        let writer = std::thread::spawn(move || {
            use std::io::Write;
            stdin.write_all(source.as_bytes())
        });

        let output = child
            .wait_with_output()
            .context("waiting for transpiler transform")?;

        let write_result = writer
            .join()
            .map_err(|_| GantryError::Other(anyhow!("transpiler stdin writer panicked")))?;

        if !output.status.success() {
            return Err(GantryError::Other(anyhow!(
                "transform of {} failed:\n{}",
                request.filename.display(),
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        // A write error on a successful child is still a broken transform.
        write_result.context("writing source to transpiler")?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn new_bundler(&self, out_file: PathBuf) -> Result<Box<dyn Bundler>> {
        Ok(Box::new(ProcessBundler {
            command: self.options.bundler.command.clone(),
            entries: self.options.bundler.entries.clone(),
            debug: self.options.bundler.debug,
            out_file,
        }))
    }

    fn minify(&self, input: PathBuf, output: PathBuf) -> BoxFuture<'_, Result<()>> {
        let parts = self.options.minify.command.clone();
        Box::pin(async move {
            let mut cmd = command_from(&parts)?;
            cmd.arg(&input)
                .arg("--compress")
                .arg("--mangle")
                .arg("--source-map")
                .arg("--output")
                .arg(&output);

            let status = run_to_status(cmd, "minifier").await?;
            if status.success {
                Ok(())
            } else {
                Err(GantryError::Bundle(format!("minify: {}", status.detail)))
            }
        })
    }

    fn run_tests(&self, spec: TestRunSpec) -> BoxFuture<'_, Result<bool>> {
        let parts = self.options.test.command.clone();
        Box::pin(async move {
            // The generated config is the runner's contract; hand it over as
            // a file so the runner parses it with its own JSON machinery.
            let config_path = runner_config_path();
            let config_bytes = serde_json::to_vec_pretty(&spec.config)
                .map_err(|e| GantryError::Other(anyhow!("serializing runner config: {e}")))?;
            tokio::fs::write(&config_path, config_bytes)
                .await
                .with_context(|| format!("writing runner config {}", config_path.display()))?;

            let mut cmd = command_from(&parts)?;
            cmd.arg("--config").arg(&config_path);
            if spec.verbose {
                cmd.arg("--verbose");
            }
            if spec.serial {
                cmd.arg("--runInBand");
            }

            let status = run_to_status(cmd, "test runner").await;

            if let Err(err) = tokio::fs::remove_file(&config_path).await {
                debug!(error = %err, "could not remove generated runner config");
            }

            let status = status?;
            if !status.detail.is_empty() {
                // Pass the runner's report through for the user.
                info!("test runner output:\n{}", status.detail);
            }
            Ok(status.success)
        })
    }

    fn start_server(&self) -> BoxFuture<'_, Result<Box<dyn DevServer>>> {
        let parts = self.options.serve.command.clone();
        Box::pin(async move {
            let mut cmd = command_from(&parts)?;
            cmd.stdin(Stdio::piped()).kill_on_drop(true);

            let mut child = cmd.spawn().context("spawning dev server")?;
            let stdin = child
                .stdin
                .take()
                .ok_or_else(|| GantryError::Other(anyhow!("dev server stdin unavailable")))?;

            info!("dev server started");
            Ok(Box::new(ProcessDevServer { child, stdin }) as Box<dyn DevServer>)
        })
    }
}

/// Bundler that invokes the external bundler command per build.
///
/// The instance is the unit of reuse: the watch session holds exactly one of
/// these for its whole lifetime, so a cache-capable bundler command keeps its
/// module-resolution state warm between rebuilds.
struct ProcessBundler {
    command: Vec<String>,
    entries: Vec<String>,
    debug: bool,
    out_file: PathBuf,
}

impl Bundler for ProcessBundler {
    fn bundle(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if let Some(parent) = self.out_file.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating {}", parent.display()))?;
            }

            let mut cmd = command_from(&self.command)?;
            cmd.args(&self.entries);
            if self.debug {
                cmd.arg("--debug");
            }
            cmd.arg("--outfile").arg(&self.out_file);

            let status = run_to_status(cmd, "bundler").await?;
            if status.success {
                info!(out = %self.out_file.display(), "bundle written");
                Ok(())
            } else {
                Err(GantryError::Bundle(status.detail))
            }
        })
    }
}

/// Dev server child process. Reload notifications are one JSON line on the
/// child's stdin; the server forwards them to connected clients.
struct ProcessDevServer {
    child: Child,
    stdin: ChildStdin,
}

impl DevServer for ProcessDevServer {
    fn notify_changed(&mut self, path: &Path) -> BoxFuture<'_, Result<()>> {
        let line = format!(
            "{}\n",
            serde_json::json!({ "changed": path.to_string_lossy() })
        );
        Box::pin(async move {
            self.stdin
                .write_all(line.as_bytes())
                .await
                .context("notifying dev server")?;
            Ok(())
        })
    }

    fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    fn stop(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if let Err(err) = self.child.kill().await {
                warn!(error = %err, "failed to kill dev server");
            }
            Ok(())
        })
    }
}
