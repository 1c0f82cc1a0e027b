// src/tools/backend.rs

//! Pluggable toolchain abstraction.
//!
//! The pipeline talks to a `Toolchain` instead of spawning processes
//! directly. This keeps the task actions testable: the production
//! implementation is [`super::process::ProcessToolchain`]; tests provide a
//! fake that records invocations and returns canned results.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use serde_json::Value;

use crate::errors::Result;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Exit status plus captured diagnostics from an external tool run.
#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub success: bool,
    /// Combined stdout/stderr, used for file/line detail in reports.
    pub detail: String,
}

/// One transpilation pass over the source tree.
#[derive(Debug, Clone)]
pub struct TranspileRequest {
    /// Root of the source tree to transpile.
    pub source_root: PathBuf,
    /// Output root mirroring the source tree.
    pub out_dir: PathBuf,
    /// Glob patterns to skip (tests, mocks).
    pub ignore: Vec<String>,
    /// Transpiler preset list, forwarded verbatim.
    pub presets: Vec<String>,
    /// Emit `.map` files next to each output file.
    pub source_maps: bool,
}

/// One in-memory source transform (the test runner's per-file hook).
#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub source: String,
    /// Original path, for diagnostics and source-map naming.
    pub filename: PathBuf,
    pub presets: Vec<String>,
    /// Preserve line numbers so stack traces and coverage map back.
    pub retain_lines: bool,
    /// Comment inserted before generated scaffolding so coverage tooling
    /// excludes it.
    pub auxiliary_comment_before: Option<String>,
}

/// One delegated test run. The runner command itself comes from the
/// toolchain's own configuration.
#[derive(Debug, Clone)]
pub struct TestRunSpec {
    /// Fully merged runner configuration, written out for the runner.
    pub config: Value,
    pub verbose: bool,
    /// Run test files one at a time instead of in parallel workers.
    pub serial: bool,
}

/// A bundler instance. The watch session keeps one alive across rebuilds so
/// unchanged modules are not re-processed; one-shot invocations create and
/// drop one per run.
pub trait Bundler: Send {
    /// Produce the bundle at the configured output path.
    fn bundle(&mut self) -> BoxFuture<'_, Result<()>>;
}

/// A running dev server accepting best-effort live-reload notifications.
pub trait DevServer: Send {
    /// Tell connected clients that `path` changed. Best-effort: failures are
    /// for the caller to log, never to propagate as a task failure.
    fn notify_changed(&mut self, path: &std::path::Path) -> BoxFuture<'_, Result<()>>;

    /// Whether the server process is still alive.
    fn is_running(&mut self) -> bool;

    /// Stop the server process.
    fn stop(&mut self) -> BoxFuture<'_, Result<()>>;
}

/// The full set of delegated-tool contracts.
pub trait Toolchain: Send + Sync {
    /// Run the external linter with the given rule-set file over `files`.
    fn lint(&self, ruleset: PathBuf, files: Vec<PathBuf>) -> BoxFuture<'_, Result<ToolStatus>>;

    /// Transpile the source tree into the output tree.
    fn transpile(&self, request: TranspileRequest) -> BoxFuture<'_, Result<()>>;

    /// Transform a single source text synchronously. Must be deterministic
    /// and perform no filesystem writes.
    fn transform(&self, request: TransformRequest) -> Result<String>;

    /// Create a bundler instance writing to `out_file`.
    fn new_bundler(&self, out_file: PathBuf) -> Result<Box<dyn Bundler>>;

    /// Minify `input` into `output`, with a source map.
    fn minify(&self, input: PathBuf, output: PathBuf) -> BoxFuture<'_, Result<()>>;

    /// Run the delegated test runner once. `Ok(true)` means all tests
    /// passed; `Ok(false)` means the runner reported failure.
    fn run_tests(&self, spec: TestRunSpec) -> BoxFuture<'_, Result<bool>>;

    /// Start the dev server child process.
    fn start_server(&self) -> BoxFuture<'_, Result<Box<dyn DevServer>>>;
}
