//! A recording toolchain fake: every call lands in a shared log, results are
//! canned, and nothing touches the filesystem or spawns processes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gantry::errors::{GantryError, Result};
use gantry::tools::{
    BoxFuture, Bundler, DevServer, TestRunSpec, Toolchain, ToolStatus, TransformRequest,
    TranspileRequest,
};

/// One recorded toolchain invocation.
#[derive(Debug, Clone)]
pub enum ToolCall {
    Lint { ruleset: PathBuf, files: Vec<PathBuf> },
    Transpile(TranspileRequest),
    Transform(TransformRequest),
    NewBundler { out_file: PathBuf },
    Bundle,
    Minify { input: PathBuf, output: PathBuf },
    RunTests(TestRunSpec),
    StartServer,
    NotifyChanged(PathBuf),
    StopServer,
}

/// Fake [`Toolchain`] for tests.
///
/// All operations succeed by default; use the `failing_*` constructors (or
/// tweak the public fields before wrapping in an `Arc`) to exercise error
/// paths. `calls()` returns the invocation log in order.
pub struct FakeToolchain {
    calls: Arc<Mutex<Vec<ToolCall>>>,
    bundle_count: Arc<AtomicUsize>,
    pub lint_failure: Option<String>,
    pub bundle_failure: Option<String>,
    pub tests_pass: bool,
}

impl Default for FakeToolchain {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            bundle_count: Arc::new(AtomicUsize::new(0)),
            lint_failure: None,
            bundle_failure: None,
            tests_pass: true,
        }
    }

    /// All lint runs report violations with the given detail.
    pub fn failing_lint(detail: &str) -> Self {
        Self {
            lint_failure: Some(detail.to_string()),
            ..Self::new()
        }
    }

    /// All bundle attempts fail with the given message.
    pub fn failing_bundle(message: &str) -> Self {
        Self {
            bundle_failure: Some(message.to_string()),
            ..Self::new()
        }
    }

    /// The test runner reports failure on every run.
    pub fn failing_tests() -> Self {
        Self {
            tests_pass: false,
            ..Self::new()
        }
    }

    /// Snapshot of the invocation log, in call order.
    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Total number of `bundle()` invocations across all bundler instances.
    pub fn bundle_count(&self) -> usize {
        self.bundle_count.load(Ordering::SeqCst)
    }

    /// Number of bundler instances created.
    pub fn bundler_instances(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, ToolCall::NewBundler { .. }))
            .count()
    }

    fn record(&self, call: ToolCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Toolchain for FakeToolchain {
    fn lint(&self, ruleset: PathBuf, files: Vec<PathBuf>) -> BoxFuture<'_, Result<ToolStatus>> {
        self.record(ToolCall::Lint {
            ruleset,
            files,
        });
        let result = match &self.lint_failure {
            Some(detail) => ToolStatus {
                success: false,
                detail: detail.clone(),
            },
            None => ToolStatus {
                success: true,
                detail: String::new(),
            },
        };
        Box::pin(async move { Ok(result) })
    }

    fn transpile(&self, request: TranspileRequest) -> BoxFuture<'_, Result<()>> {
        self.record(ToolCall::Transpile(request));
        Box::pin(async { Ok(()) })
    }

    fn transform(&self, request: TransformRequest) -> Result<String> {
        self.record(ToolCall::Transform(request.clone()));

        // Deterministic output so tests can assert on structure.
        let mut out = String::new();
        if let Some(comment) = &request.auxiliary_comment_before {
            out.push_str(&format!("/* {comment} */\n"));
        }
        if !request.presets.is_empty() {
            out.push_str(&format!("// presets: {}\n", request.presets.join(",")));
        }
        out.push_str(&request.source);
        Ok(out)
    }

    fn new_bundler(&self, out_file: PathBuf) -> Result<Box<dyn Bundler>> {
        self.record(ToolCall::NewBundler {
            out_file,
        });
        Ok(Box::new(FakeBundler {
            calls: Arc::clone(&self.calls),
            bundle_count: Arc::clone(&self.bundle_count),
            failure: self.bundle_failure.clone(),
        }))
    }

    fn minify(&self, input: PathBuf, output: PathBuf) -> BoxFuture<'_, Result<()>> {
        self.record(ToolCall::Minify { input, output });
        Box::pin(async { Ok(()) })
    }

    fn run_tests(&self, spec: TestRunSpec) -> BoxFuture<'_, Result<bool>> {
        self.record(ToolCall::RunTests(spec));
        let pass = self.tests_pass;
        Box::pin(async move { Ok(pass) })
    }

    fn start_server(&self) -> BoxFuture<'_, Result<Box<dyn DevServer>>> {
        self.record(ToolCall::StartServer);
        let server = FakeDevServer {
            calls: Arc::clone(&self.calls),
            running: AtomicBool::new(true),
        };
        Box::pin(async move { Ok(Box::new(server) as Box<dyn DevServer>) })
    }
}

struct FakeBundler {
    calls: Arc<Mutex<Vec<ToolCall>>>,
    bundle_count: Arc<AtomicUsize>,
    failure: Option<String>,
}

impl Bundler for FakeBundler {
    fn bundle(&mut self) -> BoxFuture<'_, Result<()>> {
        self.calls.lock().unwrap().push(ToolCall::Bundle);
        self.bundle_count.fetch_add(1, Ordering::SeqCst);
        let result = match &self.failure {
            Some(message) => Err(GantryError::Bundle(message.clone())),
            None => Ok(()),
        };
        Box::pin(async move { result })
    }
}

struct FakeDevServer {
    calls: Arc<Mutex<Vec<ToolCall>>>,
    running: AtomicBool,
}

impl DevServer for FakeDevServer {
    fn notify_changed(&mut self, path: &Path) -> BoxFuture<'_, Result<()>> {
        self.calls
            .lock()
            .unwrap()
            .push(ToolCall::NotifyChanged(path.to_path_buf()));
        Box::pin(async { Ok(()) })
    }

    fn is_running(&mut self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn stop(&mut self) -> BoxFuture<'_, Result<()>> {
        self.calls.lock().unwrap().push(ToolCall::StopServer);
        self.running.store(false, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }
}
