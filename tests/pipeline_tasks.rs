// tests/pipeline_tasks.rs

//! End-to-end task runs over the real pipeline graph with a fake toolchain.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use gantry::errors::GantryError;
use gantry::graph::{build_pipeline, run_task, ActionRunner};
use gantry::tasks::PipelineRunner;
use gantry::tools::Toolchain;
use gantry_test_utils::builders::OptionsBuilder;
use gantry_test_utils::fake_toolchain::{FakeToolchain, ToolCall};
use gantry_test_utils::{init_tracing, with_timeout};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

fn project_with_source() -> Result<TempDir, Box<dyn Error>> {
    let dir = TempDir::new()?;
    std::fs::create_dir_all(dir.path().join("src/browser"))?;
    std::fs::write(dir.path().join("src/app.js"), "module.exports = 1;\n")?;
    std::fs::write(dir.path().join("src/browser/index.js"), "require('../app');\n")?;
    Ok(dir)
}

struct Harness {
    _dir: TempDir,
    toolchain: Arc<FakeToolchain>,
    runner: Arc<PipelineRunner>,
}

fn harness(
    toolchain: FakeToolchain,
    options: gantry::config::Options,
) -> Result<Harness, Box<dyn Error>> {
    let dir = project_with_source()?;
    let toolchain = Arc::new(toolchain);
    let dyn_toolchain: Arc<dyn Toolchain> = Arc::clone(&toolchain) as Arc<dyn Toolchain>;
    let runner = Arc::new(PipelineRunner::new(
        dir.path().to_path_buf(),
        options,
        dyn_toolchain,
    ));
    Ok(Harness {
        _dir: dir,
        toolchain,
        runner,
    })
}

#[tokio::test]
async fn bundler_instance_is_reused_across_runs() -> TestResult {
    init_tracing();
    let options = OptionsBuilder::new().build();
    let h = harness(FakeToolchain::new(), options.clone())?;
    let graph = build_pipeline(&options)?;

    for _ in 0..2 {
        with_timeout(run_task(
            &graph,
            Arc::clone(&h.runner) as Arc<dyn ActionRunner>,
            "bundle",
        ))
        .await?;
    }

    assert_eq!(h.toolchain.bundler_instances(), 1);
    assert_eq!(h.toolchain.bundle_count(), 2);
    Ok(())
}

#[tokio::test]
async fn disabled_browser_makes_build_skip_bundling() -> TestResult {
    init_tracing();
    let options = OptionsBuilder::new().browser(false).build();
    let h = harness(FakeToolchain::new(), options.clone())?;
    let graph = build_pipeline(&options)?;

    with_timeout(run_task(
        &graph,
        Arc::clone(&h.runner) as Arc<dyn ActionRunner>,
        "build",
    ))
    .await?;

    let calls = h.toolchain.calls();
    assert!(calls
        .iter()
        .any(|c| matches!(c, ToolCall::Transpile(_))));
    assert!(!calls.iter().any(|c| matches!(
        c,
        ToolCall::Bundle | ToolCall::NewBundler { .. } | ToolCall::Minify { .. }
    )));
    Ok(())
}

#[tokio::test]
async fn bundle_failure_surfaces_as_bundle_error() -> TestResult {
    init_tracing();
    let options = OptionsBuilder::new().build();
    let h = harness(FakeToolchain::failing_bundle("parse error"), options.clone())?;
    let graph = build_pipeline(&options)?;

    let err = with_timeout(run_task(
        &graph,
        Arc::clone(&h.runner) as Arc<dyn ActionRunner>,
        "bundle",
    ))
    .await
    .expect_err("bundle fails");

    assert!(matches!(err, GantryError::Bundle(detail) if detail == "parse error"));
    Ok(())
}

#[tokio::test]
async fn failed_test_run_uses_the_fixed_message() -> TestResult {
    init_tracing();
    let options = OptionsBuilder::new().build();
    let h = harness(FakeToolchain::failing_tests(), options.clone())?;
    let graph = build_pipeline(&options)?;

    let err = with_timeout(run_task(
        &graph,
        Arc::clone(&h.runner) as Arc<dyn ActionRunner>,
        "test",
    ))
    .await
    .expect_err("test run fails");

    match err {
        GantryError::TestFailure(message) => assert_eq!(message, "Test Failed"),
        other => panic!("expected TestFailure, got {other}"),
    }

    // `test` reaches lint and sloc only; bundling is not in its subgraph.
    assert!(!h.toolchain.calls().iter().any(|c| matches!(
        c,
        ToolCall::Bundle | ToolCall::NewBundler { .. }
    )));
    Ok(())
}

#[tokio::test]
async fn failing_tests_do_not_block_the_build_branch() -> TestResult {
    init_tracing();
    let options = OptionsBuilder::new().build();
    let h = harness(FakeToolchain::failing_tests(), options.clone())?;
    let graph = build_pipeline(&options)?;

    let err = with_timeout(run_task(
        &graph,
        Arc::clone(&h.runner) as Arc<dyn ActionRunner>,
        "default",
    ))
    .await
    .expect_err("default fails through test");

    assert!(matches!(err, GantryError::TaskFailed { ref task, .. } if task == "default"));
    // The independent build branch still ran to completion.
    let calls = h.toolchain.calls();
    assert!(calls.iter().any(|c| matches!(c, ToolCall::Transpile(_))));
    assert!(calls.iter().any(|c| matches!(c, ToolCall::Bundle)));
    Ok(())
}

#[tokio::test]
async fn lint_violations_fail_the_lint_task() -> TestResult {
    init_tracing();
    let options = OptionsBuilder::new().build();
    let h = harness(FakeToolchain::failing_lint("2 problems"), options.clone())?;
    let graph = build_pipeline(&options)?;

    let err = with_timeout(run_task(
        &graph,
        Arc::clone(&h.runner) as Arc<dyn ActionRunner>,
        "eslint:default",
    ))
    .await
    .expect_err("lint fails");

    match err {
        GantryError::Lint { ruleset, detail } => {
            assert_eq!(ruleset, "default");
            assert_eq!(detail, "2 problems");
        }
        other => panic!("expected Lint, got {other}"),
    }
    Ok(())
}

#[tokio::test]
async fn rerunning_server_restarts_the_child() -> TestResult {
    init_tracing();
    let options = OptionsBuilder::new().build();
    let h = harness(FakeToolchain::new(), options.clone())?;
    let graph = build_pipeline(&options)?;

    for _ in 0..2 {
        with_timeout(run_task(
            &graph,
            Arc::clone(&h.runner) as Arc<dyn ActionRunner>,
            "server",
        ))
        .await?;
    }

    let calls = h.toolchain.calls();
    let starts = calls
        .iter()
        .filter(|c| matches!(c, ToolCall::StartServer))
        .count();
    let stops = calls
        .iter()
        .filter(|c| matches!(c, ToolCall::StopServer))
        .count();
    assert_eq!(starts, 2);
    assert_eq!(stops, 1);
    Ok(())
}

#[tokio::test]
async fn reload_notify_reaches_a_running_server() -> TestResult {
    init_tracing();
    let options = OptionsBuilder::new().build();
    let h = harness(FakeToolchain::new(), options.clone())?;
    let graph = build_pipeline(&options)?;

    with_timeout(run_task(
        &graph,
        Arc::clone(&h.runner) as Arc<dyn ActionRunner>,
        "server",
    ))
    .await?;

    h.runner.notify_reload(Path::new("dist/js/browser.js")).await;

    assert!(h
        .toolchain
        .calls()
        .iter()
        .any(|c| matches!(c, ToolCall::NotifyChanged(p) if p == Path::new("dist/js/browser.js"))));
    Ok(())
}

#[tokio::test]
async fn reload_notify_without_server_is_a_silent_no_op() -> TestResult {
    init_tracing();
    let options = OptionsBuilder::new().build();
    let h = harness(FakeToolchain::new(), options)?;

    // No server task has run; must not error or record anything.
    h.runner.notify_reload(Path::new("dist/js/browser.js")).await;

    assert!(h.toolchain.calls().is_empty());
    Ok(())
}
