// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod fileset;
pub mod graph;
pub mod logging;
pub mod tasks;
pub mod tools;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::cli::CliArgs;
use crate::config::load_options;
use crate::errors::Result;
use crate::graph::{build_pipeline, run_task, ActionRunner, TaskGraph};
use crate::tasks::{preprocess, PipelineRunner};
use crate::tools::{ProcessToolchain, Toolchain};

/// High-level entry point used by `main.rs`.
///
/// Wires together config loading, graph construction, the production
/// toolchain and the requested mode: one-shot task, watch session, serve,
/// dry-run or the per-file preprocess hook.
pub async fn run(args: CliArgs) -> Result<()> {
    // The preprocess hook is invoked by the test runner once per file; it
    // must stay quiet on stdout apart from the transformed source.
    if let Some(file) = &args.preprocess {
        return run_preprocess(&args.config, file);
    }

    let options = load_options(&args.config)?;
    let graph = build_pipeline(&options)?;

    if args.dry_run {
        print_dry_run(&graph, &args.task);
        return Ok(());
    }

    let root = std::env::current_dir()?;
    let toolchain: Arc<dyn Toolchain> = Arc::new(ProcessToolchain::new(options.clone()));
    let runner = Arc::new(PipelineRunner::new(root.clone(), options, toolchain));
    let graph = Arc::new(graph);

    match args.task.as_str() {
        // `watch` is a session, not a graph node: it owns the watcher and
        // re-runs tasks until Ctrl-C.
        "watch" => watch::watch_session(root, graph, runner).await,

        // `serve` runs through the graph, then stays alive so the dev
        // server child keeps running.
        "serve" => {
            run_task(&graph, Arc::clone(&runner) as Arc<dyn ActionRunner>, "serve").await?;
            info!("dev server running; Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;
            Ok(())
        }

        task => run_task(&graph, runner as Arc<dyn ActionRunner>, task).await,
    }
}

/// Transform one source file and print the result on stdout.
fn run_preprocess(config_path: &str, file: &Path) -> Result<()> {
    let options = load_options(config_path)?;
    let toolchain = ProcessToolchain::new(options.clone());

    let source = std::fs::read_to_string(file)?;
    let output = preprocess::preprocess(
        &toolchain,
        &source,
        file,
        &options.transpile,
        options.test.preprocess_preset.as_deref(),
    )?;

    use std::io::Write;
    std::io::stdout().write_all(output.as_bytes())?;
    Ok(())
}

/// Simple dry-run output: print the validated graph, tasks and deps.
fn print_dry_run(graph: &TaskGraph, target: &str) {
    println!("gantry dry-run (target: {target})");
    println!();

    println!("tasks:");
    for task in graph.tasks() {
        let kind = if task.action.is_some() { "" } else { " (aggregator)" };
        println!("  - {}{kind}", task.name);
        if !task.deps.is_empty() {
            println!("      deps: {:?}", task.deps);
        }
    }

    if target == "watch" {
        println!();
        println!("watch is a session: it runs 'default' once, then re-runs tasks on change");
        return;
    }

    match graph.reachable_from(target) {
        Ok(reachable) => {
            let names: Vec<&str> = reachable.iter().map(|s| s.as_str()).collect();
            println!();
            println!("would run ({}): {:?}", names.len(), names);
        }
        Err(err) => {
            println!();
            println!("target not runnable: {err}");
        }
    }
}
