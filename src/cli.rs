// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `gantry`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gantry",
    version,
    about = "Orchestrate lint, transpile, bundle, test and serve tasks for a JS project.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run: default, build, test, lint, serve, watch, production,
    /// or any internal task name (eslint, jsonlint, transpile, bundle,
    /// minify, sync-output, server, sloc).
    #[arg(value_name = "TASK", default_value = "default")]
    pub task: String,

    /// Path to the project config file (JSON).
    ///
    /// Default: `gantry.json` in the current working directory. A missing
    /// file just means "all defaults".
    #[arg(long, value_name = "PATH", default_value = "gantry.json")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `GANTRY_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the task graph, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Transform a single source file and print the result on stdout.
    ///
    /// This is the per-file hook the delegated test runner invokes before
    /// executing a file. Takes precedence over TASK when given.
    #[arg(long, value_name = "FILE")]
    pub preprocess: Option<PathBuf>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
