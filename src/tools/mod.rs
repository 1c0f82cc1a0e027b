// src/tools/mod.rs

//! Contracts to the delegated external tools.
//!
//! Everything that does real work (linting, transpiling, bundling, testing,
//! serving) happens outside this crate.
//! [`backend`] defines the trait surface the pipeline talks to; [`process`]
//! is the production implementation that shells out to the configured
//! commands. Tests swap in a recording fake.

pub mod backend;
pub mod process;

pub use backend::{
    BoxFuture, Bundler, DevServer, TestRunSpec, Toolchain, ToolStatus, TransformRequest,
    TranspileRequest,
};
pub use process::ProcessToolchain;
