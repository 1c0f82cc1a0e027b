// src/config/mod.rs

//! Project configuration: typed options, defaults, and the deep-merge loader.

pub mod loader;
pub mod merge;
pub mod model;

pub use loader::{load_options, merge_over_defaults};
pub use merge::deep_merge;
pub use model::{
    BundlerOptions, EslintOptions, FileSetConfig, MinifyOptions, Options, OutputRoots,
    ServeOptions, TestOptions, TranspileOptions,
};
