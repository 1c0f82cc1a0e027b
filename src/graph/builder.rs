// src/graph/builder.rs

//! The parameterized pipeline builder.
//!
//! One graph shape, two toggles. The `browser` and `server` options decide
//! whether the bundling/minification and dev-server tasks carry actions;
//! disabled branches keep their place in the graph as pure no-ops so that
//! aggregates like `build` keep working unchanged.

use crate::config::Options;
use crate::errors::Result;
use crate::graph::{TaskAction, TaskGraph};

/// Build the full pipeline graph for the given options.
pub fn build_pipeline(options: &Options) -> Result<TaskGraph> {
    let browser = options.browser.then_some(());
    let server = options.server.then_some(());

    TaskGraph::builder()
        // Meta-tasks: pure aggregations.
        .task("default", &["build", "test", "sloc"], None)
        .task("build", &["transpile", "bundle", "sloc"], None)
        .task("production", &["test", "build", "minify"], None)
        .task("lint", &["jsonlint", "eslint", "sloc"], None)
        .task("eslint", &["eslint:default", "eslint:jest"], None)
        .task("serve", &["server"], None)
        // `watch` is a session, not an action; the CLI layer intercepts it.
        .task("watch", &[], None)
        // Leaves.
        .task("eslint:default", &[], Some(TaskAction::EslintDefault))
        .task("eslint:jest", &[], Some(TaskAction::EslintJest))
        .task("jsonlint", &[], Some(TaskAction::Jsonlint))
        .task("sloc", &[], Some(TaskAction::Sloc))
        .task("sync-output", &[], Some(TaskAction::SyncOutput))
        .task("transpile", &["sync-output"], Some(TaskAction::Transpile))
        .task("test", &["lint", "sloc"], Some(TaskAction::Test))
        // Optional branches: no-ops when disabled.
        .task(
            "bundle",
            &["transpile"],
            browser.map(|_| TaskAction::Bundle),
        )
        .task("minify", &["bundle"], browser.map(|_| TaskAction::Minify))
        .task(
            "server",
            &["transpile"],
            server.map(|_| TaskAction::Server),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;

    #[test]
    fn full_pipeline_validates() {
        let graph = build_pipeline(&Options::default()).unwrap();
        assert!(graph.contains("default"));
        assert!(graph.contains("production"));
        assert_eq!(graph.dependencies_of("minify"), ["bundle"]);
        assert_eq!(graph.dependencies_of("transpile"), ["sync-output"]);
    }

    #[test]
    fn disabled_browser_keeps_bundle_as_noop() {
        let mut options = Options::default();
        options.browser = false;

        let graph = build_pipeline(&options).unwrap();
        assert!(graph.get("bundle").unwrap().action.is_none());
        assert!(graph.get("minify").unwrap().action.is_none());
        // Still wired into build, so `build` aggregates unchanged.
        assert!(graph
            .dependencies_of("build")
            .contains(&"bundle".to_string()));
    }

    #[test]
    fn disabled_server_keeps_server_as_noop() {
        let mut options = Options::default();
        options.server = false;

        let graph = build_pipeline(&options).unwrap();
        assert!(graph.get("server").unwrap().action.is_none());
    }
}
