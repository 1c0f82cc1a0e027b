// src/config/model.rs

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Project options as read from `gantry.json`, deep-merged over defaults.
///
/// A minimal config enabling everything looks like:
///
/// ```json
/// {
///     "browser": true,
///     "server": true,
///     "src": { "src": "src/**/*.js" }
/// }
/// ```
///
/// Every field has a documented default; caller-supplied values win at every
/// nesting level (see [`crate::config::merge`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Enable the bundling/minification branch of the pipeline.
    pub browser: bool,

    /// Enable the dev-server branch of the pipeline.
    pub server: bool,

    /// Lint rule-set paths and the external linter command.
    pub eslint: EslintOptions,

    /// Shared transpile configuration, also used by the preprocessor.
    pub transpile: TranspileOptions,

    /// Bundler configuration for the browser entry.
    pub bundler: BundlerOptions,

    /// Minifier command.
    pub minify: MinifyOptions,

    /// Delegated test-runner configuration.
    pub test: TestOptions,

    /// Dev-server command.
    pub serve: ServeOptions,

    /// Named glob patterns the file-set resolver expands.
    pub src: FileSetConfig,

    /// Filesystem layout roots.
    pub out: OutputRoots,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            browser: true,
            server: true,
            eslint: EslintOptions::default(),
            transpile: TranspileOptions::default(),
            bundler: BundlerOptions::default(),
            minify: MinifyOptions::default(),
            test: TestOptions::default(),
            serve: ServeOptions::default(),
            src: FileSetConfig::default(),
            out: OutputRoots::default(),
        }
    }
}

/// `eslint` section: one rule set for regular source, one for tests/mocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EslintOptions {
    pub default: PathBuf,
    pub jest: PathBuf,
    pub command: Vec<String>,
}

impl Default for EslintOptions {
    fn default() -> Self {
        Self {
            default: PathBuf::from("eslint/default.yml"),
            jest: PathBuf::from("eslint/jest.yml"),
            command: vec!["npx".into(), "eslint".into()],
        }
    }
}

/// `transpile` section. `presets` is forwarded verbatim to the external
/// transpiler; `source_maps` keeps `lib/` entries paired with `.map` files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranspileOptions {
    pub presets: Vec<String>,
    pub source_maps: bool,
    pub command: Vec<String>,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            presets: Vec::new(),
            source_maps: true,
            command: vec!["npx".into(), "babel".into()],
        }
    }
}

/// `bundler` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundlerOptions {
    /// Bundle entry points, e.g. `["src/browser"]`.
    pub entries: Vec<String>,
    /// Emit inline debug information / source maps.
    pub debug: bool,
    pub command: Vec<String>,
}

impl Default for BundlerOptions {
    fn default() -> Self {
        Self {
            entries: vec!["src/browser".into()],
            debug: true,
            command: vec!["npx".into(), "browserify".into()],
        }
    }
}

/// `minify` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinifyOptions {
    pub command: Vec<String>,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self {
            command: vec!["npx".into(), "terser".into()],
        }
    }
}

/// `test` section: the runner command plus a free-form config object that is
/// deep-merged into the generated runner configuration by the test adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestOptions {
    pub command: Vec<String>,
    pub config: Value,
    /// Test-framework preset prefixed to the preprocessor's preset list.
    pub preprocess_preset: Option<String>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            command: vec!["npx".into(), "jest".into()],
            config: json!({
                "logHeapUsage": true,
                "collectCoverage": true,
                "coverageReporters": ["text", "lcov", "clover"],
            }),
            preprocess_preset: None,
        }
    }
}

/// `serve` section: how to start the dev server child process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeOptions {
    pub command: Vec<String>,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            command: vec!["node".into(), "lib/server".into()],
        }
    }
}

/// `src` section: the fixed set of logical file-set names.
///
/// Never mutated after the initial merge with defaults; the resolver derives
/// every task's concrete input list from these six patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSetConfig {
    pub config: String,
    pub src: String,
    pub tests: String,
    pub mocks: String,
    pub browser: String,
    pub server: String,
}

impl Default for FileSetConfig {
    fn default() -> Self {
        Self {
            config: "config/*.json".into(),
            src: "src/**/*.js".into(),
            tests: "src/**/__tests__/**/*.js".into(),
            mocks: "src/**/__mocks__/**/*.js".into(),
            browser: "src/browser/**/*.js".into(),
            server: "src/server/**/*.js".into(),
        }
    }
}

/// `out` section: source root, compiled-output root and bundle output root.
///
/// `lib` mirrors `src`'s relative paths (plus `.map` variants); `dist`
/// receives `browser.js` / `browser.min.js`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputRoots {
    pub src: PathBuf,
    pub lib: PathBuf,
    pub dist: PathBuf,
}

impl Default for OutputRoots {
    fn default() -> Self {
        Self {
            src: PathBuf::from("src"),
            lib: PathBuf::from("lib"),
            dist: PathBuf::from("dist/js"),
        }
    }
}
