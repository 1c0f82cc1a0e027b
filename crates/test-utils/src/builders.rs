#![allow(dead_code)]

//! Builders for test setup.

use gantry::config::{merge_over_defaults, Options};
use serde_json::{json, Value};

/// Builds [`Options`] the same way the loader does: a JSON overlay
/// deep-merged over the documented defaults.
pub struct OptionsBuilder {
    overrides: Value,
}

impl OptionsBuilder {
    pub fn new() -> Self {
        Self {
            overrides: json!({}),
        }
    }

    pub fn browser(mut self, enabled: bool) -> Self {
        self.overrides["browser"] = json!(enabled);
        self
    }

    pub fn server(mut self, enabled: bool) -> Self {
        self.overrides["server"] = json!(enabled);
        self
    }

    /// Caller-supplied test-runner configuration, merged right-biased over
    /// the generated one.
    pub fn test_config(mut self, config: Value) -> Self {
        if self.overrides.get("test").is_none() {
            self.overrides["test"] = json!({});
        }
        self.overrides["test"]["config"] = config;
        self
    }

    pub fn preprocess_preset(mut self, preset: &str) -> Self {
        if self.overrides.get("test").is_none() {
            self.overrides["test"] = json!({});
        }
        self.overrides["test"]["preprocess_preset"] = json!(preset);
        self
    }

    /// Override one named source pattern, e.g. `src_pattern("src", "app/**/*.js")`.
    pub fn src_pattern(mut self, name: &str, pattern: &str) -> Self {
        if self.overrides.get("src").is_none() {
            self.overrides["src"] = json!({});
        }
        self.overrides["src"][name] = json!(pattern);
        self
    }

    /// Arbitrary overlay for anything without a dedicated method.
    pub fn raw(mut self, overlay: Value) -> Self {
        gantry::config::deep_merge(&mut self.overrides, overlay);
        self
    }

    pub fn build(self) -> Options {
        merge_over_defaults(self.overrides).expect("builder produced invalid options")
    }
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
