// tests/preprocess.rs

//! The per-file source transform hook.

use std::error::Error;
use std::path::Path;

use gantry::tasks::preprocess::{preprocess, COVERAGE_MARKER};
use gantry_test_utils::builders::OptionsBuilder;
use gantry_test_utils::fake_toolchain::{FakeToolchain, ToolCall};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn dependency_files_pass_through_untouched() -> TestResult {
    let options = OptionsBuilder::new().build();
    let toolchain = FakeToolchain::new();
    let source = "module.exports = require('./impl');\n";

    let output = preprocess(
        &toolchain,
        source,
        Path::new("node_modules/left-pad/index.js"),
        &options.transpile,
        None,
    )?;

    assert_eq!(output, source);
    assert!(toolchain.calls().is_empty());
    Ok(())
}

#[test]
fn source_files_are_transformed_with_the_coverage_marker() -> TestResult {
    let options = OptionsBuilder::new()
        .raw(serde_json::json!({ "transpile": { "presets": ["es2015"] } }))
        .preprocess_preset("jest-preset")
        .build();
    let toolchain = FakeToolchain::new();

    let output = preprocess(
        &toolchain,
        "export default 1;\n",
        Path::new("src/app.js"),
        &options.transpile,
        options.test.preprocess_preset.as_deref(),
    )?;

    assert!(output.contains(COVERAGE_MARKER));

    let calls = toolchain.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        ToolCall::Transform(request) => {
            // Test-framework preset first, then the shared presets.
            assert_eq!(request.presets, ["jest-preset", "es2015"]);
            assert!(request.retain_lines);
            assert_eq!(
                request.auxiliary_comment_before.as_deref(),
                Some(COVERAGE_MARKER)
            );
            assert_eq!(request.filename, Path::new("src/app.js"));
        }
        other => panic!("expected a transform call, got {other:?}"),
    }
    Ok(())
}

#[test]
fn transformation_is_deterministic() -> TestResult {
    let options = OptionsBuilder::new().build();
    let toolchain = FakeToolchain::new();
    let source = "const x = 1;\n";

    let first = preprocess(&toolchain, source, Path::new("src/x.js"), &options.transpile, None)?;
    let second = preprocess(&toolchain, source, Path::new("src/x.js"), &options.transpile, None)?;

    assert_eq!(first, second);
    Ok(())
}
