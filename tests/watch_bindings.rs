// tests/watch_bindings.rs

//! Change-to-task routing for the watch session.

use std::error::Error;

use gantry::fileset::resolve;
use gantry::watch::bindings::{build_bindings, reload_selection};
use gantry_test_utils::builders::OptionsBuilder;

type TestResult = Result<(), Box<dyn Error>>;

fn tasks_for(bindings: &[gantry::watch::bindings::WatchBinding], rel: &str) -> Vec<String> {
    let mut tasks: Vec<String> = bindings
        .iter()
        .filter(|b| b.matches(rel))
        .flat_map(|b| b.tasks.iter().cloned())
        .collect();
    tasks.sort();
    tasks
}

#[test]
fn source_change_triggers_the_rebuild_family() -> TestResult {
    let options = OptionsBuilder::new().build();
    let filesets = resolve(&options.src);
    let bindings = build_bindings(&options, &filesets)?;

    let tasks = tasks_for(&bindings, "src/app.js");
    assert!(tasks.contains(&"transpile".to_string()));
    assert!(tasks.contains(&"bundle".to_string()));
    assert!(tasks.contains(&"test".to_string()));
    assert!(tasks.contains(&"eslint:default".to_string()));
    assert!(!tasks.contains(&"eslint:jest".to_string()));
    Ok(())
}

#[test]
fn test_file_change_uses_the_jest_ruleset_not_transpile() -> TestResult {
    let options = OptionsBuilder::new().build();
    let filesets = resolve(&options.src);
    let bindings = build_bindings(&options, &filesets)?;

    let tasks = tasks_for(&bindings, "src/__tests__/app.test.js");
    assert!(tasks.contains(&"eslint:jest".to_string()));
    assert!(tasks.contains(&"test".to_string()));
    assert!(!tasks.contains(&"transpile".to_string()));
    assert!(!tasks.contains(&"eslint:default".to_string()));
    Ok(())
}

#[test]
fn config_change_triggers_jsonlint_and_server() -> TestResult {
    let options = OptionsBuilder::new().build();
    let filesets = resolve(&options.src);
    let bindings = build_bindings(&options, &filesets)?;

    let tasks = tasks_for(&bindings, "config/app.json");
    assert!(tasks.contains(&"jsonlint".to_string()));
    assert!(tasks.contains(&"server".to_string()));
    Ok(())
}

#[test]
fn disabled_branches_have_no_bindings() -> TestResult {
    let options = OptionsBuilder::new().browser(false).server(false).build();
    let filesets = resolve(&options.src);
    let bindings = build_bindings(&options, &filesets)?;

    let tasks = tasks_for(&bindings, "src/app.js");
    assert!(!tasks.contains(&"bundle".to_string()));
    assert!(!tasks.contains(&"server".to_string()));
    Ok(())
}

#[test]
fn reload_selection_needs_both_branches_enabled() -> TestResult {
    let options = OptionsBuilder::new().build();
    let filesets = resolve(&options.src);
    let reload = reload_selection(&options, &filesets)?.expect("enabled by default");
    assert!(reload.matches("dist/js/browser.js"));
    assert!(reload.matches("public/style.css"));
    assert!(!reload.matches("src/app.js"));

    let options = OptionsBuilder::new().browser(false).build();
    let filesets = resolve(&options.src);
    assert!(reload_selection(&options, &filesets)?.is_none());
    Ok(())
}
