//! Layering guardrails between the workspace crates.
//!
//! `tagscript_core` is pure vocabulary and has no dependencies. `tagscript_syntax` is a library: CLI parsing and
//! subscriber setup belong to the root crate only. These tests scan the member manifests.

/// Names listed in the `[dependencies]` table of `manifest`.
fn dependency_names(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }
        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((name, _)) = line.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn core_has_no_dependencies() {
    let names = dependency_names(include_str!("../crates/tagscript_core/Cargo.toml"));
    assert!(names.is_empty(), "tagscript_core must stay dependency-free, found {names:?}");
}

#[test]
fn syntax_does_not_pull_in_cli_concerns() {
    let names = dependency_names(include_str!("../crates/tagscript_syntax/Cargo.toml"));
    assert!(names.iter().any(|n| n == "tagscript_core"));
    for forbidden in ["clap", "tracing-subscriber", "tagscript"] {
        assert!(
            !names.iter().any(|n| n == forbidden),
            "`{forbidden}` must not appear in tagscript_syntax [dependencies]"
        );
    }
}
