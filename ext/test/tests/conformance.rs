//! Conformance tests that run YAML fixtures against amatch
//!
//! Run with: cargo test -p amatch-test --test conformance

#![cfg(feature = "fixtures")]

use amatch_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

/// The `conformance/` directory at the workspace root.
fn fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let ext_test = Path::new(manifest_dir);

    // Go up: ext/test -> ext -> workspace root
    ext_test
        .parent() // ext
        .and_then(|p| p.parent()) // workspace root
        .expect("Could not find workspace root")
        .join("conformance")
}

/// Load and run one fixture file.
fn run_fixture_file(name: &str) {
    let path = fixtures_dir().join(name);
    assert!(path.exists(), "Fixture file does not exist: {}", path.display());

    println!("Running fixture file: {}", path.display());
    let yaml = fs::read_to_string(&path).expect("read yaml");

    // Parse potentially multiple fixtures (separated by ---)
    let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
        panic!("Failed to parse {}: {}", path.display(), e);
    });
    assert!(!fixtures.is_empty(), "{} has no fixtures", path.display());

    for fixture in fixtures {
        println!("  Running: {}", fixture.name);
        fixture.run_and_assert();
    }
}

#[test]
fn test_string_kinds() {
    run_fixture_file("01_string_kinds.yaml");
}

#[test]
fn test_range() {
    run_fixture_file("02_range.yaml");
}

#[test]
fn test_present() {
    run_fixture_file("03_present.yaml");
}

#[test]
fn test_invert() {
    run_fixture_file("04_invert.yaml");
}

#[test]
fn test_errors() {
    run_fixture_file("05_errors.yaml");
}

#[test]
fn every_fixture_file_is_covered() {
    let mut files: Vec<String> = fs::read_dir(fixtures_dir())
        .expect("read dir")
        .filter_map(|entry| {
            let path = entry.expect("dir entry").path();
            let is_yaml = path
                .extension()
                .is_some_and(|e| e == "yaml" || e == "yml");
            is_yaml.then(|| path.file_name()?.to_str().map(str::to_owned))?
        })
        .collect();
    files.sort();
    assert_eq!(
        files,
        [
            "01_string_kinds.yaml",
            "02_range.yaml",
            "03_present.yaml",
            "04_invert.yaml",
            "05_errors.yaml",
        ]
    );
}
