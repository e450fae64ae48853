//! Config error-message and defaults integration tests.

use std::fs;

use assert_fs::prelude::*;
use mailforge_core::{config, ConfigError};
use predicates::prelude::*;
use rstest::rstest;

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_config_returns_not_found() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let err = config::load_at(root.path()).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("mailforge.yaml"));
    assert!(err.to_string().contains("mailforge init"));
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    fs::write(
        config::config_path_at(root.path()),
        b": : corrupt : yaml : !!!\n  - broken: [unclosed",
    )
    .expect("write");

    let err = config::load_at(root.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    let msg = err.to_string();
    assert!(msg.contains("mailforge.yaml"), "must contain file path, got: {msg}");
    let source_msg = match &err {
        ConfigError::Parse { source, .. } => source.to_string(),
        _ => unreachable!(),
    };
    assert!(!source_msg.is_empty(), "serde_yaml must provide error context");
}

#[test]
fn load_wrong_type_yaml_returns_parse_error() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    fs::write(
        config::config_path_at(root.path()),
        b"- this is a list, not a mapping\n",
    )
    .expect("write");

    let err = config::load_at(root.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Defaults and scaffolding
// ---------------------------------------------------------------------------

#[rstest]
#[case("locales: [en]\n", vec!["en"])]
#[case("locales: [en, de, fr]\n", vec!["en", "de", "fr"])]
#[case("backends: [sendgrid]\n", vec!["en"])]
fn locales_parse_with_default_fallback(#[case] yaml: &str, #[case] expected: Vec<&str>) {
    let root = assert_fs::TempDir::new().expect("tempdir");
    fs::write(config::config_path_at(root.path()), yaml).expect("write");
    let config = config::load_at(root.path()).expect("load");
    assert_eq!(config.locales, expected);
}

#[test]
fn scaffolded_yaml_loads_back_identically() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let config = mailforge_core::Config::default();
    let file = root.child(config::CONFIG_FILE);
    file.write_str(&config.to_yaml().expect("serialize")).expect("write");
    file.assert(predicate::path::exists());

    let loaded = config::load_at(root.path()).expect("load");
    assert_eq!(loaded, config);
}
