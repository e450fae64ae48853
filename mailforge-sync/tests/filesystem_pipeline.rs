//! End-to-end pipeline runs against a real project layout with the
//! filesystem mirror backend.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use mailforge_core::Config;
use mailforge_sync::{pipeline, StateKey, StateStore};

fn scaffold(root: &Path, template_body: &str) {
    fs::create_dir_all(root.join("emails")).unwrap();
    fs::write(root.join("emails").join("welcome.html"), template_body).unwrap();
    fs::write(
        root.join("i18n.json"),
        r#"{"en": {"title": "Welcome!", "body": "Glad you're here."},
            "de": {"title": "Willkommen!", "body": "Schön, dass du da bist."}}"#,
    )
    .unwrap();
}

fn config() -> Config {
    Config {
        locales: vec!["en".to_string(), "de".to_string()],
        backends: vec!["filesystem".to_string()],
        ..Config::default()
    }
}

const TEMPLATE_V1: &str =
    "<html><head><title>{{ t.title }}</title></head><body>{{ t.body }}</body></html>";
const TEMPLATE_V2: &str =
    "<html><head><title>{{ t.title }}</title></head><body><b>{{ t.body }}</b></body></html>";

#[tokio::test]
async fn first_run_creates_rerun_skips_edit_updates() {
    let root = TempDir::new().unwrap();
    scaffold(root.path(), TEMPLATE_V1);
    let config = config();

    // First run: one CREATE per locale.
    let report = pipeline::run(root.path(), &config, false).await.expect("first run");
    assert_eq!(report.emails, 2);
    assert_eq!(report.created(), 2);
    assert_eq!(report.failed(), 0);

    let out = root.path().join("out");
    let en = fs::read_to_string(out.join("welcome_en.html")).unwrap();
    assert!(en.contains("Glad you're here."));
    let de = fs::read_to_string(out.join("welcome_de.html")).unwrap();
    assert!(de.contains("Schön, dass du da bist."));

    // Second run with nothing changed: everything skips.
    let report = pipeline::run(root.path(), &config, false).await.expect("second run");
    assert_eq!(report.created(), 0);
    assert_eq!(report.unchanged(), 2);

    // Edit the template: both locales update, remote ids survive.
    scaffold(root.path(), TEMPLATE_V2);
    let report = pipeline::run(root.path(), &config, false).await.expect("third run");
    assert_eq!(report.updated(), 2);
    assert_eq!(report.unchanged(), 0);
    assert!(fs::read_to_string(out.join("welcome_en.html")).unwrap().contains("<b>"));

    let store = StateStore::open(root.path().join(&config.state_dir));
    let record = store
        .get(&StateKey::new("filesystem", "welcome_en"))
        .unwrap()
        .expect("record");
    assert_eq!(record.remote_id.as_deref(), Some("welcome_en.html"));
    assert!(record.version_id.is_some());
}

#[tokio::test]
async fn dry_run_touches_nothing() {
    let root = TempDir::new().unwrap();
    scaffold(root.path(), TEMPLATE_V1);
    let config = config();

    let report = pipeline::run(root.path(), &config, true).await.expect("dry run");
    assert_eq!(report.would_change(), 2);
    assert_eq!(report.created(), 0);

    assert!(!root.path().join("out").exists(), "dry-run must not write the mirror");
    assert!(
        !root.path().join(&config.state_dir).exists(),
        "dry-run must not write state"
    );
}

#[tokio::test]
async fn metadata_only_template_churn_does_not_update() {
    let root = TempDir::new().unwrap();
    scaffold(root.path(), TEMPLATE_V1);
    let config = config();

    pipeline::run(root.path(), &config, false).await.expect("first run");

    // Re-render produces byte-identical HTML, so digests match and the
    // run is all skips — the mirror files keep their content untouched.
    let report = pipeline::run(root.path(), &config, false).await.expect("rerun");
    assert_eq!(report.unchanged(), 2);
    assert_eq!(report.updated(), 0);
}

#[tokio::test]
async fn unknown_backend_aborts_before_any_dispatch() {
    let root = TempDir::new().unwrap();
    scaffold(root.path(), TEMPLATE_V1);
    let config = Config {
        backends: vec!["carrier-pigeon".to_string()],
        ..config()
    };

    let err = pipeline::run(root.path(), &config, false).await.unwrap_err();
    assert!(err.to_string().contains("carrier-pigeon"), "got: {err}");
    assert!(!root.path().join("out").exists());
}
