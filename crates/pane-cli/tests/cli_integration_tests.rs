//! Integration tests driving the `pane` binary against temporary fixtures.

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Path to the compiled pane binary.
fn pane_bin() -> String {
    env!("CARGO_BIN_EXE_pane").to_string()
}

/// Run pane with args, returning (stdout, stderr, success).
fn run_pane(args: &[&str]) -> (String, String, bool) {
    let output = Command::new(pane_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run pane");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

fn fixture() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_render_inline_partial_with_data() {
    let tmp = fixture();
    let doc = write(
        tmp.path(),
        "weather.liquid",
        "{% template reading %}{{ label }}: {{ data.temp }}C{% endtemplate %}\
{% render 'reading', label: 'Kitchen' %}",
    );
    let data = write(tmp.path(), "data.json", r#"{"temp": 21}"#);

    let (stdout, stderr, ok) = run_pane(&["render", &doc, "--data", &data]);
    assert!(ok, "render should succeed.\nstderr: {}", stderr);
    assert_eq!(stdout, "Kitchen: 21C");
}

#[test]
fn test_render_yaml_data_and_set() {
    let tmp = fixture();
    let doc = write(
        tmp.path(),
        "doc.liquid",
        "{{ title }}/{{ data.items | length }}/{{ count + 1 }}",
    );
    let data = write(tmp.path(), "data.yaml", "items: [a, b]\n");

    let (stdout, stderr, ok) = run_pane(&[
        "render", &doc, "--data", &data, "--set", "title=News", "--set", "count=2",
    ]);
    assert!(ok, "stderr: {}", stderr);
    assert_eq!(stdout, "News/2/3");
}

#[test]
fn test_render_uses_config_next_to_document() {
    let tmp = fixture();
    write(
        tmp.path(),
        "pane.yml",
        "size: {width: 400, height: 300}\nvars:\n  units: metric\n",
    );
    let doc = write(
        tmp.path(),
        "doc.liquid",
        "{% template p %}{{ size.width }}x{{ size.height }} {{ config.units }}{% endtemplate %}{% render 'p' %}",
    );

    let (stdout, stderr, ok) = run_pane(&["render", &doc]);
    assert!(ok, "stderr: {}", stderr);
    assert_eq!(stdout, "400x300 metric");
}

#[test]
fn test_render_with_templates_dir() {
    let tmp = fixture();
    write(tmp.path(), "pane.yml", "templates_dir: partials\n");
    write(tmp.path(), "partials/badge.html", "[{{ text }}]");
    let doc = write(
        tmp.path(),
        "doc.liquid",
        "{% template badge %}ignored{% endtemplate %}{% render 'badge', text: 'ok' %}",
    );

    let (stdout, stderr, ok) = run_pane(&["render", &doc]);
    assert!(ok, "stderr: {}", stderr);
    assert_eq!(stdout, "[ok]");
}

#[test]
fn test_render_to_output_file() {
    let tmp = fixture();
    let doc = write(tmp.path(), "doc.liquid", "hello");
    let out = tmp.path().join("out.html");

    let (stdout, stderr, ok) = run_pane(&["render", &doc, "--output", out.to_str().unwrap()]);
    assert!(ok, "stderr: {}", stderr);
    assert_eq!(stdout, "");
    assert_eq!(fs::read_to_string(out).unwrap(), "hello");
}

#[test]
fn test_render_missing_partial_fails() {
    let tmp = fixture();
    let doc = write(tmp.path(), "doc.liquid", "{% render 'nowhere' %}");

    let (_, stderr, ok) = run_pane(&["render", &doc]);
    assert!(!ok, "render should fail for a missing partial");
    assert!(stderr.contains("T002"), "stderr: {}", stderr);
    assert!(stderr.contains("nowhere"), "stderr: {}", stderr);
}

#[test]
fn test_render_invalid_template_name_fails() {
    let tmp = fixture();
    let doc = write(
        tmp.path(),
        "doc.liquid",
        "{% template invalid-name %}x{% endtemplate %}",
    );

    let (_, stderr, ok) = run_pane(&["render", &doc]);
    assert!(!ok);
    assert!(stderr.contains("T001"), "stderr: {}", stderr);
}

#[test]
fn test_render_invalid_config_fails() {
    let tmp = fixture();
    let config = write(tmp.path(), "custom.yml", "max_partial_depth: 0\n");
    let doc = write(tmp.path(), "doc.liquid", "x");

    let (_, stderr, ok) = run_pane(&["--config", &config, "render", &doc]);
    assert!(!ok);
    assert!(stderr.contains("C002"), "stderr: {}", stderr);
}

#[test]
fn test_templates_lists_definitions() {
    let tmp = fixture();
    let doc = write(
        tmp.path(),
        "doc.liquid",
        "{% template header %}H{% endtemplate %}{% template rows/row %}{{ row }}{% endtemplate %}",
    );

    let (stdout, stderr, ok) = run_pane(&["templates", &doc]);
    assert!(ok, "stderr: {}", stderr);
    assert_eq!(stdout, "header\nrows/row\n");

    let (stdout, _, ok) = run_pane(&["templates", &doc, "--output", "json"]);
    assert!(ok);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!([
            {"name": "header", "body": "H"},
            {"name": "rows/row", "body": "{{ row }}"}
        ])
    );
}

#[test]
fn test_condition_ast() {
    let (stdout, stderr, ok) = run_pane(&["condition", "n >= 3", "--ast"]);
    assert!(ok, "stderr: {}", stderr);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!({"type": "comparison", "left": "n", "operator": ">=", "right": "3"})
    );
}

#[test]
fn test_condition_evaluate() {
    let (stdout, _, ok) = run_pane(&[
        "condition",
        "user.age >= 30 and user.active == true",
        "--bind",
        "user",
        "--value",
        r#"{"age": 35, "active": true}"#,
    ]);
    assert!(ok);
    assert_eq!(stdout.trim(), "true");

    let (stdout, _, ok) = run_pane(&["condition", "item > 1", "--value", "0"]);
    assert!(ok);
    assert_eq!(stdout.trim(), "false");
}

#[test]
fn test_condition_invalid_value_fails() {
    let (_, stderr, ok) = run_pane(&["condition", "item", "--value", "{not json"]);
    assert!(!ok);
    assert!(stderr.contains("--value"), "stderr: {}", stderr);
}
