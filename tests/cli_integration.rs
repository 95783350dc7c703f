//! CLI integration tests
//!
//! These tests run the compiled binary against fixture catalogs on disk and
//! check stdout, stderr and exit codes. No network access is needed.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/catalogs")
        .join(name)
        .display()
        .to_string()
}

/// Runs the binary with a clean `WHEELMATCH_*` environment.
fn wheelmatch(args: &[&str]) -> Output {
    let cache = TempDir::new().expect("Failed to create cache dir");
    Command::new(env!("CARGO_BIN_EXE_wheelmatch"))
        .args(args)
        .env_remove("WHEELMATCH_CATALOG_URL")
        .env_remove("WHEELMATCH_REQUEST_TIMEOUT")
        .env_remove("WHEELMATCH_H1_MARKER")
        .env_remove("WHEELMATCH_H2_MARKER")
        .env_remove("RUST_LOG")
        .env("WHEELMATCH_CACHE_DIR", cache.path())
        .env("WHEELMATCH_LOG_LEVEL", "error")
        .output()
        .expect("Failed to execute wheelmatch")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn resolve(catalog: &str, extra: &[&str]) -> Output {
    let mut args = vec!["resolve", "--catalog", catalog];
    args.extend_from_slice(extra);
    wheelmatch(&args)
}

#[test]
fn test_cli_help() {
    let output = wheelmatch(&["--help"]);

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("wheelmatch"));
    assert!(stdout.contains("resolve"));
    assert!(stdout.contains("tables"));
    assert!(stdout.contains("tag"));
}

#[test]
fn test_cli_version() {
    let output = wheelmatch(&["--version"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_resolve_prints_bare_url() {
    let output = resolve(
        &fixture("wheels.md"),
        &["--package", "flash-attn", "--torch", "2.8.0", "--cuda", "cu129", "--python", "3.13"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        "https://example.com/fa/2.8.3/cu128-torch2.8-cp313.whl"
    );
}

#[test]
fn test_resolve_json_output() {
    let output = resolve(
        &fixture("wheels.json"),
        &[
            "--package", "flash-attn", "--torch", "2.8.0", "--cuda", "12.8", "--python", "3.12",
            "--format", "json",
        ],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["strategy"], "scored");
    assert_eq!(value["score"], 6);
    assert_eq!(
        value["url"],
        "https://example.com/fa/2.8.3-cu128-torch2.8.0-cp312.whl"
    );
}

#[test]
fn test_resolve_failure_exit_code_and_message() {
    let output = resolve(
        &fixture("wheels.md"),
        &["--package", "flash-attn", "--torch", "2.8.0", "--cuda", "cu129", "--python", "3.9"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    let stderr = stderr(&output);
    assert!(stderr.contains("No compatible artifact for flash-attn"));
    assert!(stderr.contains("tier 4"));
    assert!(stderr.contains("--abi-relaxation"));
}

#[test]
fn test_resolve_failure_json_document() {
    let output = resolve(
        &fixture("wheels.md"),
        &[
            "--package", "flash-attn", "--torch", "2.8.0", "--cuda", "cu129", "--python", "3.9",
            "--format", "json",
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["attempts"].as_array().unwrap().len(), 4);
    assert_eq!(value["abi_relaxation_tried"], false);
}

#[test]
fn test_resolve_with_relaxation() {
    let output = resolve(
        &fixture("wheels.md"),
        &[
            "--package", "flash-attn", "--torch", "2.6.0", "--cuda", "cu124", "--python", "3.9",
            "--abi-relaxation",
        ],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        "https://example.com/fa/2.7.4/cu124-torch2.6-abi3.whl"
    );
}

#[test]
fn test_resolve_invalid_tag() {
    let output = resolve(
        &fixture("wheels.md"),
        &["--package", "flash-attn", "--torch", "2.8.0", "--cuda", "rocm6.1", "--python", "3.12"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid accelerator tag"));
}

#[test]
fn test_resolve_missing_catalog_file() {
    let output = resolve(
        "/nonexistent/wheels.md",
        &["--package", "flash-attn", "--torch", "2.8.0", "--cuda", "cu129", "--python", "3.12"],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Catalog file not readable"));
}

#[test]
fn test_resolve_without_catalog() {
    let output = wheelmatch(&[
        "resolve", "--package", "flash-attn", "--torch", "2.8.0", "--cuda", "cu129", "--python",
        "3.12",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("WHEELMATCH_CATALOG_URL"));
}

#[test]
fn test_resolve_custom_heading_markers() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("custom.md");
    fs::write(
        &path,
        "=== flash-attn\n| Torch | CUDA | Link |\n|---|---|---|\n| 2.8.0 | 12.8 | http://x/a.whl |\n",
    )
    .unwrap();

    let output = resolve(
        &path.display().to_string(),
        &[
            "--package", "flash-attn", "--torch", "2.8.0", "--cuda", "12.8", "--python", "3.12",
            "--h1", "=== ", "--h2=--- ",
        ],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "http://x/a.whl");
}

#[test]
fn test_warning_log_level_is_accepted() {
    let cache = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_wheelmatch"))
        .args(["resolve", "--catalog", &fixture("wheels.md")])
        .args(["--package", "flash-attn", "--torch", "2.8.0", "--cuda", "cu129", "--python", "3.13"])
        .env_remove("WHEELMATCH_CATALOG_URL")
        .env_remove("RUST_LOG")
        .env("WHEELMATCH_CACHE_DIR", cache.path())
        .env("WHEELMATCH_LOG_LEVEL", "warning")
        .output()
        .expect("Failed to execute wheelmatch");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!stderr(&output).contains("Invalid log level"));
}

#[test]
fn test_tables_to_stdout_and_file() {
    let output = wheelmatch(&["tables", "--catalog", &fixture("wheels.md")]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["tables"].as_array().unwrap().len(), 4);

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("audit/tables.json");
    let output = wheelmatch(&[
        "tables",
        "--catalog",
        &fixture("wheels.md"),
        "--output",
        path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(fs::read_to_string(&path).unwrap().contains("sageattention"));
}

#[test]
fn test_tag_command() {
    let output = wheelmatch(&["tag", "cu118"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "11.8");

    let output = wheelmatch(&["tag", "cpu"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_config_command() {
    let output = wheelmatch(&["config", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["request_timeout_secs"], "30");
    assert_eq!(value["log_level"], "error");
}
