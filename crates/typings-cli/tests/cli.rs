//! End-to-end tests for the `typings` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// The binary with an isolated home directory and no colors.
#[allow(deprecated)]
fn typings(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("typings").unwrap();
    cmd.env("HOME", home).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn project(root: &Path) {
    write(
        root,
        "typings.json",
        r#"{ "name": "root", "main": "index.d.ts", "dependencies": { "test": "file:custom_typings/definition.d.ts" } }"#,
    );
    write(root, "index.d.ts", "/// <reference path=\"./extra.d.ts\" />\nimport test from 'test'\nexport default test\n");
    write(root, "extra.d.ts", "declare const extra: number\n");
    write(root, "custom_typings/definition.d.ts", "export default function (): string\n");
}

#[test]
fn test_parse_prints_reference() {
    let home = TempDir::new().unwrap();

    typings(home.path())
        .args(["parse", "github:owner/repo/typings.json#abc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"scheme\": \"github\""))
        .stdout(predicate::str::contains("\"commitish\": \"abc\""))
        .stdout(predicate::str::contains("\"name\": \"repo\""));
}

#[test]
fn test_parse_rejects_unknown_scheme() {
    let home = TempDir::new().unwrap();

    typings(home.path())
        .args(["parse", "ftp:foo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Hint:"));
}

#[test]
fn test_bundle_writes_outputs() {
    let home = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    project(temp.path());

    typings(home.path())
        .current_dir(temp.path())
        .args(["bundle", "--out", "out", "--no-meta"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Stripped reference"));

    let main = fs::read_to_string(temp.path().join("out/main.d.ts")).unwrap();
    let browser = fs::read_to_string(temp.path().join("out/browser.d.ts")).unwrap();

    assert!(main.contains("declare module 'root~test' {"));
    assert!(main.contains("import test from 'root~test'"));
    assert!(main.contains("export { default } from 'root/index';"));
    assert!(!main.contains("reference path"));
    assert_eq!(main, browser);
}

#[test]
fn test_bundle_name_flag_and_cwd() {
    let home = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    project(temp.path());
    let out = temp.path().join("types");

    typings(home.path())
        .args(["bundle", "--name", "renamed", "--cwd"])
        .arg(temp.path())
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let main = fs::read_to_string(out.join("main.d.ts")).unwrap();
    assert!(main.contains("declare module 'renamed' {"));
    assert!(main.contains("// Compiled using typings@"));
    assert!(main.contains("// Source: index.d.ts"));
}

#[test]
fn test_bundle_requires_a_name() {
    let home = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    write(temp.path(), "typings.json", r#"{ "main": "index.d.ts" }"#);
    write(temp.path(), "index.d.ts", "export const a: number\n");

    typings(home.path())
        .current_dir(temp.path())
        .args(["bundle", "--out", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Use the `--name` flag to specify it manually"));

    assert!(!temp.path().join("out").exists());
}

#[test]
fn test_bundle_strict_fails_on_unknown_module() {
    let home = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    write(temp.path(), "typings.json", r#"{ "name": "root", "main": "index.d.ts" }"#);
    write(temp.path(), "index.d.ts", "import { x } from 'unknown'\nexport { x }\n");

    typings(home.path())
        .current_dir(temp.path())
        .args(["bundle", "--out", "out"])
        .assert()
        .success()
        .stderr(predicate::str::contains("\"root\" imports \"unknown\""));

    typings(home.path())
        .current_dir(temp.path())
        .args(["bundle", "--out", "out", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unable to find dependency \"unknown\""));
}

#[test]
fn test_invalid_rc_file_fails() {
    let home = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    project(temp.path());
    write(temp.path(), ".typingsrc", r#"{ "proxy": "not a url" }"#);

    typings(home.path())
        .current_dir(temp.path())
        .args(["bundle", "--out", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_list_renders_tree() {
    let home = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    project(temp.path());

    typings(home.path())
        .current_dir(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("root\n"))
        .stdout(predicate::str::contains("└── test (file)"));
}

#[test]
fn test_list_json() {
    let home = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    project(temp.path());

    let output = typings(home.path())
        .current_dir(temp.path())
        .args(["list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree["name"], "root");
    assert_eq!(tree["dependencies"]["test"]["kind"], "file");
}

#[test]
fn test_bundle_updates_reference_index() {
    let home = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    project(temp.path());
    write(temp.path(), "typings/index.d.ts", "/// <reference path=\"globals/removed.d.ts\" />\n");

    typings(home.path())
        .current_dir(temp.path())
        .args(["bundle", "--out", "out", "--index", "typings/index.d.ts"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Removed missing reference"));

    let index = fs::read_to_string(temp.path().join("typings/index.d.ts")).unwrap();
    assert_eq!(index, "/// <reference path=\"../out/main.d.ts\" />\n");
}
