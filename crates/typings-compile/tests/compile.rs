//! Compiling dependency trees into namespaced declarations.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use typings_compile::{CompileError, CompileOptions, Compiler, MissingDependencyPolicy, ReferenceUsage};
use typings_core::runtime::test_utils::{StaticHttp, test_fetcher};
use typings_core::{Browser, BrowserTarget, DependencyTree, Emitter, Event, ResolveOptions, Resolver, SourceKind, VERSION};

fn write(root: &Path, relative: &str, contents: &str) -> String {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

fn location(root: &Path, relative: &str) -> String {
    root.join(relative).to_string_lossy().into_owned()
}

fn node(src: String) -> DependencyTree {
    DependencyTree {
        kind: Some(SourceKind::Typings),
        src: Some(src),
        ..Default::default()
    }
}

fn compiler() -> Compiler {
    Compiler::new(test_fetcher(Arc::new(StaticHttp::new())))
}

fn meta(source: &str) -> String {
    format!("// Compiled using typings@{VERSION}\n// Source: {source}\n")
}

/// The `root` project: `a` and `dep` are typings dependencies, `b` is
/// swapped for the `browser` dependency in the browser pass.
fn root_fixture(root: &Path) -> DependencyTree {
    write(
        root,
        "root.d.ts",
        "import a from 'a'\nimport b = require('b')\nimport { isDep } from 'dep/path'\nexport * from './root-import'\n",
    );
    write(root, "root-import.d.ts", "export const test: string\n");
    write(
        root,
        "a/typed.d.ts",
        "export interface ITest {\n  foo: string\n  bar: boolean\n}\nexport default function (): ITest\n",
    );
    write(root, "a/typed.browser.d.ts", "export function browser (): boolean\n");
    write(root, "typings/b.d.ts", "export const foo: number\n");
    write(root, "browser.d.ts", "export const bar: boolean\n");
    write(root, "dep/path.d.ts", "export const isDep: boolean\n");

    let mut a = node(location(root, "a/typings.json"));
    a.typings = Some("typed.d.ts".to_string());
    a.browser_typings = Some(Browser::Path("typed.browser.d.ts".to_string()));

    let mut b = node(location(root, "bower.json"));
    b.kind = Some(SourceKind::Bower);
    b.typings = Some("typings/b.d.ts".to_string());

    let mut browser = node(location(root, "package.json"));
    browser.kind = Some(SourceKind::Npm);
    browser.typings = Some("browser.d.ts".to_string());

    let mut dep = node(location(root, "dep/typings.json"));
    dep.main = Some("dep/main.d.ts".to_string());

    let mut overrides = indexmap::IndexMap::new();
    overrides.insert("b".to_string(), BrowserTarget::Path("browser".to_string()));

    let mut tree = node(location(root, "typings.json"));
    tree.main = Some("root".to_string());
    tree.browser = Some(Browser::Overrides(overrides));
    tree.dependencies.insert("a".to_string(), Arc::new(a));
    tree.dependencies.insert("b".to_string(), Arc::new(b));
    tree.dependencies.insert("dep".to_string(), Arc::new(dep));
    tree.dependencies.insert("browser".to_string(), Arc::new(browser));
    tree
}

#[tokio::test]
async fn test_compile_normal_definition() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let tree = Arc::new(root_fixture(root));

    let options = CompileOptions::new(root, "root");
    let output = compiler().compile(tree, &options).await.unwrap();

    let tail = [
        meta("dep/path.d.ts"),
        "declare module 'root~dep/path' {\nexport const isDep: boolean\n}\n\n".to_string(),
        meta("root-import.d.ts"),
        "declare module 'root/root-import' {\nexport const test: string\n}\n\n".to_string(),
        meta("root.d.ts"),
        [
            "declare module 'root/root' {",
            "import a from 'root~a'",
            "import b = require('root~b')",
            "import { isDep } from 'root~dep/path'",
            "export * from 'root/root-import'",
            "}",
            "declare module 'root' {",
            "export * from 'root/root';",
            "}",
        ]
        .join("\n"),
    ]
    .concat();

    let main = [
        meta("a/typed.d.ts"),
        "declare module 'root~a' {\nexport interface ITest {\n  foo: string\n  bar: boolean\n}\nexport default function (): ITest\n}\n\n"
            .to_string(),
        meta("typings/b.d.ts"),
        "declare module 'root~b' {\nexport const foo: number\n}\n\n".to_string(),
        tail.clone(),
    ]
    .concat();

    let browser = [
        meta("a/typed.browser.d.ts"),
        "declare module 'root~a' {\nexport function browser (): boolean\n}\n\n".to_string(),
        meta("browser.d.ts"),
        "declare module 'root~b' {\nexport const bar: boolean\n}\n\n".to_string(),
        tail,
    ]
    .concat();

    assert_eq!(output.main, main);
    assert_eq!(output.browser, browser);
    assert!(output.references.is_empty());
    assert!(output.missing.is_empty());
}

#[tokio::test]
async fn test_compile_export_equals() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "file.d.ts",
        "declare function foo (value: string): foo.Bar;\n\ndeclare module foo {\n  export interface Bar {\n    (message: any, ...args: any[]): void;\n    enabled: boolean;\n    namespace: string;\n  }\n}\n\nexport = foo;\n",
    );

    let mut tree = node(location(root, "typings.json"));
    tree.main = Some("file.d.ts".to_string());

    let options = CompileOptions::new(root, "foobar").with_meta(false);
    let output = compiler().compile(Arc::new(tree), &options).await.unwrap();

    assert_eq!(
        output.main,
        [
            "declare module 'foobar/file' {",
            "function foo (value: string): foo.Bar;",
            "",
            "module foo {",
            "  export interface Bar {",
            "    (message: any, ...args: any[]): void;",
            "    enabled: boolean;",
            "    namespace: string;",
            "  }",
            "}",
            "",
            "export = foo;",
            "}",
            "declare module 'foobar' {",
            "import main = require('foobar/file');",
            "export = main;",
            "}",
        ]
        .join("\n")
    );
}

#[tokio::test]
async fn test_compile_ambient_definition() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let node_file = write(root, "compile-ambient/node.d.ts", "declare var __dirname: string\n");
    let fs_file = write(
        root,
        "compile-ambient/fs.d.ts",
        "export function readFileSync (path: string, encoding: string): string\nexport function readFileSync (path: string): Buffer\n",
    );

    let mut fs_tree = node(fs_file.clone());
    fs_tree.typings = Some(fs_file);

    let mut tree = node(location(root, "typings.json"));
    tree.typings = Some(node_file);
    tree.dependencies.insert("fs".to_string(), Arc::new(fs_tree));

    let options = CompileOptions::new(root, "name").with_ambient(true).with_meta(false);
    let output = compiler().compile(Arc::new(tree), &options).await.unwrap();

    assert_eq!(
        output.main,
        [
            "declare module 'fs' {",
            "export function readFileSync (path: string, encoding: string): string",
            "export function readFileSync (path: string): Buffer",
            "}",
            "",
            "declare var __dirname: string",
        ]
        .join("\n")
    );
}

#[tokio::test]
async fn test_compile_inline_ambient_definitions() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let declaration = "declare module \"events\" {\n  export class EventEmitter {}\n}\n\ndeclare module \"fs\" {\n  import { EventEmitter } from \"events\";\n  export class ReadStream extends EventEmitter {}\n}\n";
    let typings = write(root, "node.d.ts", declaration);

    let mut tree = node(location(root, "typings.json"));
    tree.typings = Some(typings);

    let options = CompileOptions::new(root, "name").with_ambient(true);
    let output = compiler().compile(Arc::new(tree), &options).await.unwrap();

    let expected = format!("{}{declaration}", meta("node.d.ts"));
    assert_eq!(format!("{}\n", output.main), expected);
    assert_eq!(format!("{}\n", output.browser), expected);
}

#[tokio::test]
async fn test_shared_import_is_emitted_once() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "index.d.ts", "export * from './a'\nexport * from './b'\n");
    write(root, "a.d.ts", "export * from './c'\nexport const a: number\n");
    write(root, "b.d.ts", "export * from './c'\nexport const b: number\n");
    write(root, "c.d.ts", "export const c: number\n");

    let mut tree = node(location(root, "typings.json"));
    tree.main = Some("index.d.ts".to_string());

    let options = CompileOptions::new(root, "root").with_meta(false);
    let output = compiler().compile(Arc::new(tree), &options).await.unwrap();

    assert_eq!(output.main.matches("declare module 'root/c'").count(), 1);
    let c = output.main.find("declare module 'root/c'").unwrap();
    let a = output.main.find("declare module 'root/a'").unwrap();
    let b = output.main.find("declare module 'root/b'").unwrap();
    assert!(c < a && a < b);
}

#[tokio::test]
async fn test_browser_override_replaces_file_content() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "main.d.ts", "export * from './lib/x'\n");
    write(root, "lib/x.d.ts", "export const platform: 'node'\n");
    write(root, "lib/x.browser.d.ts", "export const platform: 'browser'\n");

    let mut overrides = indexmap::IndexMap::new();
    overrides.insert(
        "./lib/x.d.ts".to_string(),
        BrowserTarget::Path("./lib/x.browser.d.ts".to_string()),
    );

    let mut tree = node(location(root, "typings.json"));
    tree.main = Some("main.d.ts".to_string());
    tree.browser = Some(Browser::Overrides(overrides));

    let options = CompileOptions::new(root, "root").with_meta(false);
    let output = compiler().compile(Arc::new(tree), &options).await.unwrap();

    assert!(output.main.contains("declare module 'root/lib/x' {\nexport const platform: 'node'\n}"));
    assert!(output.browser.contains("declare module 'root/lib/x' {\nexport const platform: 'browser'\n}"));
    assert!(!output.browser.contains("'node'"));
    assert!(output.browser.contains("export * from 'root/lib/x'"));
}

#[tokio::test]
async fn test_disabled_browser_import_is_skipped() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "main.d.ts", "import './server'\nexport const a: number\n");
    write(root, "server.d.ts", "export const port: number\n");

    let mut overrides = indexmap::IndexMap::new();
    overrides.insert("./server.d.ts".to_string(), BrowserTarget::Disabled(false));

    let mut tree = node(location(root, "typings.json"));
    tree.main = Some("main.d.ts".to_string());
    tree.browser = Some(Browser::Overrides(overrides));

    let options = CompileOptions::new(root, "root").with_meta(false);
    let output = compiler().compile(Arc::new(tree), &options).await.unwrap();

    assert!(output.main.contains("declare module 'root/server'"));
    assert!(!output.browser.contains("declare module 'root/server'"));
    assert!(output.browser.contains("import './server'"));
}

#[tokio::test]
async fn test_ambient_declarations_in_dependency_fail() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "index.d.ts", "declare module \"foo\" {\n  export const foo: number\n}\n");

    let mut tree = node(location(root, "typings.json"));
    tree.main = Some("index.d.ts".to_string());
    let tree = Arc::new(tree);

    let err = compiler()
        .compile(Arc::clone(&tree), &CompileOptions::new(root, "root"))
        .await
        .unwrap_err();
    match err {
        CompileError::AmbientInDependency { name, modules } => {
            assert_eq!(name, "root");
            assert_eq!(modules, vec!["foo"]);
        }
        other => panic!("unexpected error: {other}"),
    }

    let options = CompileOptions::new(root, "root").with_ambient(true).with_meta(false);
    let output = compiler().compile(tree, &options).await.unwrap();
    assert_eq!(output.main, "declare module \"foo\" {\n  export const foo: number\n}");
}

#[tokio::test]
async fn test_external_module_in_ambient_fails() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "index.d.ts", "export const a: number\n");

    let mut tree = node(location(root, "typings.json"));
    tree.main = Some("index.d.ts".to_string());

    let options = CompileOptions::new(root, "root").with_ambient(true);
    let err = compiler().compile(Arc::new(tree), &options).await.unwrap_err();
    assert!(matches!(err, CompileError::ExternalModuleInAmbient { name } if name == "root"));
}

#[tokio::test]
async fn test_missing_dependency_is_tracked() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "index.d.ts", "import x from 'unknown'\nexport default x\n");

    let mut tree = node(location(root, "typings.json"));
    tree.main = Some("index.d.ts".to_string());

    let (emitter, mut events) = Emitter::channel();
    let options = CompileOptions::new(root, "root").with_meta(false);
    let output = compiler()
        .with_emitter(emitter)
        .compile(Arc::new(tree), &options)
        .await
        .unwrap();

    assert!(output.main.contains("import x from 'unknown'"));
    assert!(output.main.contains("export { default } from 'root/index';"));
    assert_eq!(
        output.missing["unknown"],
        vec![ReferenceUsage {
            name: "root".to_string(),
            main: true,
            browser: true,
        }]
    );

    assert_eq!(
        events.try_recv().unwrap(),
        Event::MissingDependency {
            module: "unknown".to_string(),
            consumer: "root".to_string(),
        }
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_missing_dependency_fails_when_strict() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "index.d.ts", "import x from 'unknown'\nexport default x\n");

    let mut tree = node(location(root, "typings.json"));
    tree.main = Some("index.d.ts".to_string());

    let options = CompileOptions::new(root, "root").with_missing_policy(MissingDependencyPolicy::Fail);
    let err = compiler().compile(Arc::new(tree), &options).await.unwrap_err();
    assert!(matches!(
        err,
        CompileError::MissingDependency { module, name } if module == "unknown" && name == "root"
    ));
}

#[tokio::test]
async fn test_missing_entry() {
    let temp = TempDir::new().unwrap();
    let tree = node(location(temp.path(), "typings.json"));

    let err = compiler()
        .compile(Arc::new(tree), &CompileOptions::new(temp.path(), "root"))
        .await
        .unwrap_err();
    assert!(matches!(err, CompileError::MissingEntry { name } if name == "root"));
}

#[tokio::test]
async fn test_uninstalled_dependency_has_no_entry() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "index.d.ts", "import x = require('x')\nexport = x\n");

    let mut tree = node(location(root, "typings.json"));
    tree.main = Some("index.d.ts".to_string());
    tree.dependencies.insert(
        "x".to_string(),
        Arc::new(DependencyTree::missing(SourceKind::Npm, None, Some("npm:x".to_string()), None)),
    );

    let err = compiler()
        .compile(Arc::new(tree), &CompileOptions::new(root, "root"))
        .await
        .unwrap_err();
    assert!(matches!(err, CompileError::MissingEntry { name } if name == "root~x"));
}

#[tokio::test]
async fn test_unreadable_files() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "index.d.ts", "export * from './lib/nope'\n");

    let mut tree = node(location(root, "typings.json"));
    tree.main = Some("index.d.ts".to_string());

    let err = compiler()
        .compile(Arc::new(tree), &CompileOptions::new(root, "root"))
        .await
        .unwrap_err();
    match &err {
        CompileError::UnreadableImport {
            path,
            name,
            parent,
            source,
            ..
        } => {
            assert_eq!(path, "lib/nope.d.ts");
            assert_eq!(name, "root");
            assert_eq!(parent, &None);
            assert!(source.is_not_found());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("\"lib/nope.d.ts\""));

    let mut dep = node(location(root, "dep/typings.json"));
    dep.main = Some("missing.d.ts".to_string());
    let mut tree = node(location(root, "typings.json"));
    tree.main = Some("main.d.ts".to_string());
    tree.dependencies.insert("dep".to_string(), Arc::new(dep));
    write(root, "main.d.ts", "export * from 'dep'\n");

    let err = compiler()
        .compile(Arc::new(tree), &CompileOptions::new(root, "root"))
        .await
        .unwrap_err();
    assert!(matches!(
        &err,
        CompileError::UnreadableEntry { name, parent: Some(parent), .. } if name == "root~dep" && parent == "root"
    ));
    assert!(err.to_string().contains("The author of \"root\" needs to"));
}

#[tokio::test]
async fn test_references_are_stripped_and_reported() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "index.d.ts",
        "/// <reference path=\"./globals.d.ts\" />\nexport const a: number\n",
    );

    let mut tree = node(location(root, "typings.json"));
    tree.main = Some("index.d.ts".to_string());

    let (emitter, mut events) = Emitter::channel();
    let options = CompileOptions::new(root, "root").with_meta(false);
    let output = compiler()
        .with_emitter(emitter)
        .compile(Arc::new(tree), &options)
        .await
        .unwrap();

    assert!(!output.main.contains("reference"));
    assert!(output.main.starts_with("declare module 'root/index' {\nexport const a: number\n}"));

    let globals = location(root, "globals.d.ts");
    assert_eq!(output.references.len(), 1);
    assert!(output.references[&globals][0].main && output.references[&globals][0].browser);
    assert_eq!(
        events.try_recv().unwrap(),
        Event::StrippedReference {
            path: globals,
            consumer: "root".to_string(),
        }
    );
}

#[tokio::test]
async fn test_library_files_are_skipped() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "index.d.ts", "import './lib'\nexport const a: number\n");
    write(
        root,
        "lib.d.ts",
        "/// <reference no-default-lib=\"true\"/>\ninterface Array<T> {}\n",
    );

    let mut tree = node(location(root, "typings.json"));
    tree.main = Some("index.d.ts".to_string());

    let options = CompileOptions::new(root, "root").with_meta(false);
    let output = compiler().compile(Arc::new(tree), &options).await.unwrap();

    assert!(!output.main.contains("interface Array"));
    assert!(output.main.starts_with("declare module 'root/index'"));
}

#[tokio::test]
async fn test_remote_dependency_source_is_url() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "index.d.ts", "export * from 'remote'\n");

    let url = "http://example.com/remote.d.ts";
    let http = Arc::new(StaticHttp::new().with_response(url, 200, "export const remote: boolean\n"));

    let mut remote = node(url.to_string());
    remote.kind = Some(SourceKind::File);
    remote.typings = Some(url.to_string());

    let mut tree = node(location(root, "typings.json"));
    tree.main = Some("index.d.ts".to_string());
    tree.dependencies.insert("remote".to_string(), Arc::new(remote));

    let output = Compiler::new(test_fetcher(Arc::clone(&http)))
        .compile(Arc::new(tree), &CompileOptions::new(root, "root"))
        .await
        .unwrap();

    assert!(output.main.starts_with(&format!(
        "{}declare module 'root~remote' {{\nexport const remote: boolean\n}}",
        meta(url)
    )));
    assert_eq!(http.requests(url), 1);
}

#[tokio::test]
async fn test_compile_is_deterministic() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let tree = Arc::new(root_fixture(root));
    let options = CompileOptions::new(root, "root");

    let first = compiler().compile(Arc::clone(&tree), &options).await.unwrap();
    let second = compiler().compile(tree, &options).await.unwrap();

    assert_eq!(first.main, second.main);
    assert_eq!(first.browser, second.browser);
}

#[tokio::test]
async fn test_resolve_then_compile() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "typings.json",
        r#"{ "name": "root", "main": "index.d.ts", "dependencies": { "test": "file:custom_typings/definition.d.ts" } }"#,
    );
    write(root, "index.d.ts", "import test from 'test'\nexport default test\n");
    write(root, "custom_typings/definition.d.ts", "export default function (): string\n");

    let fetcher = test_fetcher(Arc::new(StaticHttp::new()));
    let tree = Resolver::new(fetcher.clone())
        .resolve_all(&ResolveOptions::new(root))
        .await
        .unwrap();

    let options = CompileOptions::new(root, "root").with_meta(false);
    let output = Compiler::new(fetcher).compile(Arc::new(tree), &options).await.unwrap();

    assert_eq!(
        output.main,
        [
            "declare module 'root~test' {",
            "export default function (): string",
            "}",
            "",
            "declare module 'root/index' {",
            "import test from 'root~test'",
            "export default test",
            "}",
            "declare module 'root' {",
            "export { default } from 'root/index';",
            "}",
        ]
        .join("\n")
    );
    assert_eq!(output.main, output.browser);
}
