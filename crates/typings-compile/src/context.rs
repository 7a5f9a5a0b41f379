//! Per-node compile state.
//!
//! A [`StringifyContext`] is built for each dependency node a pass touches.
//! It owns the node's entry file, its `browser` override map and the set of
//! files already emitted for the node. Child contexts are created lazily
//! and cached by alias, so each node is compiled once per context.

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use typings_core::path::{
    from_definition, is_module_name, join_module_path, normalize_to_definition, relative_to, resolve_from,
    split_module_name,
};
use typings_core::{Browser, BrowserTarget, DEPENDENCY_SEPARATOR, DependencyTree};

/// Replacement for an import target in the browser pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OverrideTarget {
    /// Read another declaration file instead.
    Path(String),
    /// Load another dependency instead.
    Module(String),
    /// Skip the import entirely.
    Ignore,
}

#[derive(Debug)]
pub(crate) struct StringifyContext {
    pub tree: Arc<DependencyTree>,
    /// Module name the node is emitted under (`root`, `root~dep`).
    pub name: String,
    pub ambient: bool,
    /// Manifest location; relative module paths are computed against it.
    pub src: String,
    /// Resolved `.d.ts` entry, if the node declares one.
    pub entry: Option<String>,
    /// The entry came from `typings`/`browserTypings`.
    pub is_typings: bool,
    /// Name of the context that pulled this node in.
    pub parent: Option<String>,
    overrides: FxHashMap<String, OverrideTarget>,
    imported: Mutex<FxHashSet<String>>,
    dependencies: Mutex<FxHashMap<String, Option<Arc<StringifyContext>>>>,
}

impl StringifyContext {
    pub fn new(
        tree: Arc<DependencyTree>,
        name: String,
        ambient: bool,
        browser: bool,
        parent: Option<String>,
    ) -> Arc<Self> {
        let src = tree.src.clone().unwrap_or_default();
        let is_typings = tree.is_typings_mode();

        let (main, browser_field) = if is_typings {
            (tree.typings.as_deref(), tree.browser_typings.as_ref())
        } else {
            (tree.main.as_deref(), tree.browser.as_ref())
        };

        let mut entry = main.map(|main| resolve_from(&src, &normalize_to_definition(main)));
        let mut overrides = FxHashMap::default();

        if browser {
            match browser_field {
                Some(Browser::Path(path)) => {
                    let target = resolve_from(&src, &normalize_to_definition(path));
                    match entry.clone() {
                        Some(main) => {
                            overrides.insert(main, OverrideTarget::Path(target));
                        }
                        None => entry = Some(target),
                    }
                }
                Some(Browser::Overrides(map)) => {
                    for (key, value) in map {
                        let target = match value {
                            BrowserTarget::Disabled(false) => OverrideTarget::Ignore,
                            BrowserTarget::Disabled(true) => continue,
                            BrowserTarget::Path(value) if is_module_name(value) => {
                                OverrideTarget::Module(value.clone())
                            }
                            BrowserTarget::Path(value) => {
                                OverrideTarget::Path(resolve_from(&src, &normalize_to_definition(value)))
                            }
                        };

                        overrides.insert(resolve_override_key(&src, key), target);
                    }
                }
                None => {}
            }
        }

        Arc::new(Self {
            tree,
            name,
            ambient,
            src,
            entry,
            is_typings,
            parent,
            overrides,
            imported: Mutex::new(FxHashSet::default()),
            dependencies: Mutex::new(FxHashMap::default()),
        })
    }

    pub fn override_for(&self, key: &str) -> Option<&OverrideTarget> {
        self.overrides.get(key)
    }

    pub fn is_imported(&self, key: &str) -> bool {
        self.imported.lock().contains(key)
    }

    /// Record `key` as emitted. Returns `false` if it already was.
    pub fn mark_imported(&self, key: &str) -> bool {
        self.imported.lock().insert(key.to_string())
    }

    /// The dependency node an alias refers to, after overrides.
    pub fn dependency_tree(&self, alias: &str) -> Option<&Arc<DependencyTree>> {
        match self.override_for(alias) {
            Some(OverrideTarget::Module(target)) => self.tree.dependencies.get(target),
            Some(OverrideTarget::Ignore) => None,
            _ => self.tree.dependencies.get(alias),
        }
    }

    /// Module name a child dependency is emitted under.
    pub fn child_name(&self, alias: &str) -> String {
        if self.ambient {
            alias.to_string()
        } else {
            format!("{}{DEPENDENCY_SEPARATOR}{alias}", self.name)
        }
    }

    /// The cached child context for `alias`, building it on first use.
    ///
    /// `None` means the node has no such dependency.
    pub fn child(&self, alias: &str, browser: bool) -> Option<Arc<StringifyContext>> {
        if let Some(cached) = self.dependencies.lock().get(alias) {
            return cached.clone();
        }

        let child = self.dependency_tree(alias).map(|tree| {
            StringifyContext::new(
                Arc::clone(tree),
                self.child_name(alias),
                false,
                browser,
                Some(self.name.clone()),
            )
        });

        self.dependencies
            .lock()
            .entry(alias.to_string())
            .or_insert(child)
            .clone()
    }

    /// Module name for a resolved declaration file within this node.
    pub fn module_path(&self, path: &str) -> String {
        join_module_path(&self.name, &relative_to(&self.src, from_definition(path)))
    }

    /// The specifier an import of `specifier` in `from` is rewritten to.
    pub fn import_path(&self, from: &str, specifier: &str) -> String {
        if is_module_name(specifier) {
            return self.module_import_path(specifier);
        }

        let resolved = resolve_from(from, &normalize_to_definition(specifier));
        match self.override_for(&resolved) {
            Some(OverrideTarget::Module(module)) => self.module_import_path(module),
            Some(OverrideTarget::Ignore) => specifier.to_string(),
            Some(OverrideTarget::Path(_)) | None => self.module_path(&resolved),
        }
    }

    fn module_import_path(&self, specifier: &str) -> String {
        let (module, _) = split_module_name(specifier);

        match self.override_for(module) {
            Some(OverrideTarget::Path(target)) => self.module_path(target),
            _ if self.dependency_tree(module).is_some() => format!("{}{DEPENDENCY_SEPARATOR}{specifier}", self.name),
            _ => specifier.to_string(),
        }
    }
}

fn resolve_override_key(src: &str, key: &str) -> String {
    if is_module_name(key) {
        key.to_string()
    } else {
        resolve_from(src, &normalize_to_definition(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use typings_core::SourceKind;

    fn node(src: &str) -> DependencyTree {
        DependencyTree {
            kind: Some(SourceKind::Typings),
            src: Some(src.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_entry_prefers_typings() {
        let mut tree = node("/p/typings.json");
        tree.main = Some("index.js".to_string());
        tree.typings = Some("lib/typed.d.ts".to_string());

        let ctx = StringifyContext::new(Arc::new(tree), "root".to_string(), false, false, None);
        assert!(ctx.is_typings);
        assert_eq!(ctx.entry.as_deref(), Some("/p/lib/typed.d.ts"));

        let mut tree = node("/p/package.json");
        tree.main = Some("index.js".to_string());
        let ctx = StringifyContext::new(Arc::new(tree), "root".to_string(), false, false, None);
        assert!(!ctx.is_typings);
        assert_eq!(ctx.entry.as_deref(), Some("/p/index.d.ts"));
    }

    #[test]
    fn test_browser_string_replaces_entry() {
        let mut tree = node("/p/typings.json");
        tree.main = Some("main.d.ts".to_string());
        tree.browser = Some(Browser::Path("browser.d.ts".to_string()));
        let tree = Arc::new(tree);

        let main = StringifyContext::new(Arc::clone(&tree), "root".to_string(), false, false, None);
        assert_eq!(main.override_for("/p/main.d.ts"), None);

        let browser = StringifyContext::new(tree, "root".to_string(), false, true, None);
        assert_eq!(browser.entry.as_deref(), Some("/p/main.d.ts"));
        assert_eq!(
            browser.override_for("/p/main.d.ts"),
            Some(&OverrideTarget::Path("/p/browser.d.ts".to_string()))
        );
    }

    #[test]
    fn test_browser_map_overrides() {
        let mut map = IndexMap::new();
        map.insert("b".to_string(), BrowserTarget::Path("browser".to_string()));
        map.insert("./lib/x.js".to_string(), BrowserTarget::Path("./lib/x-browser.js".to_string()));
        map.insert("./lib/y".to_string(), BrowserTarget::Disabled(false));
        map.insert("c".to_string(), BrowserTarget::Disabled(true));

        let mut tree = node("/p/typings.json");
        tree.main = Some("index.d.ts".to_string());
        tree.browser = Some(Browser::Overrides(map));
        tree.dependencies.insert("browser".to_string(), Arc::new(node("/p/browser/typings.json")));

        let ctx = StringifyContext::new(Arc::new(tree), "root".to_string(), false, true, None);
        assert_eq!(ctx.override_for("b"), Some(&OverrideTarget::Module("browser".to_string())));
        assert_eq!(
            ctx.override_for("/p/lib/x.d.ts"),
            Some(&OverrideTarget::Path("/p/lib/x-browser.d.ts".to_string()))
        );
        assert_eq!(ctx.override_for("/p/lib/y.d.ts"), Some(&OverrideTarget::Ignore));
        assert_eq!(ctx.override_for("c"), None);

        assert!(ctx.dependency_tree("b").is_some());
        assert_eq!(ctx.import_path("/p/index.d.ts", "b"), "root~b");
        assert_eq!(ctx.import_path("/p/index.d.ts", "./lib/x"), "root/lib/x");
        assert_eq!(ctx.import_path("/p/index.d.ts", "./lib/y"), "./lib/y");
    }

    #[test]
    fn test_import_paths() {
        let mut tree = node("/p/typings.json");
        tree.dependencies.insert("dep".to_string(), Arc::new(node("/p/dep/typings.json")));
        let ctx = StringifyContext::new(Arc::new(tree), "root".to_string(), false, false, None);

        assert_eq!(ctx.import_path("/p/lib/a.d.ts", "dep"), "root~dep");
        assert_eq!(ctx.import_path("/p/lib/a.d.ts", "dep/path"), "root~dep/path");
        assert_eq!(ctx.import_path("/p/lib/a.d.ts", "unknown"), "unknown");
        assert_eq!(ctx.import_path("/p/lib/a.d.ts", "./b"), "root/lib/b");
        assert_eq!(ctx.import_path("/p/lib/a.d.ts", "../c.d.ts"), "root/c");
    }

    #[test]
    fn test_children_are_cached_and_named() {
        let mut tree = node("/p/typings.json");
        tree.dependencies.insert("dep".to_string(), Arc::new(node("/p/dep/typings.json")));
        let tree = Arc::new(tree);

        let ctx = StringifyContext::new(Arc::clone(&tree), "root".to_string(), false, false, None);
        let first = ctx.child("dep", false).unwrap();
        let second = ctx.child("dep", false).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name, "root~dep");
        assert_eq!(first.parent.as_deref(), Some("root"));
        assert!(ctx.child("missing", false).is_none());

        let ambient = StringifyContext::new(tree, "node".to_string(), true, false, None);
        let child = ambient.child("dep", false).unwrap();
        assert_eq!(child.name, "dep");
        assert!(!child.ambient);
    }

    #[test]
    fn test_mark_imported() {
        let ctx = StringifyContext::new(Arc::new(node("/p/typings.json")), "root".to_string(), false, false, None);
        assert!(ctx.mark_imported("/p/a.d.ts"));
        assert!(!ctx.mark_imported("/p/a.d.ts"));
    }
}
