//! Typings compiler
//!
//! Turns a resolved [`DependencyTree`] into two self-contained declaration
//! bodies, one for the main entry points and one with `browser` overrides
//! applied. Every file is wrapped in a `declare module` block named after
//! its position in the tree (`root/lib/x`, `root~dep`), so dependencies with
//! clashing names can live side by side in one global declaration file.
//!
//! ```rust,ignore
//! use typings_compile::{CompileOptions, Compiler};
//!
//! let options = CompileOptions::new(cwd, "root");
//! let output = Compiler::new(fetcher).compile(tree, &options).await?;
//! std::fs::write(out.join("main.d.ts"), &output.main)?;
//! ```

mod context;
mod error;
mod rewrite;
mod scan;
mod stringify;

use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use typings_core::{DependencyTree, Emitter, Event, Fetcher};

pub use error::{CompileError, Result};

use stringify::Pass;

/// What to do with a bare module import that matches no dependency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingDependencyPolicy {
    /// Leave the import untouched and report it in [`CompiledOutput::missing`].
    #[default]
    Track,
    /// Fail with [`CompileError::MissingDependency`].
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Directory `// Source:` paths are written relative to.
    pub cwd: PathBuf,
    /// Module name of the root node.
    pub name: String,
    /// Compile the root as global declarations.
    pub ambient: bool,
    /// Prefix every file with a meta comment.
    pub meta: bool,
    pub missing: MissingDependencyPolicy,
}

impl CompileOptions {
    pub fn new(cwd: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            cwd: cwd.into(),
            name: name.into(),
            ambient: false,
            meta: true,
            missing: MissingDependencyPolicy::default(),
        }
    }

    pub fn with_ambient(mut self, ambient: bool) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_meta(mut self, meta: bool) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_missing_policy(mut self, missing: MissingDependencyPolicy) -> Self {
        self.missing = missing;
        self
    }
}

/// Which compiled outputs a reference or missing module was seen in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceUsage {
    /// Module name of the node that contained it.
    pub name: String,
    pub main: bool,
    pub browser: bool,
}

/// Location (or module name) to every node that used it.
pub type ReferenceMap = IndexMap<String, Vec<ReferenceUsage>>;

#[derive(Debug, Clone)]
pub struct CompiledOutput {
    pub tree: Arc<DependencyTree>,
    pub main: String,
    pub browser: String,
    /// Triple-slash references stripped from the output.
    pub references: ReferenceMap,
    /// Bare module imports with no matching dependency.
    pub missing: ReferenceMap,
}

/// Compiles dependency trees into declaration text.
#[derive(Debug, Clone)]
pub struct Compiler {
    fetcher: Fetcher,
    emitter: Emitter,
}

impl Compiler {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            emitter: Emitter::default(),
        }
    }

    pub fn with_emitter(mut self, emitter: Emitter) -> Self {
        self.emitter = emitter;
        self
    }

    /// Run the main and browser passes over `tree`.
    ///
    /// Both passes share a fetch cache that starts empty, so files edited
    /// since resolution are read again.
    pub async fn compile(&self, tree: Arc<DependencyTree>, options: &CompileOptions) -> Result<CompiledOutput> {
        let fetcher = self.fetcher.fresh();

        let (main, browser) = futures::try_join!(
            Pass::new(&fetcher, options, false).run(Arc::clone(&tree)),
            Pass::new(&fetcher, options, true).run(Arc::clone(&tree)),
        )?;

        let mut references = main.references;
        merge_references(&mut references, browser.references);
        let mut missing = main.missing;
        merge_references(&mut missing, browser.missing);

        for (path, usages) in &references {
            for usage in usages {
                self.emitter.emit(Event::StrippedReference {
                    path: path.clone(),
                    consumer: usage.name.clone(),
                });
            }
        }

        for (module, usages) in &missing {
            for usage in usages {
                self.emitter.emit(Event::MissingDependency {
                    module: module.clone(),
                    consumer: usage.name.clone(),
                });
            }
        }

        Ok(CompiledOutput {
            tree,
            main: main.text,
            browser: browser.text,
            references,
            missing,
        })
    }
}

/// Compile `tree` with a default [`Compiler`].
pub async fn compile(tree: Arc<DependencyTree>, options: &CompileOptions, fetcher: &Fetcher) -> Result<CompiledOutput> {
    Compiler::new(fetcher.clone()).compile(tree, options).await
}

pub(crate) fn record_usage(map: &mut ReferenceMap, key: String, name: &str, browser: bool) {
    let usages = map.entry(key).or_default();

    match usages.iter_mut().find(|usage| usage.name == name) {
        Some(usage) if browser => usage.browser = true,
        Some(usage) => usage.main = true,
        None => usages.push(ReferenceUsage {
            name: name.to_string(),
            main: !browser,
            browser,
        }),
    }
}

/// Fold `other` into `into`, combining the pass flags of matching users.
pub fn merge_references(into: &mut ReferenceMap, other: ReferenceMap) {
    for (key, usages) in other {
        for usage in usages {
            if usage.main {
                record_usage(into, key.clone(), &usage.name, false);
            }
            if usage.browser {
                record_usage(into, key.clone(), &usage.name, true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_references_combines_passes() {
        let mut main = ReferenceMap::new();
        record_usage(&mut main, "/p/a.d.ts".to_string(), "root", false);

        let mut browser = ReferenceMap::new();
        record_usage(&mut browser, "/p/a.d.ts".to_string(), "root", true);
        record_usage(&mut browser, "/p/b.d.ts".to_string(), "root~b", true);

        merge_references(&mut main, browser);

        assert_eq!(
            main["/p/a.d.ts"],
            vec![ReferenceUsage {
                name: "root".to_string(),
                main: true,
                browser: true
            }]
        );
        assert_eq!(
            main["/p/b.d.ts"],
            vec![ReferenceUsage {
                name: "root~b".to_string(),
                main: false,
                browser: true
            }]
        );
    }
}
