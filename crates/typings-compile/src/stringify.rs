//! One compile pass over a dependency tree.
//!
//! Files are visited depth first. Children are emitted before the file that
//! imports them, in first-import order, and each file is emitted at most once
//! per [`StringifyContext`].

use futures::future::{BoxFuture, FutureExt, join_all};
use parking_lot::Mutex;
use std::sync::Arc;
use typings_core::location::resolve_relative;
use typings_core::path::{is_module_name, normalize_to_definition, relative_to, relative_to_dir, resolve_from, split_module_name};
use typings_core::references::{extract_references, is_lib_file, strip_references};
use typings_core::{DependencyTree, FetchError, Fetcher, PROJECT_NAME, VERSION};

use crate::context::{OverrideTarget, StringifyContext};
use crate::error::{CompileError, Result};
use crate::rewrite::{Edit, splice};
use crate::scan::{DeclarationFile, SpecifierKind, scan_declaration};
use crate::{CompileOptions, MissingDependencyPolicy, ReferenceMap, record_usage};

pub(crate) struct PassOutput {
    pub text: String,
    pub references: ReferenceMap,
    pub missing: ReferenceMap,
}

pub(crate) struct Pass<'a> {
    fetcher: &'a Fetcher,
    options: &'a CompileOptions,
    browser: bool,
    references: Mutex<ReferenceMap>,
    missing: Mutex<ReferenceMap>,
}

impl<'a> Pass<'a> {
    pub fn new(fetcher: &'a Fetcher, options: &'a CompileOptions, browser: bool) -> Self {
        Self {
            fetcher,
            options,
            browser,
            references: Mutex::new(ReferenceMap::new()),
            missing: Mutex::new(ReferenceMap::new()),
        }
    }

    pub async fn run(self, tree: Arc<DependencyTree>) -> Result<PassOutput> {
        let ctx = StringifyContext::new(
            tree,
            self.options.name.clone(),
            self.options.ambient,
            self.browser,
            None,
        );

        let text = self.compile_dependency_path(None, ctx).await?;
        tracing::debug!(browser = self.browser, name = %self.options.name, "compiled pass");

        Ok(PassOutput {
            text,
            references: self.references.into_inner(),
            missing: self.missing.into_inner(),
        })
    }

    /// Compile `path` within a node, or its entry when `path` is `None`.
    async fn compile_dependency_path(&self, path: Option<&str>, ctx: Arc<StringifyContext>) -> Result<String> {
        let path = match (path, &ctx.entry) {
            _ if ctx.tree.missing => None,
            (Some(path), _) => Some(resolve_from(&ctx.src, &normalize_to_definition(path))),
            (None, entry) => entry.clone(),
        };

        let Some(path) = path else {
            return Err(CompileError::MissingEntry { name: ctx.name.clone() });
        };

        ctx.mark_imported(&path);
        self.stringify_path(path, ctx).await
    }

    async fn load_by_module_name(&self, specifier: &str, ctx: Arc<StringifyContext>) -> Result<String> {
        let (alias, sub_path) = split_module_name(specifier);

        if let Some(OverrideTarget::Path(target)) = ctx.override_for(alias) {
            let target = target.clone();
            return self.stringify_path(target, ctx).await;
        }

        match ctx.child(alias, self.browser) {
            Some(child) => self.compile_dependency_path(sub_path, child).await,
            None => {
                self.track_missing(&ctx, alias)?;
                Ok(String::new())
            }
        }
    }

    fn stringify_path(&self, original: String, ctx: Arc<StringifyContext>) -> BoxFuture<'_, Result<String>> {
        async move {
            let path = normalize_to_definition(&original);

            let resolved = match ctx.override_for(&path).cloned() {
                Some(OverrideTarget::Ignore) => return Ok(String::new()),
                Some(OverrideTarget::Module(module)) => return self.load_by_module_name(&module, ctx).await,
                Some(OverrideTarget::Path(target)) => target,
                None => path.clone(),
            };

            let raw = self
                .fetcher
                .fetch_text(&resolved)
                .await
                .map_err(|source| read_error(&ctx, &path, &resolved, source))?;

            if is_lib_file(&raw) {
                tracing::debug!(path = %resolved, "skipping library file");
                return Ok(String::new());
            }

            for reference in extract_references(&raw, &resolved) {
                self.track_reference(&ctx, &reference.path)?;
            }

            let text = strip_references(&raw);
            let file = scan_declaration(&resolved, &text)?;

            let resolve = |specifier: &String| {
                if is_module_name(specifier) {
                    specifier.clone()
                } else {
                    resolve_from(&resolved, &normalize_to_definition(specifier))
                }
            };

            let mut imports: Vec<String> = file.imports.iter().map(resolve).collect();
            let inline: Vec<String> = file.ambient_modules.iter().map(resolve).collect();

            if !ctx.ambient {
                let modules: Vec<String> = inline.iter().filter(|name| !imports.contains(name)).cloned().collect();
                if !modules.is_empty() {
                    return Err(CompileError::AmbientInDependency {
                        name: ctx.name.clone(),
                        modules,
                    });
                }
            } else {
                imports.extend(ctx.tree.dependencies.keys().cloned());
            }

            self.prefetch(&imports, &ctx).await;

            let mut outputs = Vec::new();
            for import in imports {
                let key = match ctx.override_for(&import) {
                    Some(OverrideTarget::Ignore) => continue,
                    Some(OverrideTarget::Path(target)) => target.clone(),
                    Some(OverrideTarget::Module(_)) | None => import.clone(),
                };

                if inline.contains(&import) || !ctx.mark_imported(&key) {
                    continue;
                }

                let output = if is_module_name(&import) {
                    self.load_by_module_name(&import, Arc::clone(&ctx)).await?
                } else {
                    self.stringify_path(import, Arc::clone(&ctx)).await?
                };

                if !output.is_empty() {
                    outputs.push(output);
                }
            }

            let own = self.stringify_file(&path, &resolved, &text, &file, &ctx)?;
            if !own.is_empty() {
                outputs.push(own);
            }

            Ok(outputs.join("\n\n"))
        }
        .boxed()
    }

    /// Warm the fetch cache for every file import not yet emitted, so sibling
    /// reads overlap.
    async fn prefetch(&self, imports: &[String], ctx: &StringifyContext) {
        let targets: Vec<&str> = imports
            .iter()
            .filter(|import| !is_module_name(import))
            .filter_map(|import| match ctx.override_for(import) {
                Some(OverrideTarget::Path(target)) => Some(target.as_str()),
                Some(_) => None,
                None => Some(import.as_str()),
            })
            .filter(|target| !ctx.is_imported(target))
            .collect();

        if targets.len() > 1 {
            // Failures stay cached and surface from the sequential read.
            let _ = join_all(targets.into_iter().map(|target| self.fetcher.fetch_text(target))).await;
        }
    }

    fn stringify_file(
        &self,
        path: &str,
        resolved: &str,
        text: &str,
        file: &DeclarationFile,
        ctx: &StringifyContext,
    ) -> Result<String> {
        let prefix = if self.options.meta {
            format!(
                "// Compiled using {PROJECT_NAME}@{VERSION}\n// Source: {}\n",
                relative_to_dir(&self.options.cwd, resolved)
            )
        } else {
            String::new()
        };

        if ctx.ambient {
            if file.is_external {
                return Err(CompileError::ExternalModuleInAmbient { name: ctx.name.clone() });
            }

            return Ok(format!("{prefix}{}", text.trim()));
        }

        let mut edits: Vec<Edit> = file
            .specifiers
            .iter()
            .map(|site| {
                let target = ctx.import_path(resolved, &site.value);
                let replacement = match site.kind {
                    SpecifierKind::Literal => format!("'{target}'"),
                    SpecifierKind::Require => format!("require('{target}')"),
                };
                Edit::new(site.range.clone(), replacement)
            })
            .collect();
        edits.extend(file.declare_keywords.iter().cloned().map(Edit::remove));

        let body = splice(text, edits);
        let is_entry = ctx.entry.as_deref() == Some(path);

        if is_entry && ctx.is_typings {
            return Ok(format!("{prefix}{}", declare_text(&ctx.name, &body)));
        }

        let module_path = ctx.module_path(path);
        let mut output = format!("{prefix}{}", declare_text(&module_path, &body));

        if is_entry {
            let mut parts = Vec::new();
            if file.has_export_equals {
                parts.push(format!("import main = require('{module_path}');"));
                parts.push("export = main;".to_string());
            } else {
                if file.has_exports {
                    parts.push(format!("export * from '{module_path}';"));
                }
                if file.has_default_export {
                    parts.push(format!("export {{ default }} from '{module_path}';"));
                }
            }

            output.push('\n');
            output.push_str(&declare_text(&ctx.name, &parts.join("\n")));
        }

        Ok(output)
    }

    fn track_reference(&self, ctx: &StringifyContext, path: &str) -> Result<()> {
        let key = match &ctx.tree.raw {
            Some(raw) => resolve_relative(raw, &relative_to(&ctx.src, path)).map_err(|source| {
                CompileError::Reference {
                    name: ctx.name.clone(),
                    source,
                }
            })?,
            None => path.to_string(),
        };

        record_usage(&mut self.references.lock(), key, &ctx.name, self.browser);
        Ok(())
    }

    fn track_missing(&self, ctx: &StringifyContext, module: &str) -> Result<()> {
        if self.options.missing == MissingDependencyPolicy::Fail {
            return Err(CompileError::MissingDependency {
                module: module.to_string(),
                name: ctx.name.clone(),
            });
        }

        record_usage(&mut self.missing.lock(), module.to_string(), &ctx.name, self.browser);
        Ok(())
    }
}

fn read_error(ctx: &StringifyContext, path: &str, resolved: &str, source: FetchError) -> CompileError {
    if ctx.entry.as_deref() == Some(path) {
        return CompileError::UnreadableEntry {
            name: ctx.name.clone(),
            parent: ctx.parent.clone(),
            source,
        };
    }

    CompileError::UnreadableImport {
        path: relative_to(&ctx.src, resolved),
        name: ctx.name.clone(),
        src: ctx.src.clone(),
        parent: ctx.parent.clone(),
        source,
    }
}

/// `declare module 'name' { .. }`
fn declare_text(name: &str, body: &str) -> String {
    if body.is_empty() {
        format!("declare module '{name}' {{}}")
    } else {
        format!("declare module '{name}' {{\n{body}\n}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use typings_core::runtime::test_utils::{StaticHttp, test_fetcher};

    #[tokio::test]
    async fn test_prefetch_skips_emitted_files() {
        let seen = "http://example.com/a.d.ts";
        let fresh = ["http://example.com/b.d.ts", "http://example.com/c.d.ts"];
        let http = Arc::new(
            StaticHttp::new()
                .with_response(seen, 200, "export {}")
                .with_response(fresh[0], 200, "export {}")
                .with_response(fresh[1], 404, "Not Found"),
        );
        let fetcher = test_fetcher(Arc::clone(&http));
        let options = CompileOptions::new("/project", "root");

        let tree = DependencyTree {
            src: Some("http://example.com/typings.json".to_string()),
            ..Default::default()
        };
        let ctx = StringifyContext::new(Arc::new(tree), "root".to_string(), false, false, None);
        ctx.mark_imported(seen);

        let imports: Vec<String> = std::iter::once(seen).chain(fresh).map(str::to_string).collect();
        Pass::new(&fetcher, &options, false).prefetch(&imports, &ctx).await;

        assert_eq!(http.requests(seen), 0);
        assert_eq!(http.requests(fresh[0]), 1);
        assert_eq!(http.requests(fresh[1]), 1);
    }

    #[test]
    fn test_declare_text() {
        assert_eq!(declare_text("root", "export const a: 1"), "declare module 'root' {\nexport const a: 1\n}");
        assert_eq!(declare_text("root", ""), "declare module 'root' {}");
    }
}
