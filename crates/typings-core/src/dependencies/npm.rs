//! `package.json` ecosystem.

use futures::future::{BoxFuture, FutureExt, try_join_all};
use std::sync::Arc;

use super::{ResolveOptions, Resolver, branch_error, check_circular};
use crate::constants::{CONFIG_FILE, NPM_MANIFEST, NPM_MODULES_DIR};
use crate::error::{Error, Result};
use crate::events::Event;
use crate::manifest::{PackageJson, find_up};
use crate::merge::merge_dependency_branches;
use crate::path::{dirname, is_definition, path_to_string, resolve_from};
use crate::tree::{DependencyBranch, DependencyTree, Lineage, SourceKind};

const DEFAULT_MAIN: &str = "index.js";

impl Resolver {
    /// Resolve the nearest `package.json` above `options.cwd`.
    pub async fn resolve_npm_dependencies(&self, options: &ResolveOptions) -> Result<DependencyTree> {
        let runtime = self.fetcher.runtime();

        match find_up(runtime.as_ref(), &options.cwd, NPM_MANIFEST).await {
            Some(src) => {
                self.resolve_npm_dependency_from(path_to_string(&src), None, options.clone(), None)
                    .await
            }
            None => Ok(DependencyTree::missing(SourceKind::Npm, None, None, None)),
        }
    }

    /// Find an installed package (or a file inside one) from `options.cwd`.
    pub(super) fn resolve_npm_dependency(
        &self,
        location: String,
        raw: String,
        options: ResolveOptions,
        parent: Option<Arc<Lineage>>,
    ) -> BoxFuture<'_, Result<DependencyTree>> {
        async move {
            let relative = format!("{NPM_MODULES_DIR}/{location}");
            let Some(path) = find_up(self.fetcher.runtime().as_ref(), &options.cwd, &relative).await else {
                return Err(Error::NotInstalled { raw, cwd: options.cwd });
            };

            let src = path_to_string(&path);
            if is_definition(&src) {
                return self.resolve_file_dependency(src, raw, options, parent).await;
            }

            self.resolve_npm_dependency_from(src, Some(raw), options, parent).await
        }
        .boxed()
    }

    fn resolve_npm_dependency_from(
        &self,
        src: String,
        raw: Option<String>,
        options: ResolveOptions,
        parent: Option<Arc<Lineage>>,
    ) -> BoxFuture<'_, Result<DependencyTree>> {
        async move {
            check_circular(parent.as_ref(), &src)?;

            let package: PackageJson = self.fetcher.fetch_json(&src, false).await?;
            let lineage = Lineage::new(src.clone(), raw.clone(), parent.clone());
            let child_options = options.child(&src);
            let consumer = raw.as_deref().unwrap_or(&src);

            let mut names: Vec<&String> = package.dependencies.keys().collect();
            for name in package.optional_dependencies.keys() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            let dev_names: Vec<&String> = if options.dev {
                package.dev_dependencies.keys().collect()
            } else {
                Vec::new()
            };

            let (dependencies, dev_dependencies, typed) = futures::try_join!(
                self.resolve_npm_map(&names, &child_options, &lineage, consumer),
                self.resolve_npm_map(&dev_names, &child_options, &lineage, consumer),
                self.resolve_sibling_typings(&src, &options, &lineage),
            )?;

            Ok(DependencyTree {
                kind: Some(SourceKind::Npm),
                src: Some(src.clone()),
                raw,
                name: package.name,
                version: package.version,
                main: Some(package.main.unwrap_or_else(|| DEFAULT_MAIN.to_string())),
                browser: package.browser,
                typings: package.typings,
                browser_typings: package.browser_typings,
                missing: false,
                dependencies: merge_dependency_branches([&dependencies, &typed.dependencies]),
                dev_dependencies: merge_dependency_branches([&dev_dependencies, &typed.dev_dependencies]),
                ambient_dependencies: typed.ambient_dependencies,
                ambient_dev_dependencies: typed.ambient_dev_dependencies,
                parent,
            })
        }
        .boxed()
    }

    /// Packages declared by a `package.json`. Uninstalled packages become missing nodes.
    async fn resolve_npm_map(
        &self,
        names: &[&String],
        options: &ResolveOptions,
        lineage: &Arc<Lineage>,
        consumer: &str,
    ) -> Result<DependencyBranch> {
        let resolutions = names.iter().map(|name| async move {
            let raw = format!("npm:{name}");
            let location = format!("{name}/{NPM_MANIFEST}");
            let parent = Some(Arc::clone(lineage));

            let tree = match self
                .resolve_npm_dependency(location, raw.clone(), options.clone(), parent.clone())
                .await
            {
                Ok(tree) => tree,
                Err(Error::NotInstalled { .. }) => {
                    self.emitter.emit(Event::NotInstalled {
                        name: name.to_string(),
                        raw: raw.clone(),
                        consumer: consumer.to_string(),
                    });
                    DependencyTree::missing(SourceKind::Npm, None, Some(raw), parent)
                }
                Err(err) => return Err(branch_error(name, &raw, consumer, err)),
            };

            Ok(((*name).clone(), Arc::new(tree)))
        });

        Ok(try_join_all(resolutions).await?.into_iter().collect())
    }

    /// The `typings.json` beside a package manifest, if any.
    ///
    /// Skipped for the project root (no raw dependency string), whose
    /// `typings.json` is resolved as its own ecosystem.
    pub(super) async fn resolve_sibling_typings(
        &self,
        src: &str,
        options: &ResolveOptions,
        lineage: &Arc<Lineage>,
    ) -> Result<DependencyTree> {
        let config = resolve_from(src, CONFIG_FILE);

        if lineage.raw.is_none() || !self.fetcher.is_file(&config).await {
            return Ok(DependencyTree::missing(SourceKind::Typings, None, None, None));
        }

        tracing::trace!(src = %config, consumer = %dirname(src), "reading sibling typings");
        self.resolve_type_dependency_from(config, None, options.clone(), Some(Arc::clone(lineage)))
            .await
    }
}
