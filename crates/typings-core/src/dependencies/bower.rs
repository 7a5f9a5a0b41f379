//! `bower.json` ecosystem.
//!
//! Bower installs flat, so every nested component is looked up in the
//! components directory of the project that started the walk.

use futures::future::{BoxFuture, FutureExt, try_join_all};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{ResolveOptions, Resolver, branch_error, check_circular};
use crate::constants::{BOWER_COMPONENTS_DIR, BOWER_MANIFEST, BOWER_RC_FILE};
use crate::error::{Error, Result};
use crate::events::Event;
use crate::manifest::{BowerJson, BowerRc, find_up};
use crate::merge::merge_dependency_branches;
use crate::path::{clean, dirname, is_definition, path_to_string};
use crate::tree::{DependencyBranch, DependencyTree, Lineage, SourceKind};

impl Resolver {
    /// Resolve the nearest `bower.json` above `options.cwd`.
    pub async fn resolve_bower_dependencies(&self, options: &ResolveOptions) -> Result<DependencyTree> {
        let runtime = self.fetcher.runtime();

        let Some(src) = find_up(runtime.as_ref(), &options.cwd, BOWER_MANIFEST).await else {
            return Ok(DependencyTree::missing(SourceKind::Bower, None, None, None));
        };

        let src = path_to_string(&src);
        let components = self.resolve_components_dir(Path::new(&dirname(&src))).await?;
        self.resolve_bower_dependency_from(src, None, components, options.clone(), None)
            .await
    }

    /// A component (or a file inside one) from the components directory of `options.cwd`.
    pub(super) fn resolve_bower_dependency(
        &self,
        location: String,
        raw: String,
        options: ResolveOptions,
        parent: Option<Arc<Lineage>>,
    ) -> BoxFuture<'_, Result<DependencyTree>> {
        async move {
            let components = self.resolve_components_dir(&options.cwd).await?;
            let src = clean(&components.join(&location));

            if !self.fetcher.is_file(&src).await {
                return Err(Error::NotInstalled { raw, cwd: options.cwd });
            }

            if is_definition(&src) {
                return self.resolve_file_dependency(src, raw, options, parent).await;
            }

            self.resolve_bower_dependency_from(src, Some(raw), components, options, parent)
                .await
        }
        .boxed()
    }

    fn resolve_bower_dependency_from(
        &self,
        src: String,
        raw: Option<String>,
        components: PathBuf,
        options: ResolveOptions,
        parent: Option<Arc<Lineage>>,
    ) -> BoxFuture<'_, Result<DependencyTree>> {
        async move {
            check_circular(parent.as_ref(), &src)?;

            let bower: BowerJson = self.fetcher.fetch_json(&src, false).await?;
            let lineage = Lineage::new(src.clone(), raw.clone(), parent.clone());
            let consumer = raw.as_deref().unwrap_or(&src);

            let names: Vec<&String> = bower.dependencies.keys().collect();
            let dev_names: Vec<&String> = if options.dev {
                bower.dev_dependencies.keys().collect()
            } else {
                Vec::new()
            };

            // Components share one directory, so children keep the starting cwd.
            let child_options = ResolveOptions {
                dev: false,
                ambient: false,
                ..options.clone()
            };

            let (dependencies, dev_dependencies, typed) = futures::try_join!(
                self.resolve_bower_map(&names, &components, &child_options, &lineage, consumer),
                self.resolve_bower_map(&dev_names, &components, &child_options, &lineage, consumer),
                self.resolve_sibling_typings(&src, &options, &lineage),
            )?;

            Ok(DependencyTree {
                kind: Some(SourceKind::Bower),
                src: Some(src.clone()),
                raw,
                main: bower.main_file(),
                name: bower.name,
                version: bower.version,
                browser: bower.browser,
                typings: bower.typings,
                browser_typings: bower.browser_typings,
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

    async fn resolve_bower_map(
        &self,
        names: &[&String],
        components: &Path,
        options: &ResolveOptions,
        lineage: &Arc<Lineage>,
        consumer: &str,
    ) -> Result<DependencyBranch> {
        let resolutions = names.iter().map(|name| async move {
            let raw = format!("bower:{name}");
            let src = clean(&components.join(name.as_str()).join(BOWER_MANIFEST));
            let parent = Some(Arc::clone(lineage));

            let tree = if self.fetcher.is_file(&src).await {
                self.resolve_bower_dependency_from(
                    src,
                    Some(raw.clone()),
                    components.to_path_buf(),
                    options.clone(),
                    parent,
                )
                .await
                .map_err(|err| branch_error(name, &raw, consumer, err))?
            } else {
                self.emitter.emit(Event::NotInstalled {
                    name: name.to_string(),
                    raw: raw.clone(),
                    consumer: consumer.to_string(),
                });
                DependencyTree::missing(SourceKind::Bower, Some(src), Some(raw), parent)
            };

            Ok::<_, Error>(((*name).clone(), Arc::new(tree)))
        });

        Ok(try_join_all(resolutions).await?.into_iter().collect())
    }

    /// `<dir>/<.bowerrc directory>`, defaulting to `bower_components`.
    async fn resolve_components_dir(&self, dir: &Path) -> Result<PathBuf> {
        let rc_path = path_to_string(&dir.join(BOWER_RC_FILE));

        let directory = if self.fetcher.is_file(&rc_path).await {
            let rc: BowerRc = self.fetcher.fetch_json(&rc_path, true).await?;
            rc.directory
        } else {
            None
        };

        Ok(dir.join(directory.as_deref().unwrap_or(BOWER_COMPONENTS_DIR)))
    }
}
