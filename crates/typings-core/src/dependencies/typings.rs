//! `typings.json` ecosystem.

use futures::future::{BoxFuture, FutureExt, try_join_all};
use std::sync::Arc;

use super::{ResolveOptions, Resolver, check_circular};
use crate::constants::CONFIG_FILE;
use crate::error::Result;
use crate::manifest::{ConfigJson, DependencyMap, find_up};
use crate::path::path_to_string;
use crate::tree::{DependencyBranch, DependencyTree, Lineage, SourceKind};

impl Resolver {
    /// Resolve the nearest `typings.json` above `options.cwd`.
    pub async fn resolve_type_dependencies(&self, options: &ResolveOptions) -> Result<DependencyTree> {
        let runtime = self.fetcher.runtime();

        match find_up(runtime.as_ref(), &options.cwd, CONFIG_FILE).await {
            Some(src) => {
                self.resolve_type_dependency_from(path_to_string(&src), None, options.clone(), None)
                    .await
            }
            None => Ok(DependencyTree::missing(SourceKind::Typings, None, None, None)),
        }
    }

    pub(super) fn resolve_type_dependency_from(
        &self,
        src: String,
        raw: Option<String>,
        options: ResolveOptions,
        parent: Option<Arc<Lineage>>,
    ) -> BoxFuture<'_, Result<DependencyTree>> {
        async move {
            check_circular(parent.as_ref(), &src)?;

            let config: ConfigJson = self.fetcher.fetch_json(&src, true).await?;
            let lineage = Lineage::new(src.clone(), raw.clone(), parent.clone());
            let child_options = options.child(&src);
            let consumer = raw.as_deref().unwrap_or(&src);

            let empty = DependencyMap::new();
            let dev_map = if options.dev { &config.dev_dependencies } else { &empty };
            let ambient_map = if options.ambient { &config.ambient_dependencies } else { &empty };
            let ambient_dev_map = if options.ambient && options.dev {
                &config.ambient_dev_dependencies
            } else {
                &empty
            };

            let (dependencies, dev_dependencies, ambient_dependencies, ambient_dev_dependencies) = futures::try_join!(
                self.resolve_type_map(&config.dependencies, &child_options, &lineage, consumer),
                self.resolve_type_map(dev_map, &child_options, &lineage, consumer),
                self.resolve_type_map(ambient_map, &child_options, &lineage, consumer),
                self.resolve_type_map(ambient_dev_map, &child_options, &lineage, consumer),
            )?;

            tracing::trace!(
                src = %src,
                dependencies = dependencies.len(),
                ambient = ambient_dependencies.len(),
                "resolved typings manifest"
            );

            Ok(DependencyTree {
                kind: Some(SourceKind::Typings),
                src: Some(src.clone()),
                raw,
                name: config.name,
                version: config.version,
                main: config.main,
                browser: config.browser,
                typings: config.typings,
                browser_typings: config.browser_typings,
                missing: false,
                dependencies,
                dev_dependencies,
                ambient_dependencies,
                ambient_dev_dependencies,
                parent,
            })
        }
        .boxed()
    }

    /// Each entry resolves to its first candidate that succeeds.
    async fn resolve_type_map(
        &self,
        map: &DependencyMap,
        options: &ResolveOptions,
        lineage: &Arc<Lineage>,
        consumer: &str,
    ) -> Result<DependencyBranch> {
        let resolutions = map
            .iter()
            .map(|(name, value)| self.resolve_candidates(name, value, options, lineage, consumer));

        Ok(try_join_all(resolutions).await?.into_iter().collect())
    }
}
