//! Multi-ecosystem dependency resolution.
//!
//! Three ecosystems are walked independently from the project directory:
//! `bower.json`, `package.json` and `typings.json`. Their roots are merged
//! into a single [`DependencyTree`].
//!
//! Sibling dependencies in one manifest map are resolved concurrently; the
//! fan-out never spans more than one map at a time.

mod bower;
mod npm;
mod typings;

use futures::future::{BoxFuture, FutureExt};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Error, FetchError, LocationError, Result};
use crate::events::Emitter;
use crate::location::{DependencyReference, Scheme};
use crate::manifest::DependencyValue;
use crate::merge::merge_trees;
use crate::path::{clean, dirname, is_definition, is_http, resolve_url};
use crate::runtime::Fetcher;
use crate::tree::{DependencyTree, Lineage, SourceKind};

/// Options for one resolution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    pub cwd: PathBuf,
    /// Include `devDependencies`.
    pub dev: bool,
    /// Include `ambientDependencies` (and `ambientDevDependencies` with `dev`).
    pub ambient: bool,
}

impl ResolveOptions {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            dev: false,
            ambient: false,
        }
    }

    pub fn with_dev(mut self, dev: bool) -> Self {
        self.dev = dev;
        self
    }

    pub fn with_ambient(mut self, ambient: bool) -> Self {
        self.ambient = ambient;
        self
    }

    /// Options for the dependencies of the manifest at `src`.
    ///
    /// Children never include dev or ambient branches.
    fn child(&self, src: &str) -> Self {
        Self {
            cwd: PathBuf::from(dirname(src)),
            dev: false,
            ambient: false,
        }
    }
}

/// Builds dependency trees.
#[derive(Debug, Clone)]
pub struct Resolver {
    fetcher: Fetcher,
    emitter: Emitter,
}

impl Resolver {
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

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Resolve every ecosystem from `options.cwd` and merge the results.
    pub async fn resolve_all(&self, options: &ResolveOptions) -> Result<DependencyTree> {
        tracing::debug!(cwd = %options.cwd.display(), dev = options.dev, ambient = options.ambient, "resolving dependencies");

        let (bower, npm, typings) = futures::try_join!(
            self.resolve_bower_dependencies(options),
            self.resolve_npm_dependencies(options),
            self.resolve_type_dependencies(options),
        )?;

        Ok(merge_trees([bower, npm, typings]))
    }

    /// Resolve a single dependency string relative to `options.cwd`.
    pub async fn resolve_dependency(&self, raw: &str, options: &ResolveOptions) -> Result<DependencyTree> {
        let reference = DependencyReference::parse(raw)?;
        self.resolve_reference(reference, options.clone(), None).await
    }

    fn resolve_reference(
        &self,
        reference: DependencyReference,
        options: ResolveOptions,
        parent: Option<Arc<Lineage>>,
    ) -> BoxFuture<'_, Result<DependencyTree>> {
        async move {
            match reference.scheme {
                Scheme::Npm => {
                    self.resolve_npm_dependency(reference.location, reference.raw, options, parent)
                        .await
                }
                Scheme::Bower => {
                    self.resolve_bower_dependency(reference.location, reference.raw, options, parent)
                        .await
                }
                Scheme::File | Scheme::Github | Scheme::Bitbucket | Scheme::Http => {
                    self.resolve_file_dependency(reference.location, reference.raw, options, parent)
                        .await
                }
            }
        }
        .boxed()
    }

    /// A location that is either a manifest or a bare declaration file.
    fn resolve_file_dependency(
        &self,
        location: String,
        raw: String,
        options: ResolveOptions,
        parent: Option<Arc<Lineage>>,
    ) -> BoxFuture<'_, Result<DependencyTree>> {
        async move {
            let parent_src = parent.as_ref().map(|link| link.src.as_str()).filter(|src| is_http(src));

            let src = if is_http(&location) {
                location
            } else if let Some(parent_src) = parent_src {
                resolve_url(parent_src, &location)
            } else {
                clean(&options.cwd.join(&location))
            };

            if !is_definition(&src) {
                return self.resolve_type_dependency_from(src, Some(raw), options, parent).await;
            }

            if !is_http(&src) && !self.fetcher.is_file(&src).await {
                return Err(FetchError::NotFound { path: PathBuf::from(src) }.into());
            }

            Ok(DependencyTree {
                kind: Some(SourceKind::File),
                src: Some(src.clone()),
                raw: Some(raw),
                typings: Some(src),
                parent,
                ..Default::default()
            })
        }
        .boxed()
    }

    /// Try each candidate of a declared dependency in order.
    async fn resolve_candidates(
        &self,
        name: &str,
        value: &DependencyValue,
        options: &ResolveOptions,
        lineage: &Arc<Lineage>,
        consumer: &str,
    ) -> Result<(String, Arc<DependencyTree>)> {
        let mut last_error = None;

        for raw in value.candidates() {
            let reference = DependencyReference::parse(raw)?;

            match self.resolve_reference(reference, options.clone(), Some(Arc::clone(lineage))).await {
                Ok(tree) => return Ok((name.to_string(), Arc::new(tree))),
                Err(err) if err.is_circular() => return Err(err),
                Err(err) => {
                    tracing::debug!(name, raw = %raw, error = %err, "dependency candidate failed");
                    last_error = Some(err);
                }
            }
        }

        let raw = value.candidates().join(", ");
        let source = last_error.unwrap_or_else(|| {
            LocationError::InvalidLocation {
                raw: raw.clone(),
                reason: "no candidate locations".to_string(),
            }
            .into()
        });

        Err(Error::BranchResolution {
            name: name.to_string(),
            raw,
            consumer: consumer.to_string(),
            source: Box::new(source),
        })
    }
}

/// Fail when `src` already appears among the ancestors.
fn check_circular(parent: Option<&Arc<Lineage>>, src: &str) -> Result<()> {
    let Some(parent) = parent else {
        return Ok(());
    };

    if parent.contains(src) {
        let mut chain = vec![src.to_string()];
        chain.extend(parent.chain());
        return Err(Error::CircularDependency {
            src: src.to_string(),
            chain,
        });
    }

    Ok(())
}

/// Wrap a child failure with the consumer that declared it.
fn branch_error(name: &str, raw: &str, consumer: &str, err: Error) -> Error {
    if err.is_circular() {
        return err;
    }

    Error::BranchResolution {
        name: name.to_string(),
        raw: raw.to_string(),
        consumer: consumer.to_string(),
        source: Box::new(err),
    }
}
