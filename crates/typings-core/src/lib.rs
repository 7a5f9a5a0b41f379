//! Typings core
//!
//! Dependency references, manifest shapes, the content fetcher and the
//! multi-ecosystem dependency resolver that produces a [`DependencyTree`].
//!
//! ```rust,ignore
//! use typings_core::runtime::http::HttpOptions;
//! use typings_core::{Fetcher, ResolveOptions, Resolver, RetryPolicy};
//!
//! let fetcher = Fetcher::native(&HttpOptions::default(), RetryPolicy::default())?;
//! let tree = Resolver::new(fetcher).resolve_all(&ResolveOptions::new(cwd)).await?;
//! ```

pub mod constants;
pub mod dependencies;
pub mod error;
pub mod events;
pub mod location;
pub mod manifest;
pub mod merge;
pub mod path;
pub mod references;
pub mod runtime;
pub mod tree;

pub use constants::*;
pub use dependencies::{ResolveOptions, Resolver};
pub use error::{Error, FetchError, LocationError, Result};
pub use events::{Emitter, Event};
pub use location::{DependencyReference, Scheme, SchemeMetadata};
pub use manifest::{Browser, BrowserTarget, DependencyValue};
pub use merge::{ReferenceDiff, diff_reference_sets, merge_dependency_branches, merge_trees};
pub use runtime::{Fetcher, HttpClient, NativeRuntime, RetryPolicy, Runtime};
pub use tree::{DependencyBranch, DependencyTree, Lineage, SourceKind};
