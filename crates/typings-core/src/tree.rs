//! The resolved dependency tree.
//!
//! Nodes are built bottom-up by the resolver and never mutated afterwards.
//! Children are shared through [`Arc`] so merged roots can reuse ecosystem
//! subtrees without copying them.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::manifest::Browser;

/// Declared alias to resolved child.
pub type DependencyBranch = BTreeMap<String, Arc<DependencyTree>>;

/// Ecosystem a node was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Npm,
    Bower,
    Typings,
    /// A bare declaration file.
    File,
}

/// One resolved package.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyTree {
    pub kind: Option<SourceKind>,
    /// Manifest location; unique identity for cycle checks.
    pub src: Option<String>,
    /// Dependency string that produced this node. Absent for the root.
    pub raw: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub main: Option<String>,
    pub browser: Option<Browser>,
    pub typings: Option<String>,
    pub browser_typings: Option<Browser>,
    /// The manifest could not be found.
    pub missing: bool,
    pub dependencies: DependencyBranch,
    pub dev_dependencies: DependencyBranch,
    pub ambient_dependencies: DependencyBranch,
    pub ambient_dev_dependencies: DependencyBranch,
    /// Ancestry used for cycle detection and diagnostics only.
    #[serde(skip)]
    pub parent: Option<Arc<Lineage>>,
}

impl DependencyTree {
    /// An empty node for a manifest that does not exist.
    pub fn missing(kind: SourceKind, src: Option<String>, raw: Option<String>, parent: Option<Arc<Lineage>>) -> Self {
        Self {
            kind: Some(kind),
            src,
            raw,
            missing: true,
            parent,
            ..Default::default()
        }
    }

    /// Whether the declaration entry comes from `typings`/`browserTypings`.
    pub fn is_typings_mode(&self) -> bool {
        self.typings.is_some()
    }

    /// Whether any entry field is set.
    pub fn has_entry(&self) -> bool {
        self.main.is_some() || self.browser.is_some() || self.typings.is_some() || self.browser_typings.is_some()
    }

    /// The four branches paired with their manifest field names.
    pub fn branches(&self) -> [(&'static str, &DependencyBranch); 4] {
        [
            ("dependencies", &self.dependencies),
            ("devDependencies", &self.dev_dependencies),
            ("ambientDependencies", &self.ambient_dependencies),
            ("ambientDevDependencies", &self.ambient_dev_dependencies),
        ]
    }

    /// Label used when reporting a node: its raw dependency string, else its manifest.
    pub fn label(&self) -> &str {
        self.raw
            .as_deref()
            .or(self.src.as_deref())
            .or(self.name.as_deref())
            .unwrap_or("<root>")
    }
}

/// Non-owning ancestry link.
///
/// Each node records the lineage of its parent. Links are only walked upward
/// and only for cycle checks and messages.
#[derive(Debug)]
pub struct Lineage {
    pub src: String,
    pub raw: Option<String>,
    pub parent: Option<Arc<Lineage>>,
}

impl Lineage {
    pub fn new(src: impl Into<String>, raw: Option<String>, parent: Option<Arc<Lineage>>) -> Arc<Self> {
        Arc::new(Self {
            src: src.into(),
            raw,
            parent,
        })
    }

    /// This link followed by each ancestor, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &Lineage> {
        std::iter::successors(Some(self), |link| link.parent.as_deref())
    }

    /// Whether `src` already appears in the chain.
    pub fn contains(&self, src: &str) -> bool {
        self.ancestors().any(|link| link.src == src)
    }

    /// Manifest locations from this link up to the root.
    pub fn chain(&self) -> Vec<String> {
        self.ancestors().map(|link| link.src.clone()).collect()
    }
}
