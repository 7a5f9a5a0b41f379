//! Combining partial trees and diffing reference sets.

use std::collections::HashSet;

use crate::tree::{DependencyBranch, DependencyTree};

/// Key-wise union; later branches win on conflicting aliases.
pub fn merge_dependency_branches<'a>(branches: impl IntoIterator<Item = &'a DependencyBranch>) -> DependencyBranch {
    let mut merged = DependencyBranch::new();
    for branch in branches {
        merged.extend(branch.iter().map(|(name, tree)| (name.clone(), tree.clone())));
    }
    merged
}

/// Merge ecosystem roots into one tree.
///
/// Entry fields (`name`, `main`, `browser`, `typings`, `browserTypings`)
/// and their `src` come from the last tree that defines any of them. The
/// four branches are unioned.
pub fn merge_trees(trees: impl IntoIterator<Item = DependencyTree>) -> DependencyTree {
    let trees: Vec<DependencyTree> = trees.into_iter().collect();
    let mut merged = DependencyTree {
        missing: !trees.is_empty() && trees.iter().all(|tree| tree.missing),
        ..Default::default()
    };

    for tree in &trees {
        if tree.has_entry() {
            merged.kind = tree.kind;
            merged.src = tree.src.clone();
            merged.name = tree.name.clone();
            merged.version = tree.version.clone();
            merged.main = tree.main.clone();
            merged.browser = tree.browser.clone();
            merged.typings = tree.typings.clone();
            merged.browser_typings = tree.browser_typings.clone();
        }

        if merged.name.is_none() {
            merged.name = tree.name.clone();
        }
    }

    merged.dependencies = merge_dependency_branches(trees.iter().map(|tree| &tree.dependencies));
    merged.dev_dependencies = merge_dependency_branches(trees.iter().map(|tree| &tree.dev_dependencies));
    merged.ambient_dependencies = merge_dependency_branches(trees.iter().map(|tree| &tree.ambient_dependencies));
    merged.ambient_dev_dependencies =
        merge_dependency_branches(trees.iter().map(|tree| &tree.ambient_dev_dependencies));

    merged
}

/// Entries added and removed between two reference lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl ReferenceDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compare two reference lists, preserving the order of each input.
pub fn diff_reference_sets(before: &[String], after: &[String]) -> ReferenceDiff {
    let before_set: HashSet<&str> = before.iter().map(String::as_str).collect();
    let after_set: HashSet<&str> = after.iter().map(String::as_str).collect();

    let mut seen = HashSet::new();
    let added = after
        .iter()
        .filter(|path| !before_set.contains(path.as_str()) && seen.insert(path.as_str()))
        .cloned()
        .collect();

    let mut seen = HashSet::new();
    let removed = before
        .iter()
        .filter(|path| !after_set.contains(path.as_str()) && seen.insert(path.as_str()))
        .cloned()
        .collect();

    ReferenceDiff { added, removed }
}
