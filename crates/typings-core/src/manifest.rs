//! Manifest shapes for the three ecosystems.
//!
//! Only the fields the resolver reads are modelled; unknown fields are
//! ignored.

use indexmap::IndexMap;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// A declared dependency: a single location or an ordered fallback list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyValue {
    Single(String),
    Fallbacks(Vec<String>),
}

impl DependencyValue {
    /// Candidate locations, in the order they should be tried.
    pub fn candidates(&self) -> &[String] {
        match self {
            DependencyValue::Single(raw) => std::slice::from_ref(raw),
            DependencyValue::Fallbacks(raws) => raws,
        }
    }
}

/// Replacement for a single file or module in a `browser` map.
///
/// `false` disables the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BrowserTarget {
    Path(String),
    Disabled(bool),
}

/// The `browser` / `browserTypings` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Browser {
    /// Replaces the whole entry file.
    Path(String),
    /// Replaces individual import targets.
    Overrides(IndexMap<String, BrowserTarget>),
}

impl Browser {
    pub fn as_path(&self) -> Option<&str> {
        match self {
            Browser::Path(path) => Some(path),
            Browser::Overrides(_) => None,
        }
    }
}

pub type DependencyMap = IndexMap<String, DependencyValue>;

/// `typings.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigJson {
    pub name: Option<String>,
    pub version: Option<String>,
    pub main: Option<String>,
    pub browser: Option<Browser>,
    pub typings: Option<String>,
    pub browser_typings: Option<Browser>,
    pub homepage: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub dependencies: DependencyMap,
    #[serde(default)]
    pub dev_dependencies: DependencyMap,
    #[serde(default)]
    pub ambient_dependencies: DependencyMap,
    #[serde(default)]
    pub ambient_dev_dependencies: DependencyMap,
}

/// `package.json`. Only dependency names are used, versions are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    pub name: Option<String>,
    pub version: Option<String>,
    pub main: Option<String>,
    pub browser: Option<Browser>,
    #[serde(alias = "types")]
    pub typings: Option<String>,
    pub browser_typings: Option<Browser>,
    #[serde(default)]
    pub dependencies: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub optional_dependencies: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub dev_dependencies: IndexMap<String, serde_json::Value>,
}

/// `bower.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowerJson {
    pub name: Option<String>,
    pub version: Option<String>,
    /// Bower allows a string or a list of files.
    pub main: Option<serde_json::Value>,
    pub browser: Option<Browser>,
    pub typings: Option<String>,
    pub browser_typings: Option<Browser>,
    #[serde(default)]
    pub dependencies: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub dev_dependencies: IndexMap<String, serde_json::Value>,
}

impl BowerJson {
    /// `main` when it is a single file.
    pub fn main_file(&self) -> Option<String> {
        self.main.as_ref().and_then(|main| main.as_str()).map(str::to_string)
    }
}

/// `.bowerrc`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BowerRc {
    pub directory: Option<String>,
}

/// Walk upward from `from` until `relative` names an existing file.
///
/// `from` is cleaned first, so `..` segments never reach the returned path.
pub async fn find_up(runtime: &dyn Runtime, from: &Path, relative: &str) -> Option<PathBuf> {
    let from = from.to_path_buf().clean();
    let mut current = Some(from.as_path());

    while let Some(dir) = current {
        let candidate = dir.join(relative);
        if runtime.is_file(&candidate).await {
            return Some(candidate);
        }
        current = dir.parent();
    }

    None
}
