//! Triple-slash reference directives.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::path::{relative_to, resolve_from};

static REFERENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^///[ \t]*<reference[ \t]+path[ \t]*=[ \t]*(?:"([^"]*)"|'([^']*)')[^\n]*?/>[ \t]*\r?\n?"#)
        .expect("reference pattern is valid")
});

static LIB_FILE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^///[ \t]*<reference[ \t]+no-default-lib[ \t]*=[ \t]*["']true["']"#)
        .expect("no-default-lib pattern is valid")
});

/// A `/// <reference path="..." />` directive found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub start: usize,
    pub end: usize,
    /// Referenced location resolved against the containing file.
    pub path: String,
}

/// Find every path reference in `contents`, resolving paths against `src`.
pub fn extract_references(contents: &str, src: &str) -> Vec<Reference> {
    REFERENCE_REGEX
        .captures_iter(contents)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let path = captures.get(1).or_else(|| captures.get(2))?.as_str();
            Some(Reference {
                start: whole.start(),
                end: whole.end(),
                path: resolve_from(src, path),
            })
        })
        .collect()
}

/// Remove every path reference directive, including its line break.
pub fn strip_references(contents: &str) -> String {
    REFERENCE_REGEX.replace_all(contents, "").into_owned()
}

/// Raw paths of every reference, in file order.
pub fn parse_references(contents: &str) -> Vec<String> {
    REFERENCE_REGEX
        .captures_iter(contents)
        .filter_map(|captures| captures.get(1).or_else(|| captures.get(2)))
        .map(|path| path.as_str().to_string())
        .collect()
}

/// Whether the file declares `/// <reference no-default-lib="true"/>`.
pub fn is_lib_file(contents: &str) -> bool {
    LIB_FILE_REGEX.is_match(contents)
}

/// Reference directive for `path`, written relative to the file at `from`.
pub fn to_reference(path: &str, from: &str) -> String {
    format!("/// <reference path=\"{}\" />", relative_to(from, path))
}

/// Sorted, de-duplicated reference block ending with a line break.
pub fn stringify_references<'a>(paths: impl IntoIterator<Item = &'a str>, from: &str) -> String {
    let references: BTreeSet<String> = paths.into_iter().map(|path| to_reference(path, from)).collect();

    let mut output = String::new();
    for reference in references {
        output.push_str(&reference);
        output.push('\n');
    }
    output
}
