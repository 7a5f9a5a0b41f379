//! Source splicing.
//!
//! Text between edits is copied byte for byte. A whitespace-only leading
//! chunk is dropped and trailing whitespace is trimmed.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Edit {
    pub range: Range<usize>,
    pub replacement: String,
}

impl Edit {
    pub fn new(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn remove(range: Range<usize>) -> Self {
        Self::new(range, String::new())
    }
}

/// Apply `edits` to `source`. Overlapping edits after the first are ignored.
pub(crate) fn splice(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|edit| edit.range.start);

    let mut output = String::with_capacity(source.len());
    let mut position = 0;

    for edit in edits {
        if edit.range.start < position || edit.range.end > source.len() {
            tracing::trace!(?edit.range, "skipping overlapping edit");
            continue;
        }

        let chunk = &source[position..edit.range.start];
        if position > 0 || !chunk.trim().is_empty() {
            output.push_str(chunk);
        }

        output.push_str(&edit.replacement);
        position = edit.range.end;
    }

    let rest = &source[position..];
    if position > 0 || !rest.trim().is_empty() {
        output.push_str(rest);
    }

    output.truncate(output.trim_end().len());
    output
}
