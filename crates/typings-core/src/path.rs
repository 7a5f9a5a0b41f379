//! Location helpers shared by the resolver and the compiler.
//!
//! A location is either a local file system path or an HTTP(S) URL. Every
//! helper here accepts both and always produces forward-slash separated
//! strings so compiled module names are stable across platforms.

use path_clean::PathClean;
use std::path::Path;
use url::Url;

const DEFINITION_SUFFIX: &str = ".d.ts";

/// Whether the location is an `http://` or `https://` URL.
pub fn is_http(location: &str) -> bool {
    let lower = location.get(..8).unwrap_or(location).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Whether the path names a declaration file.
pub fn is_definition(path: &str) -> bool {
    path.ends_with(DEFINITION_SUFFIX)
}

/// Bare module specifiers are neither URLs, absolute paths nor dot-relative.
pub fn is_module_name(value: &str) -> bool {
    !is_http(value) && !Path::new(value).is_absolute() && !value.starts_with('/') && !value.starts_with('.')
}

pub fn normalize_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// A file system path as a forward-slash location string.
pub fn path_to_string(path: &Path) -> String {
    normalize_slashes(&path.to_string_lossy())
}

/// Directory part of a location (`a/b/c.d.ts` -> `a/b`).
pub fn dirname(location: &str) -> String {
    match Path::new(location).parent() {
        Some(parent) => path_to_string(parent),
        None => String::new(),
    }
}

/// Resolve `to` relative to the directory containing `from`.
pub fn resolve_from(from: &str, to: &str) -> String {
    if is_http(to) {
        return to.to_string();
    }

    if is_http(from) {
        return resolve_url(from, to);
    }

    let base = Path::new(from).parent().unwrap_or_else(|| Path::new(""));
    clean(&base.join(to))
}

/// Join a relative reference onto a base URL.
pub fn resolve_url(base: &str, to: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(to))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| to.to_string())
}

/// Express `to` relative to the directory containing `from`.
pub fn relative_to(from: &str, to: &str) -> String {
    if is_http(to) {
        if is_http(from) {
            return relative_url(from, to).unwrap_or_else(|| to.to_string());
        }
        return to.to_string();
    }

    if is_http(from) {
        return normalize_slashes(to);
    }

    let base = Path::new(from).parent().unwrap_or_else(|| Path::new(""));
    pathdiff::diff_paths(to, base)
        .map(|relative| path_to_string(&relative))
        .unwrap_or_else(|| normalize_slashes(to))
}

/// Express `to` relative to the directory `dir`. URLs are returned unchanged.
pub fn relative_to_dir(dir: &Path, to: &str) -> String {
    if is_http(to) {
        return to.to_string();
    }

    pathdiff::diff_paths(to, dir)
        .map(|relative| path_to_string(&relative))
        .unwrap_or_else(|| normalize_slashes(to))
}

fn relative_url(from: &str, to: &str) -> Option<String> {
    let from = Url::parse(from).ok()?;
    let to = Url::parse(to).ok()?;

    if from.scheme() != to.scheme() || from.host_str() != to.host_str() || from.port() != to.port() {
        return None;
    }

    let base = Path::new(from.path()).parent()?;
    pathdiff::diff_paths(to.path(), base).map(|relative| path_to_string(&relative))
}

/// Lexically normalize a path (`a/./b/../c` -> `a/c`).
pub fn clean(path: &Path) -> String {
    path_to_string(&path.to_path_buf().clean())
}

/// Join a relative path onto a module name (`root` + `lib/x` -> `root/lib/x`).
pub fn join_module_path(name: &str, relative: &str) -> String {
    clean(&Path::new(name).join(relative))
}

/// Replace the extension of a path with `.d.ts` (`index.js` -> `index.d.ts`).
pub fn normalize_to_definition(path: &str) -> String {
    if is_definition(path) {
        return path.to_string();
    }

    let name_start = path.rfind('/').map_or(0, |index| index + 1);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => format!("{}{}", &path[..name_start + dot], DEFINITION_SUFFIX),
        _ => format!("{path}{DEFINITION_SUFFIX}"),
    }
}

/// Strip the `.d.ts` suffix.
pub fn from_definition(path: &str) -> &str {
    path.strip_suffix(DEFINITION_SUFFIX).unwrap_or(path)
}

/// File name of a declaration location without its suffix.
pub fn infer_definition_name(location: &str) -> String {
    let path = if is_http(location) {
        Url::parse(location).map(|url| url.path().to_string()).unwrap_or_else(|_| location.to_string())
    } else {
        normalize_slashes(location)
    };

    let base = path.rsplit('/').next().unwrap_or(path.as_str());
    from_definition(base).to_string()
}

/// Split a bare module specifier into its package name and optional sub path.
///
/// Scoped names (`@scope/pkg`) consume two segments.
pub fn split_module_name(specifier: &str) -> (&str, Option<&str>) {
    let segments = if specifier.starts_with('@') { 2 } else { 1 };

    let mut end = 0;
    for _ in 0..segments {
        match specifier[end..].find('/') {
            Some(index) => end += index + 1,
            None => return (specifier, None),
        }
    }

    let name = &specifier[..end - 1];
    let rest = &specifier[end..];
    (name, if rest.is_empty() { None } else { Some(rest) })
}
