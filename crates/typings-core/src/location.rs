//! Dependency strings such as `npm:foo` or `github:org/repo#ref`.
//!
//! A dependency string names where a declaration package lives:
//!
//! ```text
//! file:typings/foo.d.ts
//! github:org/repo/path/typings.json#commitish
//! bitbucket:org/repo#commitish
//! npm:@scope/pkg/sub.d.ts
//! bower:jquery
//! https://example.com/typings.json
//! ```
//!
//! [`DependencyReference::parse`] turns one into a structured reference
//! carrying the resolved fetch location.

use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::constants::{BOWER_MANIFEST, CONFIG_FILE, DEFAULT_COMMITISH, NPM_MANIFEST};
use crate::error::LocationError;
use crate::path::{
    clean, dirname, infer_definition_name, is_definition, is_http, normalize_slashes, resolve_url,
    split_module_name,
};

/// Source ecosystem of a dependency reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    File,
    Npm,
    Bower,
    Github,
    Bitbucket,
    Http,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::File => "file",
            Scheme::Npm => "npm",
            Scheme::Bower => "bower",
            Scheme::Github => "github",
            Scheme::Bitbucket => "bitbucket",
            Scheme::Http => "http",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheme specific parts of a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SchemeMetadata {
    File,
    Git {
        org: String,
        repo: String,
        path: String,
        commitish: String,
    },
    Package {
        name: String,
        #[serde(rename = "subPath")]
        sub_path: String,
    },
    Http,
}

/// A parsed dependency string. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyReference {
    pub raw: String,
    pub scheme: Scheme,
    pub location: String,
    pub meta: SchemeMetadata,
}

impl DependencyReference {
    /// Parse a dependency string.
    pub fn parse(raw: &str) -> Result<Self, LocationError> {
        if is_http(raw) {
            url::Url::parse(raw).map_err(|err| LocationError::InvalidLocation {
                raw: raw.to_string(),
                reason: err.to_string(),
            })?;

            return Ok(Self {
                raw: raw.to_string(),
                scheme: Scheme::Http,
                location: raw.to_string(),
                meta: SchemeMetadata::Http,
            });
        }

        let Some((scheme, rest)) = raw.split_once(':') else {
            return Err(LocationError::UnknownScheme { raw: raw.to_string() });
        };

        match scheme {
            "file" => parse_file(raw, rest),
            "github" => parse_git(raw, rest, Scheme::Github),
            "bitbucket" => parse_git(raw, rest, Scheme::Bitbucket),
            "npm" => parse_package(raw, rest, Scheme::Npm, NPM_MANIFEST),
            "bower" => parse_package(raw, rest, Scheme::Bower, BOWER_MANIFEST),
            _ => Err(LocationError::UnknownScheme { raw: raw.to_string() }),
        }
    }

    /// Package name for `npm:` and `bower:` references.
    pub fn package_name(&self) -> Option<&str> {
        match &self.meta {
            SchemeMetadata::Package { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for DependencyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_file(raw: &str, rest: &str) -> Result<DependencyReference, LocationError> {
    let location = clean(Path::new(rest));
    let basename = location.rsplit('/').next().unwrap_or(location.as_str());

    if basename != CONFIG_FILE && !is_definition(basename) {
        return Err(LocationError::InvalidFileTarget { raw: raw.to_string() });
    }

    Ok(DependencyReference {
        raw: raw.to_string(),
        scheme: Scheme::File,
        location,
        meta: SchemeMetadata::File,
    })
}

fn parse_git(raw: &str, rest: &str, scheme: Scheme) -> Result<DependencyReference, LocationError> {
    let (body, commitish) = match rest.split_once('#') {
        Some((body, commitish)) if !commitish.is_empty() => (body, commitish),
        Some((body, _)) => (body, DEFAULT_COMMITISH),
        None => (rest, DEFAULT_COMMITISH),
    };

    let mut segments = body.split('/');
    let org = segments.next().filter(|segment| !segment.is_empty());
    let repo = segments.next().filter(|segment| !segment.is_empty());
    let (Some(org), Some(repo)) = (org, repo) else {
        return Err(LocationError::InvalidLocation {
            raw: raw.to_string(),
            reason: "expected \"<org>/<repo>\"".to_string(),
        });
    };

    let sub_path = segments.collect::<Vec<_>>().join("/");
    let path = if sub_path.is_empty() {
        CONFIG_FILE.to_string()
    } else if !is_definition(&sub_path) && !sub_path.ends_with(CONFIG_FILE) {
        format!("{}/{}", sub_path.trim_end_matches('/'), CONFIG_FILE)
    } else {
        sub_path
    };

    let location = match scheme {
        Scheme::Bitbucket => format!("https://bitbucket.org/{org}/{repo}/raw/{commitish}/{path}"),
        _ => format!("https://raw.githubusercontent.com/{org}/{repo}/{commitish}/{path}"),
    };

    Ok(DependencyReference {
        raw: raw.to_string(),
        scheme,
        location,
        meta: SchemeMetadata::Git {
            org: org.to_string(),
            repo: repo.to_string(),
            path,
            commitish: commitish.to_string(),
        },
    })
}

fn parse_package(
    raw: &str,
    rest: &str,
    scheme: Scheme,
    manifest: &str,
) -> Result<DependencyReference, LocationError> {
    let rest = normalize_slashes(rest);
    let (name, sub_path) = split_module_name(&rest);

    if name.is_empty() || name.ends_with('/') || name == "@" {
        return Err(LocationError::InvalidLocation {
            raw: raw.to_string(),
            reason: "missing package name".to_string(),
        });
    }

    let sub_path = sub_path.unwrap_or(manifest).to_string();
    let location = clean(&Path::new(name).join(&sub_path));

    Ok(DependencyReference {
        raw: raw.to_string(),
        scheme,
        location,
        meta: SchemeMetadata::Package {
            name: name.to_string(),
            sub_path,
        },
    })
}

/// Re-anchor a path relative to the file a dependency string points at, keeping
/// the original scheme (`github:org/repo/a/b.d.ts` + `../c.d.ts` ->
/// `github:org/repo/c.d.ts`).
pub fn resolve_relative(raw: &str, relative: &str) -> Result<String, LocationError> {
    if is_http(relative) {
        return Ok(relative.to_string());
    }

    let reference = DependencyReference::parse(raw)?;
    let rebase = |path: &str| clean(&Path::new(&dirname(path)).join(relative));

    let resolved = match &reference.meta {
        SchemeMetadata::File => format!("file:{}", rebase(&reference.location)),
        SchemeMetadata::Git {
            org,
            repo,
            path,
            commitish,
        } => {
            let mut resolved = format!("{}:{org}/{repo}/{}", reference.scheme, rebase(path));
            if commitish != DEFAULT_COMMITISH {
                resolved.push('#');
                resolved.push_str(commitish);
            }
            resolved
        }
        SchemeMetadata::Package { .. } => {
            format!("{}:{}", reference.scheme, rebase(&reference.location))
        }
        SchemeMetadata::Http => resolve_url(&reference.location, relative),
    };

    Ok(resolved)
}

const NAME_PREFIXES: [&str; 4] = ["typings-", "typed-", "typings.", "typed."];
const NAME_SUFFIXES: [&str; 3] = ["-typings", "-typed", ".d"];

/// Best-effort short name for a dependency string or location.
///
/// Accepts either a full dependency string (`github:org/typed-debug`) or a bare
/// location (`foo/bar.d.ts`, `@scope/pkg/package.json`).
pub fn infer_name(raw: &str) -> String {
    let name = match DependencyReference::parse(raw) {
        Ok(reference) => match reference.meta {
            SchemeMetadata::Git { repo, path, .. } if !is_definition(&path) => repo,
            SchemeMetadata::Package { name, sub_path } if !is_definition(&sub_path) => name,
            _ => name_from_location(&reference.location),
        },
        Err(_) => name_from_location(raw),
    };

    strip_affixes(&name)
}

fn name_from_location(location: &str) -> String {
    if is_definition(location) {
        return infer_definition_name(location);
    }

    let path = if is_http(location) {
        url::Url::parse(location)
            .map(|url| url.path().to_string())
            .unwrap_or_else(|_| location.to_string())
    } else {
        normalize_slashes(location)
    };

    let mut segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();
    if segments
        .last()
        .is_some_and(|last| [CONFIG_FILE, NPM_MANIFEST, BOWER_MANIFEST].contains(last))
    {
        segments.pop();
    }

    match segments.as_slice() {
        [.., scope, name] if scope.starts_with('@') => format!("{scope}/{name}"),
        [.., name] => (*name).to_string(),
        [] => String::new(),
    }
}

fn strip_affixes(name: &str) -> String {
    let (scope, base) = match name.rsplit_once('/') {
        Some((scope, base)) => (Some(scope), base),
        None => (None, name),
    };

    let mut base = base;
    for prefix in NAME_PREFIXES {
        if let Some(stripped) = base.strip_prefix(prefix).filter(|rest| !rest.is_empty()) {
            base = stripped;
            break;
        }
    }
    for suffix in NAME_SUFFIXES {
        if let Some(stripped) = base.strip_suffix(suffix).filter(|rest| !rest.is_empty()) {
            base = stripped;
            break;
        }
    }

    match scope {
        Some(scope) => format!("{scope}/{base}"),
        None => base.to_string(),
    }
}
