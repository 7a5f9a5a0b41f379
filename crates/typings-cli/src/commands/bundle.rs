//! Bundle command implementation.
//!
//! Resolves the project without dev or ambient branches, compiles the tree
//! and writes `main.d.ts` and `browser.d.ts` into the output directory.
//! With `--index`, an aggregate reference file is kept pointing at the new
//! `main.d.ts`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use typings_compile::{CompileOptions, CompiledOutput, Compiler, MissingDependencyPolicy};
use typings_core::path::{path_to_string, resolve_from};
use typings_core::references::{parse_references, stringify_references};
use typings_core::{DTS_BROWSER_FILE, DTS_MAIN_FILE, Emitter, ReferenceDiff, ResolveOptions, Resolver, diff_reference_sets};

use crate::cli::BundleArgs;
use crate::commands::utils;
use crate::error::{CliError, Result};
use crate::ui;

/// Files written by a successful bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOutput {
    pub name: String,
    pub main: PathBuf,
    pub browser: PathBuf,
    /// Reference file changes, when `--index` was given.
    pub index: Option<(PathBuf, ReferenceDiff)>,
}

/// Execute the bundle command.
///
/// # Errors
///
/// Fails when the rc configuration is invalid, resolution or compilation
/// fails, no name can be inferred, or the output cannot be written.
/// Stripped references and missing modules are printed as warnings only.
pub async fn execute(args: BundleArgs) -> Result<()> {
    let start = Instant::now();
    let cwd = utils::resolve_cwd(args.cwd.as_deref())?;
    let out = utils::resolve_path(&args.out, &cwd);

    let spinner = ui::Spinner::new("Resolving dependencies...", ui::is_interactive());
    let (emitter, mut events) = Emitter::channel();

    let result = bundle(&args, &cwd, &out, emitter, &spinner).await;
    match &result {
        Ok(_) => spinner.clear(),
        Err(_) => spinner.fail("Bundle failed"),
    }

    utils::report_events(&mut events);
    let output = result?;

    ui::success(&format!(
        "Bundled \"{}\" into {} and {} in {:.2?}",
        output.name,
        output.main.display(),
        output.browser.display(),
        start.elapsed()
    ));

    if let Some((index, diff)) = &output.index {
        for path in &diff.removed {
            ui::warning(&format!("Removed missing reference \"{path}\" from {}", index.display()));
        }
        if !diff.added.is_empty() {
            ui::success(&format!("Referenced {} from {}", output.main.display(), index.display()));
        }
    }

    Ok(())
}

/// Resolve, compile and write. The emitter is dropped before returning.
pub async fn bundle(
    args: &BundleArgs,
    cwd: &Path,
    out: &Path,
    emitter: Emitter,
    spinner: &ui::Spinner,
) -> Result<BundleOutput> {
    let fetcher = utils::fetcher(cwd)?;

    let tree = Resolver::new(fetcher.clone())
        .with_emitter(emitter.clone())
        .resolve_all(&ResolveOptions::new(cwd))
        .await?;

    let name = args
        .name
        .clone()
        .or_else(|| tree.name.clone())
        .ok_or(CliError::NameRequired)?;

    spinner.set_message(&format!("Compiling {name}..."));
    tracing::debug!(%name, ambient = args.ambient, "compiling");

    let missing = if args.strict {
        MissingDependencyPolicy::Fail
    } else {
        MissingDependencyPolicy::Track
    };
    let options = CompileOptions::new(cwd, name.clone())
        .with_ambient(args.ambient)
        .with_meta(!args.no_meta)
        .with_missing_policy(missing);

    let output = Compiler::new(fetcher)
        .with_emitter(emitter)
        .compile(Arc::new(tree), &options)
        .await?;

    let mut written = write_output(out, &name, &output).await?;

    if let Some(index) = &args.index {
        let index = utils::resolve_path(index, cwd);
        let diff = update_index(&index, &written.main).await?;
        written.index = Some((index, diff));
    }

    Ok(written)
}

async fn write_output(out: &Path, name: &str, output: &CompiledOutput) -> Result<BundleOutput> {
    tokio::fs::create_dir_all(out)
        .await
        .map_err(|source| CliError::WriteOutput {
            path: out.to_path_buf(),
            source,
        })?;

    let main = out.join(DTS_MAIN_FILE);
    let browser = out.join(DTS_BROWSER_FILE);

    for (path, text) in [(&main, &output.main), (&browser, &output.browser)] {
        tokio::fs::write(path, text)
            .await
            .map_err(|source| CliError::WriteOutput {
                path: path.clone(),
                source,
            })?;
    }

    Ok(BundleOutput {
        name: name.to_string(),
        main,
        browser,
        index: None,
    })
}

/// Make the reference file at `index` include `main`, dropping references
/// to files that no longer exist. The file is only written when it changes.
async fn update_index(index: &Path, main: &Path) -> Result<ReferenceDiff> {
    let index_path = path_to_string(index);
    let contents = match tokio::fs::read_to_string(index).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(CliError::ReadIndex {
                path: index.to_path_buf(),
                source,
            });
        }
    };

    let before: Vec<String> = parse_references(&contents)
        .iter()
        .map(|reference| resolve_from(&index_path, reference))
        .collect();

    let mut after = Vec::with_capacity(before.len() + 1);
    for path in &before {
        let exists = tokio::fs::metadata(path).await.is_ok_and(|meta| meta.is_file());
        if exists && !after.contains(path) {
            after.push(path.clone());
        }
    }

    let main = path_to_string(main);
    if !after.contains(&main) {
        after.push(main);
    }

    let diff = diff_reference_sets(&before, &after);
    if diff.is_empty() {
        return Ok(diff);
    }

    tracing::debug!(index = %index_path, added = diff.added.len(), removed = diff.removed.len(), "updating reference file");
    let write_error = |source| CliError::WriteOutput {
        path: index.to_path_buf(),
        source,
    };
    if let Some(parent) = index.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
    }
    tokio::fs::write(index, stringify_references(after.iter().map(String::as_str), &index_path))
        .await
        .map_err(write_error)?;

    Ok(diff)
}
