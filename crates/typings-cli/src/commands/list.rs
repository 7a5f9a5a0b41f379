//! List command implementation.

use typings_core::{Emitter, ResolveOptions, Resolver};

use crate::cli::ListArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

/// Resolve the project and print its tree to stdout.
pub async fn execute(args: ListArgs) -> Result<()> {
    let cwd = utils::resolve_cwd(args.cwd.as_deref())?;
    let fetcher = utils::fetcher(&cwd)?;
    let (emitter, mut events) = Emitter::channel();

    let options = ResolveOptions::new(&cwd).with_dev(args.dev).with_ambient(args.ambient);
    let tree = Resolver::new(fetcher).with_emitter(emitter).resolve_all(&options).await;
    utils::report_events(&mut events);
    let tree = tree?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    let root = tree
        .name
        .clone()
        .or_else(|| cwd.file_name().map(|name| name.to_string_lossy().into_owned()))
        .unwrap_or_else(|| cwd.display().to_string());

    print!("{}", ui::render_tree(&root, &tree));
    Ok(())
}
