//! Helpers shared by commands.

use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedReceiver;
use typings_config::RcLoader;
use typings_core::{Event, Fetcher};

use crate::error::Result;
use crate::ui;

/// The project directory: `--cwd` resolved against the process directory.
pub fn resolve_cwd(cwd: Option<&Path>) -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    Ok(match cwd {
        Some(cwd) => resolve_path(cwd, &current),
        None => current,
    })
}

pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Load the rc configuration for `cwd` and build a fetcher from it.
pub fn fetcher(cwd: &Path) -> Result<Fetcher> {
    let rc = RcLoader::new(cwd).load()?;
    tracing::debug!(retries = rc.max_retries, delay = rc.retry_delay, "loaded rc configuration");

    Ok(Fetcher::native(&rc.http_options()?, rc.retry_policy())?)
}

/// Print every event received so far as a warning. Returns how many.
pub fn report_events(events: &mut UnboundedReceiver<Event>) -> usize {
    let mut count = 0;
    while let Ok(event) = events.try_recv() {
        ui::warning(&describe(&event));
        count += 1;
    }
    count
}

fn describe(event: &Event) -> String {
    match event {
        Event::NotInstalled { name, raw, consumer } => {
            format!("\"{name}\" ({raw}) is declared by \"{consumer}\" but not installed")
        }
        Event::StrippedReference { path, consumer } => {
            format!("Stripped reference \"{path}\" from \"{consumer}\"")
        }
        Event::MissingDependency { module, consumer } => {
            format!("\"{consumer}\" imports \"{module}\", which is not a dependency")
        }
    }
}
