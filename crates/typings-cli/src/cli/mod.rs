//! Command-line interface definition.
//!
//! - `typings bundle` - compile dependencies into `main.d.ts` and `browser.d.ts`
//! - `typings list` - print the resolved dependency tree
//! - `typings parse` - show how a dependency location is interpreted

mod commands;
mod tests;

use clap::Parser;

pub use commands::{BundleArgs, Command, ListArgs, ParseArgs};

/// Typings - TypeScript declaration dependency manager
#[derive(Parser, Debug)]
#[command(
    name = "typings",
    version,
    about = "Bundle TypeScript declaration dependencies",
    long_about = "Typings resolves the declaration dependencies of a project across typings.json,\n\
                  package.json and bower.json, and compiles them into a single declaration file\n\
                  with every module namespaced by its position in the dependency tree."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}
