use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available typings subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bundle the project's dependencies into declaration files
    ///
    /// Resolves typings.json, package.json and bower.json from the working
    /// directory and writes main.d.ts and browser.d.ts into the output
    /// directory.
    Bundle(BundleArgs),

    /// Print the resolved dependency tree
    List(ListArgs),

    /// Print how a dependency location is parsed, as JSON
    Parse(ParseArgs),
}

/// Arguments for the bundle command
#[derive(Args, Debug, Clone)]
pub struct BundleArgs {
    /// Directory main.d.ts and browser.d.ts are written to
    ///
    /// Created if it doesn't exist. Relative paths are resolved against --cwd.
    #[arg(short, long, value_name = "DIR")]
    pub out: PathBuf,

    /// Module name of the bundled project
    ///
    /// Defaults to the name in the project's manifest.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Compile the project as global (ambient) declarations
    #[arg(short = 'A', long)]
    pub ambient: bool,

    /// Omit the "Compiled using" and "Source" comments
    #[arg(long)]
    pub no_meta: bool,

    /// Fail when an import refers to a module that is not a dependency
    #[arg(long)]
    pub strict: bool,

    /// Reference file to keep pointing at the bundled main.d.ts
    ///
    /// References to files that no longer exist are removed from it.
    #[arg(long, value_name = "FILE")]
    pub index: Option<PathBuf>,

    /// Project directory
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Include development dependencies
    #[arg(short = 'D', long)]
    pub dev: bool,

    /// Include ambient dependencies
    #[arg(short = 'A', long)]
    pub ambient: bool,

    /// Print the tree as JSON
    #[arg(long)]
    pub json: bool,

    /// Project directory
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// Arguments for the parse command
#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// Dependency location, e.g. `npm:foo`, `github:owner/repo#sha` or a URL
    #[arg(value_name = "LOCATION")]
    pub raw: String,
}
