//! Typings CLI entry point.
//!
//! Parses arguments, initializes logging and dispatches to a command.

use clap::Parser;
use miette::Result;
use typings_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Bundle(bundle_args) => commands::bundle_execute(bundle_args).await,
        cli::Command::List(list_args) => commands::list_execute(list_args).await,
        cli::Command::Parse(parse_args) => commands::parse_execute(parse_args),
    };

    result.map_err(error::cli_error_to_miette)
}
