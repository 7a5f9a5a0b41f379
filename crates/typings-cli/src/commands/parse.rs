//! Parse command implementation.

use serde::Serialize;
use typings_core::DependencyReference;
use typings_core::location::infer_name;

use crate::cli::ParseArgs;
use crate::error::Result;

/// A parsed location and the name it would be installed under.
#[derive(Debug, Serialize)]
struct ParseOutput {
    name: String,
    #[serde(flatten)]
    reference: DependencyReference,
}

/// Print the parsed location as pretty JSON.
pub fn execute(args: ParseArgs) -> Result<()> {
    let reference = DependencyReference::parse(&args.raw)?;
    let output = ParseOutput {
        name: infer_name(&args.raw),
        reference,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
