//! Command implementations.
//!
//! - [`bundle`] - resolve and compile into `main.d.ts` / `browser.d.ts`
//! - [`list`] - print the resolved tree
//! - [`parse`] - print a parsed dependency location
//!
//! Each command exposes an `execute` function taking its parsed arguments.

pub mod bundle;
pub mod list;
pub mod parse;
pub(crate) mod utils;

pub use bundle::execute as bundle_execute;
pub use list::execute as list_execute;
pub use parse::execute as parse_execute;
