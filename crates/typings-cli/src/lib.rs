//! Typings CLI.
//!
//! The `typings` binary resolves a project's declaration dependencies and
//! bundles them into `main.d.ts` and `browser.d.ts`.
//!
//! - [`cli`] - argument definitions
//! - [`commands`] - `bundle`, `list` and `parse`
//! - [`error`] - error types with actionable hints
//! - [`logger`] - `tracing` subscriber setup
//! - [`ui`] - status messages, spinner and tree rendering

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
