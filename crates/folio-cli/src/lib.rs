//! Folio CLI library.
//!
//! Terminal front end for the portfolio Q&A engine: validate knowledge files,
//! render the FAQ page, ask one-off questions or chat interactively.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod repl;
pub mod runtime;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
