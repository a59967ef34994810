//! CLI command definitions and argument parsing.

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};

/// Folio CLI - Ask questions about a portfolio from the terminal.
#[derive(Debug, Parser)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Server configuration file path
    #[arg(short, long, global = true, env = "FOLIO_CONFIG")]
    pub config: Option<String>,

    /// Knowledge file, overriding the one named in the configuration
    #[arg(short, long, global = true, env = "FOLIO_KNOWLEDGE")]
    pub knowledge: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (bare values only)
    Quiet,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a knowledge file and list its entries
    Check(CheckArgs),

    /// Print the schema.org FAQ page for a knowledge file
    Schema(SchemaArgs),

    /// Ask a single question
    Ask(AskArgs),

    /// Start an interactive chat (default)
    Chat,
}

/// Arguments for the check command.
#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Knowledge file (.json or .toml)
    pub path: Option<String>,
}

/// Arguments for the schema command.
#[derive(Debug, Parser)]
pub struct SchemaArgs {
    /// Knowledge file (.json or .toml)
    pub path: Option<String>,

    /// Write the page to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the ask command.
#[derive(Debug, Parser)]
pub struct AskArgs {
    /// The question
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// Session to continue
    #[arg(short, long)]
    pub session: Option<String>,
}
