//! Folio CLI - Ask questions about a portfolio from the terminal.

use anyhow::Context;
use clap::Parser;
use folio_cli::commands;
use folio_cli::repl;
use folio_cli::runtime::{knowledge_path, load_engine, resolve_server_config};
use folio_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Keep engine logs out of the chat unless asked for
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    let config = Config::load().context("failed to read CLI settings")?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let server_config =
        resolve_server_config(cli.config.as_deref(), cli.knowledge.as_deref(), &config)?;

    match cli.command {
        Some(Command::Check(args)) => {
            let path = knowledge_path(args.path.as_deref(), &server_config);
            commands::execute_check(&path, &formatter)?;
        }
        Some(Command::Schema(args)) => {
            let path = knowledge_path(args.path.as_deref(), &server_config);
            commands::execute_schema(&args, &path, &formatter)?;
        }
        Some(Command::Ask(args)) => {
            let engine = load_engine(&server_config)
                .await
                .context("failed to start the engine")?;
            commands::execute_ask(args, &engine, &formatter).await?;
        }
        None | Some(Command::Chat) => {
            let engine = load_engine(&server_config)
                .await
                .context("failed to start the engine")?;
            repl::run_chat(&engine, &config.settings, &formatter).await?;
        }
    }

    Ok(())
}
