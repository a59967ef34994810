//! Folio Server CLI
//!
//! Starts the Q&A HTTP server.

use folio_server::{config::ServerConfig, init_tracing, start_server, ServerError};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Warning: No config file specified, using default test configuration");
        eprintln!("Usage: folio-server --config <path-to-config.toml>");
        eprintln!();
        ServerConfig::default_test_config()
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Folio Server - Portfolio Q&A over HTTP");
    println!();
    println!("USAGE:");
    println!("    folio-server --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("EXAMPLE:");
    println!("    folio-server --config config/folio.toml");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file should contain:");
    println!("    - bind_address: IP address to bind (e.g., '127.0.0.1')");
    println!("    - bind_port: Port number (e.g., 8080)");
    println!("    - knowledge_path: Knowledge file, .json or .toml");
    println!("    - [backend]: kind = 'ollama' | 'http' | 'echo', endpoint, model");
    println!("    - [embedding]: optional, kind = 'ollama' | 'hashed'");
    println!("    - [engine]: retrieval, composer and session policy");
    println!();
    println!("ENDPOINTS:");
    println!("    POST /ask          {{\"session_id\": \"...\", \"message\": \"...\"}}");
    println!("    GET  /health       Knowledge version and live sessions");
    println!("    GET  /schema/qa    FAQPage JSON-LD");
    println!();
}
