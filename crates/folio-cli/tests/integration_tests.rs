//! Integration tests for the CLI commands against the sample portfolio

use folio_cli::cli::{AskArgs, SchemaArgs};
use folio_cli::commands::{execute_ask, execute_check, execute_schema};
use folio_cli::config::{Config, OutputFormat};
use folio_cli::runtime::{knowledge_path, load_engine, resolve_server_config};
use folio_cli::Formatter;
use std::path::PathBuf;

fn repo_file(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").join(relative)
}

fn sample_knowledge() -> String {
    repo_file("data/portfolio.toml").to_string_lossy().into_owned()
}

#[test]
fn test_check_sample_portfolio() {
    let formatter = Formatter::new(OutputFormat::Quiet, false);
    let store = execute_check(&repo_file("data/portfolio.toml"), &formatter).unwrap();

    assert_eq!(store.len(), 7);
    assert_eq!(store.version(), "2024.06");
}

#[test]
fn test_schema_lists_every_entry() {
    let formatter = Formatter::new(OutputFormat::Quiet, false);
    let args = SchemaArgs {
        path: None,
        output: None,
    };

    let page = execute_schema(&args, &repo_file("data/portfolio.toml"), &formatter).unwrap();
    let value: serde_json::Value = serde_json::from_str(&page).unwrap();
    assert_eq!(value["mainEntity"].as_array().unwrap().len(), 7);
}

#[test]
fn test_sample_config_resolves_knowledge() {
    let config_path = repo_file("config/folio.toml").to_string_lossy().into_owned();
    let server_config = resolve_server_config(Some(&config_path), None, &Config::default()).unwrap();

    assert!(knowledge_path(None, &server_config).exists());
}

#[tokio::test]
async fn test_ask_over_sample_portfolio() {
    let knowledge = sample_knowledge();
    let server_config = resolve_server_config(None, Some(&knowledge), &Config::default()).unwrap();
    let engine = load_engine(&server_config).await.unwrap();

    let formatter = Formatter::new(OutputFormat::Json, false);
    let args = AskArgs {
        question: vec!["What".into(), "AI".into(), "projects".into(), "have".into(), "you".into(), "built?".into()],
        session: Some("cli-test".into()),
    };

    let reply = execute_ask(args, &engine, &formatter).await.unwrap();
    assert!(!reply.answer.refused);
    assert!(reply.answer.cited_entry_ids.iter().any(|id| id.as_str() == "p-chat"));
}

#[tokio::test]
async fn test_missing_knowledge_file_fails_startup() {
    let server_config =
        resolve_server_config(None, Some("/nonexistent/portfolio.toml"), &Config::default()).unwrap();
    assert!(load_engine(&server_config).await.is_err());
}
