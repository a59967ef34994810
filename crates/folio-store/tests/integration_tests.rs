//! Integration tests for folio-store
//!
//! Load real knowledge files from disk in both supported formats.

use folio_domain::Category;
use folio_store::{schema, KnowledgeStore, LoadError};
use std::io::Write;
use tempfile::Builder;

const JSON_KB: &str = r#"{
    "version": "2024.06",
    "owner": {"name": "Ada Example", "url": "https://ada.example"},
    "entries": [
        {"id": "s-rust", "category": "skill", "title": "Rust", "body": "Async services and CLIs", "tags": ["systems"]},
        {"id": "p1", "category": "project", "title": "Chat App", "body": "Built with streaming inference", "tags": ["ai", "web"]},
        {"id": "e-acme", "category": "experience", "title": "Engineer at Acme", "body": "Payments platform", "startDate": "2019-03", "endDate": "2022-08"},
        {"id": "d-bsc", "category": "education", "title": "BSc Computer Science", "body": "University of Somewhere", "start": "2014", "end": "2018"}
    ]
}"#;

const TOML_KB: &str = r#"
version = "2024.06"

[owner]
name = "Ada Example"

[[entries]]
id = "p1"
category = "project"
title = "Chat App"
body = "Built with streaming inference"
tags = ["ai", "web"]

[[entries]]
id = "s-go"
category = "skill"
title = "Go"
body = "Microservices"
"#;

fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_json_file() {
    let file = write_temp(".json", JSON_KB);
    let store = KnowledgeStore::from_path(file.path()).unwrap();

    assert_eq!(store.len(), 4);
    assert_eq!(store.version(), "2024.06");
    assert_eq!(store.owner().unwrap().name, "Ada Example");

    let order: Vec<_> = store.load().iter().map(|e| e.category).collect();
    assert_eq!(
        order,
        vec![Category::Project, Category::Experience, Category::Education, Category::Skill]
    );

    let acme = store.get_by_id("e-acme").unwrap();
    assert_eq!(acme.date_range().unwrap(), "2019-03 – 2022-08");
}

#[test]
fn test_load_toml_file() {
    let file = write_temp(".toml", TOML_KB);
    let store = KnowledgeStore::from_path(file.path()).unwrap();

    assert_eq!(store.len(), 2);
    assert!(store.get_by_id("p1").unwrap().tags.contains("ai"));
}

#[test]
fn test_load_is_idempotent() {
    let file = write_temp(".json", JSON_KB);
    let first = KnowledgeStore::from_path(file.path()).unwrap();
    let second = KnowledgeStore::from_path(file.path()).unwrap();

    let ids = |s: &KnowledgeStore| s.load().iter().map(|e| e.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(ids(&first), ids(&first));
}

#[test]
fn test_unsupported_extension() {
    let file = write_temp(".yaml", "version: 1");
    assert!(matches!(
        KnowledgeStore::from_path(file.path()),
        Err(LoadError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_missing_file() {
    let result = KnowledgeStore::from_path("/definitely/not/here/kb.json");
    assert!(matches!(result, Err(LoadError::Io { .. })));
}

#[test]
fn test_duplicate_ids_are_fatal() {
    let kb = r#"{"version": "1", "entries": [
        {"id": "p1", "category": "project", "title": "A", "body": "a"},
        {"id": "p1", "category": "skill", "title": "B", "body": "b"}
    ]}"#;
    let file = write_temp(".json", kb);
    assert!(matches!(
        KnowledgeStore::from_path(file.path()),
        Err(LoadError::DuplicateId(_))
    ));
}

#[test]
fn test_missing_body_is_fatal() {
    let kb = r#"{"version": "1", "entries": [
        {"id": "p1", "category": "project", "title": "A", "body": "a"},
        {"id": "p2", "category": "project", "title": "B"}
    ]}"#;
    let err = KnowledgeStore::from_json_str(kb).unwrap_err();
    assert!(matches!(err, LoadError::MissingField { index: 1, field: "body" }));
    assert_eq!(err.to_string(), "Entry #1 is missing required field 'body'");
}

#[test]
fn test_schema_export_covers_every_entry() {
    let store = KnowledgeStore::from_json_str(JSON_KB).unwrap();
    let page = schema::qa_page(&store);
    let ids: Vec<_> = page["mainEntity"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["identifier"].as_str().unwrap().to_string())
        .collect();

    let store_ids: Vec<_> = store.load().iter().map(|e| e.id.to_string()).collect();
    assert_eq!(ids, store_ids);
}
