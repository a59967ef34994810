//! Error types for the knowledge store

use std::path::PathBuf;
use thiserror::Error;

/// Errors that make a knowledge base unusable
///
/// Every variant is fatal at startup: answers cite entries by id, so a store
/// with dropped or ambiguous entries can't be trusted.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The knowledge file could not be read
    #[error("Failed to read knowledge file {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file extension doesn't name a supported format
    #[error("Unsupported knowledge file format: {0} (expected .json or .toml)")]
    UnsupportedFormat(String),

    /// The document is not valid JSON/TOML or has the wrong shape
    #[error("Failed to parse knowledge file: {0}")]
    Parse(String),

    /// The document has no version
    #[error("Knowledge file is missing its version")]
    MissingVersion,

    /// A required entry field is absent or blank
    #[error("Entry #{index} is missing required field '{field}'")]
    MissingField {
        /// Position of the entry in the file
        index: usize,
        /// Name of the missing field
        field: &'static str,
    },

    /// Two entries share an id
    #[error("Duplicate entry id: {0}")]
    DuplicateId(String),

    /// A field is present but invalid
    #[error("Entry '{id}' has invalid {field}: {reason}")]
    InvalidField {
        /// Entry id
        id: String,
        /// Field name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// No entries at all
    #[error("Knowledge base contains no entries")]
    Empty,
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Parse(e.to_string())
    }
}

impl From<toml::de::Error> for LoadError {
    fn from(e: toml::de::Error) -> Self {
        LoadError::Parse(e.to_string())
    }
}

/// Errors from read operations on a loaded store
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// No entry with the requested id
    #[error("Entry not found: {0}")]
    NotFound(String),
}
