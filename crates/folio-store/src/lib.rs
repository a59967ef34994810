//! Folio Knowledge Store
//!
//! Loads the portfolio's static, versioned fact base and serves it read-only.
//!
//! # Architecture
//!
//! - Knowledge files are JSON or TOML, picked by extension
//! - Every entry is validated at load time; any defect is a [`LoadError`]
//! - Entries are held behind `Arc` so retrieved contexts can share them freely
//! - [`schema`] renders the store as schema.org Q&A markup
//! - [`embedding`] provides an offline embedding backend and vector helpers
//!
//! # Examples
//!
//! ```
//! use folio_store::KnowledgeStore;
//!
//! let store = KnowledgeStore::from_json_str(r#"{
//!     "version": "2024.1",
//!     "entries": [
//!         {"id": "s1", "category": "skill", "title": "Rust", "body": "Five years of Rust"},
//!         {"id": "p1", "category": "project", "title": "Chat App", "body": "Streaming chat"}
//!     ]
//! }"#).unwrap();
//!
//! // Ordered by category, then id
//! assert_eq!(store.load()[0].id.as_str(), "p1");
//! assert!(store.get_by_id("s1").is_ok());
//! assert!(store.get_by_id("nope").is_err());
//! ```

#![warn(missing_docs)]

mod error;
mod record;

pub mod embedding;
pub mod schema;

pub use error::{LoadError, StoreError};
pub use record::Owner;

use folio_domain::{Category, EntryId, PortfolioEntry};
use record::KnowledgeFile;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Read-only, validated collection of portfolio entries
///
/// There are no mutation operations; a new knowledge version means a new store.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    version: String,
    owner: Option<Owner>,
    entries: Vec<Arc<PortfolioEntry>>,
    index: HashMap<EntryId, usize>,
}

impl KnowledgeStore {
    /// Build a store from already constructed entries
    ///
    /// Rejects empty ids, duplicate ids and an empty entry list. Entries are
    /// sorted by category, then id.
    pub fn from_entries(
        version: impl Into<String>,
        owner: Option<Owner>,
        mut entries: Vec<PortfolioEntry>,
    ) -> Result<Self, LoadError> {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(LoadError::MissingVersion);
        }
        if entries.is_empty() {
            return Err(LoadError::Empty);
        }

        // Validate in input order so errors name the entry's position in the file
        let mut seen = HashSet::with_capacity(entries.len());
        for (pos, entry) in entries.iter().enumerate() {
            if entry.id.as_str().trim().is_empty() {
                return Err(LoadError::MissingField { index: pos, field: "id" });
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(LoadError::DuplicateId(entry.id.to_string()));
            }
        }

        entries.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.id.cmp(&b.id)));

        let index: HashMap<EntryId, usize> = entries
            .iter()
            .enumerate()
            .map(|(pos, entry)| (entry.id.clone(), pos))
            .collect();

        let entries: Vec<_> = entries.into_iter().map(Arc::new).collect();

        info!(
            "Loaded knowledge base version {} with {} entries",
            version,
            entries.len()
        );

        Ok(Self {
            version,
            owner,
            entries,
            index,
        })
    }

    /// Parse a JSON knowledge document
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let file: KnowledgeFile = serde_json::from_str(json)?;
        Self::from_file_model(file)
    }

    /// Parse a TOML knowledge document
    pub fn from_toml_str(toml_str: &str) -> Result<Self, LoadError> {
        let file: KnowledgeFile = toml::from_str(toml_str)?;
        Self::from_file_model(file)
    }

    /// Load a knowledge file, choosing the format from its extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if extension != "json" && extension != "toml" {
            return Err(LoadError::UnsupportedFormat(path.display().to_string()));
        }

        debug!("Reading knowledge file {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if extension == "json" {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        }
    }

    fn from_file_model(file: KnowledgeFile) -> Result<Self, LoadError> {
        let version = file.version.ok_or(LoadError::MissingVersion)?;
        let entries = file
            .entries
            .into_iter()
            .enumerate()
            .map(|(index, record)| record.into_entry(index))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_entries(version, file.owner, entries)
    }

    /// All entries ordered by category, then id
    ///
    /// Calling this repeatedly always yields the same sequence.
    pub fn load(&self) -> &[Arc<PortfolioEntry>] {
        &self.entries
    }

    /// Look up an entry by id
    pub fn get_by_id(&self, id: &str) -> Result<Arc<PortfolioEntry>, StoreError> {
        self.index
            .get(&EntryId::from(id))
            .map(|&pos| Arc::clone(&self.entries[pos]))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Entries of one category, in id order
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Arc<PortfolioEntry>> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// Knowledge base version string
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Portfolio owner, if the file names one
    pub fn owner(&self) -> Option<&Owner> {
        self.owner.as_ref()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a successfully loaded store
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
