//! On-disk shape of a knowledge file and its conversion into domain entries

use crate::error::LoadError;
use folio_domain::{Category, PartialDate, PortfolioEntry};
use serde::{Deserialize, Serialize};

/// Who the portfolio belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Display name
    pub name: String,

    /// One-line headline ("Backend engineer")
    #[serde(default)]
    pub headline: Option<String>,

    /// Canonical portfolio URL
    #[serde(default)]
    pub url: Option<String>,
}

/// Top-level document
#[derive(Debug, Deserialize)]
pub(crate) struct KnowledgeFile {
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub owner: Option<Owner>,

    #[serde(default)]
    pub entries: Vec<EntryRecord>,
}

/// One entry as written by hand
///
/// Required fields are optional here so a missing one is reported with the entry
/// index instead of a bare serde message.
#[derive(Debug, Deserialize)]
pub(crate) struct EntryRecord {
    #[serde(default)]
    id: Option<String>,

    #[serde(default)]
    category: Option<String>,

    #[serde(default)]
    title: Option<String>,

    #[serde(default)]
    body: Option<String>,

    #[serde(default)]
    tags: Vec<String>,

    #[serde(default, alias = "startDate", alias = "start_date")]
    start: Option<String>,

    #[serde(default, alias = "endDate", alias = "end_date")]
    end: Option<String>,
}

fn required(value: Option<String>, index: usize, field: &'static str) -> Result<String, LoadError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(LoadError::MissingField { index, field }),
    }
}

fn parse_date(raw: Option<String>, id: &str, field: &'static str) -> Result<Option<PartialDate>, LoadError> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("present") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(|reason| LoadError::InvalidField {
            id: id.to_string(),
            field,
            reason,
        }),
    }
}

impl EntryRecord {
    /// Validate and convert into a domain entry
    pub fn into_entry(self, index: usize) -> Result<PortfolioEntry, LoadError> {
        let id = required(self.id, index, "id")?;
        let category_raw = required(self.category, index, "category")?;
        let title = required(self.title, index, "title")?;
        let body = required(self.body, index, "body")?;

        let category: Category = category_raw.parse().map_err(|reason| LoadError::InvalidField {
            id: id.clone(),
            field: "category",
            reason,
        })?;

        let start = parse_date(self.start, &id, "start")?;
        let end = parse_date(self.end, &id, "end")?;

        if let (Some(s), Some(e)) = (start, end) {
            if e < s {
                return Err(LoadError::InvalidField {
                    id,
                    field: "end",
                    reason: format!("end {} is before start {}", e, s),
                });
            }
        }

        Ok(PortfolioEntry::new(id, category, title, body)
            .with_tags(self.tags)
            .with_dates(start, end))
    }
}
