//! schema.org Q&A markup for search-engine indexing
//!
//! Each entry becomes one `Question` with an accepted `Answer` inside a
//! `FAQPage`. The engine never produces this itself; the page layer embeds the
//! output as JSON-LD.

use crate::KnowledgeStore;
use folio_domain::{Category, PortfolioEntry};
use serde_json::{json, Value};

const DEFAULT_OWNER: &str = "the portfolio owner";

/// Question phrasing for one entry
pub fn question_for(entry: &PortfolioEntry, owner: &str) -> String {
    match entry.category {
        Category::Project => format!("What is the {} project?", entry.title),
        Category::Experience => format!("What did {} do as {}?", owner, entry.title),
        Category::Education => format!("What did {} study in {}?", owner, entry.title),
        Category::Skill => format!("What experience does {} have with {}?", owner, entry.title),
    }
}

/// Answer text for one entry: the body plus the date range when known
pub fn answer_for(entry: &PortfolioEntry) -> String {
    match entry.date_range() {
        Some(range) => format!("{} ({})", entry.body, range),
        None => entry.body.clone(),
    }
}

/// Render the whole store as a `FAQPage` JSON-LD document
///
/// # Examples
///
/// ```
/// use folio_domain::{Category, PortfolioEntry};
/// use folio_store::{schema, KnowledgeStore};
///
/// let store = KnowledgeStore::from_entries(
///     "1",
///     None,
///     vec![PortfolioEntry::new("p1", Category::Project, "Chat App", "Streaming chat")],
/// ).unwrap();
///
/// let page = schema::qa_page(&store);
/// assert_eq!(page["@type"], "FAQPage");
/// assert_eq!(page["mainEntity"][0]["name"], "What is the Chat App project?");
/// ```
pub fn qa_page(store: &KnowledgeStore) -> Value {
    let owner = store
        .owner()
        .map(|o| o.name.as_str())
        .unwrap_or(DEFAULT_OWNER);

    let questions: Vec<Value> = store
        .load()
        .iter()
        .map(|entry| {
            json!({
                "@type": "Question",
                "identifier": entry.id.as_str(),
                "name": question_for(entry, owner),
                "keywords": entry.tags.iter().cloned().collect::<Vec<_>>().join(", "),
                "acceptedAnswer": {
                    "@type": "Answer",
                    "text": answer_for(entry),
                },
            })
        })
        .collect();

    let mut page = json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "name": format!("Questions about {}", owner),
        "version": store.version(),
        "mainEntity": questions,
    });

    if let Some(url) = store.owner().and_then(|o| o.url.as_deref()) {
        page["url"] = Value::String(url.to_string());
    }

    page
}

/// [`qa_page`] serialized for embedding in a `<script type="application/ld+json">`
pub fn qa_page_json(store: &KnowledgeStore) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&qa_page(store))
}
