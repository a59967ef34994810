//! Check command implementation.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::Formatter;
use folio_store::KnowledgeStore;
use std::path::Path;

/// Load a knowledge file and list its entries
///
/// Any problem that would stop the server from starting is returned as an
/// error.
pub fn execute_check(path: &Path, formatter: &Formatter) -> Result<KnowledgeStore> {
    let store = KnowledgeStore::from_path(path)?;

    if formatter.format() == OutputFormat::Table {
        let owner = store
            .owner()
            .map(|o| format!(" for {}", o.name))
            .unwrap_or_default();
        println!(
            "{}",
            formatter.success(&format!(
                "{}: {} entries{} (version {})",
                path.display(),
                store.len(),
                owner,
                store.version()
            ))
        );
    }
    println!("{}", formatter.format_entries(store.load())?);

    Ok(store)
}
