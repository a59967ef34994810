//! Schema command implementation.

use crate::cli::SchemaArgs;
use crate::error::Result;
use crate::output::Formatter;
use folio_store::{schema, KnowledgeStore};
use std::path::Path;

/// Render the FAQ page for a knowledge file, to stdout or `args.output`
pub fn execute_schema(args: &SchemaArgs, path: &Path, formatter: &Formatter) -> Result<String> {
    let store = KnowledgeStore::from_path(path)?;
    let page = schema::qa_page_json(&store)?;

    match &args.output {
        Some(output) => {
            std::fs::write(output, &page)?;
            println!(
                "{}",
                formatter.success(&format!("Wrote {} questions to {}", store.len(), output))
            );
        }
        None => println!("{}", page),
    }

    Ok(page)
}
