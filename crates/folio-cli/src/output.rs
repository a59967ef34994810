//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use folio_domain::{PortfolioEntry, Role, Turn};
use folio_engine::Reply;
use std::sync::Arc;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const MAX_TITLE_CHARS: usize = 40;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format knowledge entries.
    pub fn format_entries(&self, entries: &[Arc<PortfolioEntry>]) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_entries_json(entries),
            OutputFormat::Table => self.format_entries_table(entries),
            OutputFormat::Quiet => Ok(entries
                .iter()
                .map(|e| e.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_entries_json(&self, entries: &[Arc<PortfolioEntry>]) -> Result<String> {
        let json_entries: Vec<serde_json::Value> = entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "id": e.id.as_str(),
                    "category": e.category.as_str(),
                    "title": e.title,
                    "tags": e.tags,
                    "dates": e.date_range(),
                })
            })
            .collect();

        Ok(serde_json::to_string_pretty(&json_entries)?)
    }

    fn format_entries_table(&self, entries: &[Arc<PortfolioEntry>]) -> Result<String> {
        if entries.is_empty() {
            return Ok(self.colorize("No entries found.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Category", "Title", "Dates", "Tags"]);

        for entry in entries {
            let tags = entry.tags.iter().cloned().collect::<Vec<_>>().join(", ");
            builder.push_record([
                entry.id.to_string(),
                entry.category.to_string(),
                truncate(&entry.title, MAX_TITLE_CHARS),
                entry.date_range().unwrap_or_default(),
                tags,
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        Ok(table.to_string())
    }

    /// Format an answer.
    pub fn format_reply(&self, reply: &Reply) -> Result<String> {
        let answer = &reply.answer;
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "session_id": reply.session_id.as_str(),
                "text": answer.text,
                "cited_entry_ids": answer.cited_entry_ids.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
                "refused": answer.refused,
            }))?),
            OutputFormat::Quiet => Ok(answer.text.clone()),
            OutputFormat::Table => {
                if answer.refused {
                    return Ok(self.colorize(&answer.text, "yellow"));
                }
                let mut out = answer.text.clone();
                if !answer.cited_entry_ids.is_empty() {
                    let sources = answer
                        .cited_entry_ids
                        .iter()
                        .map(|id| id.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    out.push('\n');
                    out.push_str(&self.colorize(&format!("Sources: {}", sources), "cyan"));
                }
                Ok(out)
            }
        }
    }

    /// Format stored conversation turns.
    pub fn format_history(&self, turns: &[Turn]) -> String {
        if turns.is_empty() {
            return self.colorize("No history yet.", "yellow");
        }

        turns
            .iter()
            .map(|turn| {
                let label = match turn.role {
                    Role::User => self.colorize("you:", "blue"),
                    Role::Assistant => self.colorize("folio:", "magenta"),
                };
                format!("{} {}", label, turn.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::{Answer, Category, EntryId, SessionId};
    use std::collections::BTreeSet;

    fn entries() -> Vec<Arc<PortfolioEntry>> {
        vec![
            Arc::new(
                PortfolioEntry::new("p1", Category::Project, "Chat App", "Streaming chat")
                    .with_tags(["ai", "web"]),
            ),
            Arc::new(PortfolioEntry::new("s-rust", Category::Skill, "Rust", "Async services")),
        ]
    }

    fn grounded_reply() -> Reply {
        let cited: BTreeSet<EntryId> = [EntryId::from("p1")].into_iter().collect();
        Reply {
            session_id: SessionId::from("visitor"),
            answer: Answer::grounded("I built a Chat App.", cited),
        }
    }

    #[test]
    fn test_entries_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_entries(&entries()).unwrap();
        assert!(output.contains("Category"));
        assert!(output.contains("Chat App"));
        assert!(output.contains("ai, web"));
    }

    #[test]
    fn test_entries_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_entries(&entries()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["id"], "p1");
        assert_eq!(value[1]["category"], "skill");
    }

    #[test]
    fn test_entries_quiet() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(formatter.format_entries(&entries()).unwrap(), "p1\ns-rust");
    }

    #[test]
    fn test_reply_table_lists_sources() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_reply(&grounded_reply()).unwrap();
        assert_eq!(output, "I built a Chat App.\nSources: p1");
    }

    #[test]
    fn test_reply_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_reply(&grounded_reply()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["session_id"], "visitor");
        assert_eq!(value["cited_entry_ids"][0], "p1");
        assert_eq!(value["refused"], false);
    }

    #[test]
    fn test_refusal_has_no_sources() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let reply = Reply {
            session_id: SessionId::from("visitor"),
            answer: Answer::refusal("Sorry"),
        };
        assert_eq!(formatter.format_reply(&reply).unwrap(), "Sorry");
    }

    #[test]
    fn test_history() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let turns = vec![Turn::user("hi", 1), Turn::assistant("hello", 2)];
        assert_eq!(formatter.format_history(&turns), "you: hi\nfolio: hello");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_messages_without_color() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("done"), "✓ done");
        assert_eq!(formatter.warning("careful"), "⚠ careful");
    }
}
