//! Answers returned to the chat UI

use crate::EntryId;
use std::collections::BTreeSet;

/// A structured, renderable reply
///
/// When `refused` is false, `cited_entry_ids` only ever names entries that were
/// part of the retrieved context for the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Text shown to the visitor
    pub text: String,

    /// Entries the answer is grounded on
    pub cited_entry_ids: BTreeSet<EntryId>,

    /// True when no reliable grounded answer could be produced
    pub refused: bool,
}

impl Answer {
    /// A grounded (or generic, when `cited` is empty) answer
    pub fn grounded(text: impl Into<String>, cited: BTreeSet<EntryId>) -> Self {
        Self {
            text: text.into(),
            cited_entry_ids: cited,
            refused: false,
        }
    }

    /// A refusal carrying a user-facing message and no citations
    pub fn refusal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cited_entry_ids: BTreeSet::new(),
            refused: true,
        }
    }
}
