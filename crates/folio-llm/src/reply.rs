//! Parse raw model output into a strict [`ModelReply`]
//!
//! Everything a backend returns passes through [`parse_reply`], so the engine
//! never touches untyped JSON.

use folio_domain::{BackendError, ModelReply};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawReply {
    #[serde(default)]
    text: Option<String>,

    #[serde(default, rename = "citedIds", alias = "cited_ids", alias = "citations")]
    cited_ids: Option<Vec<String>>,

    #[serde(default, alias = "refused")]
    declined: bool,
}

/// Strip a surrounding markdown code block, which models add despite being told not to
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    // Drop the opening fence line (```json or ```) and a trailing fence
    let body = match trimmed.find('\n') {
        Some(pos) => &trimmed[pos + 1..],
        None => return "",
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse `{ "text": ..., "citedIds": [...] }` into a [`ModelReply`]
pub fn parse_reply(content: &str) -> Result<ModelReply, BackendError> {
    let json = strip_code_fence(content);
    if json.is_empty() {
        return Err(BackendError::Malformed("Empty reply".to_string()));
    }

    let raw: RawReply = serde_json::from_str(json)
        .map_err(|e| BackendError::Malformed(format!("Reply is not valid JSON: {}", e)))?;

    let text = match raw.text {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => return Err(BackendError::Malformed("Reply has no text".to_string())),
    };

    let mut cited_ids: Vec<String> = Vec::new();
    for id in raw.cited_ids.unwrap_or_default() {
        let id = id.trim();
        if !id.is_empty() && !cited_ids.iter().any(|c| c == id) {
            cited_ids.push(id.to_string());
        }
    }

    Ok(ModelReply {
        text,
        cited_ids,
        declined: raw.declined,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_reply() {
        let reply = parse_reply(r#"{"text": "I built Chat App.", "citedIds": ["p1"]}"#).unwrap();
        assert_eq!(reply.text, "I built Chat App.");
        assert_eq!(reply.cited_ids, vec!["p1"]);
        assert!(!reply.declined);
    }

    #[test]
    fn test_parse_snake_case_and_declined() {
        let reply = parse_reply(r#"{"text": "Sorry.", "cited_ids": [], "refused": true}"#).unwrap();
        assert!(reply.cited_ids.is_empty());
        assert!(reply.declined);
    }

    #[test]
    fn test_parse_markdown_wrapped() {
        let response = "```json\n{\"text\": \"Hi\", \"citedIds\": [\"s1\"]}\n```";
        let reply = parse_reply(response).unwrap();
        assert_eq!(reply.cited_ids, vec!["s1"]);
    }

    #[test]
    fn test_citations_trimmed_and_deduplicated() {
        let reply = parse_reply(r#"{"text": "x", "citedIds": [" p1", "p1", "", "p2"]}"#).unwrap();
        assert_eq!(reply.cited_ids, vec!["p1", "p2"]);
    }

    #[test]
    fn test_missing_citations_is_empty() {
        let reply = parse_reply(r#"{"text": "Hello there"}"#).unwrap();
        assert!(reply.cited_ids.is_empty());
    }

    #[test]
    fn test_plain_text_is_malformed() {
        let err = parse_reply("I built a chat app.").unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }

    #[test]
    fn test_blank_text_is_malformed() {
        assert!(matches!(
            parse_reply(r#"{"text": "   ", "citedIds": ["p1"]}"#),
            Err(BackendError::Malformed(_))
        ));
        assert!(matches!(parse_reply(""), Err(BackendError::Malformed(_))));
    }

    #[test]
    fn test_wrong_citation_type_is_malformed() {
        assert!(matches!(
            parse_reply(r#"{"text": "x", "citedIds": "p1"}"#),
            Err(BackendError::Malformed(_))
        ));
    }

    #[test]
    fn test_strip_code_fence_without_language() {
        assert_eq!(strip_code_fence("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
    }
}
