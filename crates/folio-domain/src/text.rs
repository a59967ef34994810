//! Text normalisation shared by lexical retrieval and the hashed embedder

/// Words that carry no retrieval signal in questions about a portfolio
const STOPWORDS: &[&str] = &[
    "a", "about", "an", "and", "any", "are", "as", "at", "be", "been", "but", "by", "can",
    "could", "did", "do", "does", "done", "for", "from", "had", "has", "have", "he", "her",
    "his", "how", "i", "if", "in", "into", "is", "it", "its", "know", "me", "my", "no", "not",
    "of", "on", "or", "our", "please", "she", "should", "so", "some", "tell", "that", "the",
    "their", "them", "there", "these", "they", "this", "those", "to", "us", "was", "we",
    "were", "what", "when", "where", "which", "who", "whom", "whose", "why", "will", "with",
    "would", "you", "your", "yours",
];

/// Lowercase and replace punctuation with spaces, collapsing whitespace
///
/// # Examples
///
/// ```
/// use folio_domain::text::normalize;
///
/// assert_eq!(normalize("  What AI projects, exactly?! "), "what ai projects exactly");
/// ```
pub fn normalize(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `word` (already lowercased) is a stopword
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.binary_search(&word).is_ok()
}

/// Fold simple English plurals so "projects" matches "project"
pub fn fold(word: &str) -> String {
    if word.len() > 4 && word.ends_with("ies") {
        format!("{}y", &word[..word.len() - 3])
    } else if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Normalised, folded, stopword-free terms in order of appearance (may repeat)
///
/// # Examples
///
/// ```
/// use folio_domain::text::terms;
///
/// assert_eq!(terms("What AI projects have you built?"), vec!["ai", "project", "built"]);
/// ```
pub fn terms(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|w| !w.is_empty() && !is_stopword(w))
        .map(fold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopwords_sorted_for_binary_search() {
        let mut sorted = STOPWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOPWORDS.to_vec());
    }

    #[test]
    fn test_fold() {
        assert_eq!(fold("projects"), "project");
        assert_eq!(fold("technologies"), "technology");
        assert_eq!(fold("class"), "class");
        assert_eq!(fold("ios"), "ios");
        assert_eq!(fold("ai"), "ai");
    }

    #[test]
    fn test_terms_drop_punctuation_and_stopwords() {
        assert_eq!(terms("Rust, Go & TypeScript!"), vec!["rust", "go", "typescript"]);
        assert!(terms("what is it?").is_empty());
        assert!(terms("").is_empty());
    }

    #[test]
    fn test_normalize_unicode() {
        assert_eq!(normalize("Café—Zürich"), "café zürich");
    }
}
