use crate::tokenizer::Analyzer;

pub const SNIPPET_LEN: usize = 200;
const LEAD: usize = 100;

/// Window of `text` around the first case-insensitive hit of any query word,
/// or the start of the text when nothing matches.
pub fn snippet(text: &str, terms: &[String]) -> String {
    if text.is_empty() { return String::new(); }
    let mut first_idx: Option<usize> = None;
    for term in terms {
        if term.trim().is_empty() { continue; }
        if let Some(pos) = find_case_insensitive(text, term) { first_idx = Some(pos); break; }
    }
    match first_idx {
        Some(idx) => {
            let start = floor_boundary(text, idx.saturating_sub(LEAD));
            let end = floor_boundary(text, (start + SNIPPET_LEN).min(text.len()));
            text[start..end].to_string()
        }
        None => text.chars().take(SNIPPET_LEN).collect(),
    }
}

/// Query words to look for in cleaned text: letters only, as the normalizer
/// leaves them, and only words the analyzer would index.
pub fn anchor_terms(query: &str, analyzer: &Analyzer) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for word in query.split_whitespace() {
        let word: String = word.chars().filter(|c| c.is_ascii_alphabetic()).collect();
        if word.is_empty() || analyzer.analyze(&word).is_empty() { continue; }
        if !terms.iter().any(|t| t.eq_ignore_ascii_case(&word)) { terms.push(word); }
    }
    terms
}

/// Wrap every case-insensitive occurrence of a term in `<em>`, in one pass
/// so markup added for one term is never matched by another.
pub fn highlight_terms(snippet: &str, terms: &[String]) -> String {
    let mut terms: Vec<&str> = terms.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect();
    if terms.is_empty() { return snippet.to_string(); }
    // longest first, so "cats" wins over "cat" at the same position
    terms.sort_by(|a, b| b.len().cmp(&a.len()));
    let alternation = terms.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
    let Ok(pat) = regex::RegexBuilder::new(&alternation).case_insensitive(true).build() else {
        return snippet.to_string();
    };
    pat.replace_all(snippet, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).into_owned()
}

fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    // lowercasing ASCII keeps byte offsets; fall back to no match otherwise
    if !haystack.is_ascii() || !needle.is_ascii() { return None; }
    haystack.to_ascii_lowercase().find(&needle.to_ascii_lowercase())
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    while !text.is_char_boundary(idx) { idx -= 1; }
    idx
}
