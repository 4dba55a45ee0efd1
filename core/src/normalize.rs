use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TIMESTAMP: Regex =
        Regex::new(r"\d{2}:\d{2}:\d{2},\d{3} --> \d{2}:\d{2}:\d{2},\d{3}").expect("valid regex");
    static ref WHITESPACE: Regex = Regex::new(r"[\s\x1c-\x1f]+").expect("valid regex");
    static ref TAG: Regex = Regex::new(r"<[^>]+>").expect("valid regex");
}

/// Decode bytes one char per byte (Latin-1). Never fails.
pub fn decode_latin1(raw: &[u8]) -> String {
    raw.iter().map(|&b| b as char).collect()
}

/// Number of bytes outside the ASCII range; these are dropped during cleaning.
pub fn count_non_ascii(raw: &[u8]) -> usize {
    raw.iter().filter(|b| !b.is_ascii()).count()
}

/// Reduce raw subtitle bytes to plain text made of ASCII letters and single spaces.
pub fn clean_subtitle(raw: &[u8]) -> String {
    clean_text(&decode_latin1(raw))
}

/// Cleaning steps that follow decoding. Output may be empty.
pub fn clean_text(text: &str) -> String {
    let text = TIMESTAMP.replace_all(text, "");
    let text: String = text.chars().filter(char::is_ascii).collect();
    let text = collapse_whitespace(&text);
    let text = TAG.replace_all(&text, "");
    let text: String = text
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || is_separator(*c))
        .collect();
    let text = collapse_whitespace(&text);
    // no-op after the letter filter above
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_ascii_punctuation() || *c == ' ')
        .collect()
}

// `char::is_whitespace` leaves out the ASCII file/group/record/unit separators
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}
