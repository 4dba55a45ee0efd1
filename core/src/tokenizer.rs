use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    // Contractions are also stored without the apostrophe ("dont"), except where
    // that spelling is an ordinary word.
    static ref STOPWORDS: HashSet<String> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        const KEEP: &[&str] = &["hed", "hell", "id", "ill", "shed", "shell", "wed", "well"];
        let mut set: HashSet<String> = words.iter().map(|w| w.to_string()).collect();
        for w in words.iter().filter(|w| w.contains('\'')) {
            let bare = w.replace('\'', "");
            if !KEEP.contains(&bare.as_str()) { set.insert(bare); }
        }
        set
    };
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Turns text into index terms. Stored in the term model so queries are
/// analyzed exactly like the corpus was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analyzer {
    pub stem: bool,
    pub min_token_len: usize,
}

impl Default for Analyzer {
    fn default() -> Self { Self { stem: false, min_token_len: 2 } }
}

impl Analyzer {
    /// NFKC normalization, lowercase, apostrophe removal, stopword removal and optional stemming.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let mut terms = Vec::new();
        for mat in RE.find_iter(&normalized) {
            if is_stopword(mat.as_str()) { continue; }
            let token = mat.as_str().replace('\'', "");
            if token.chars().count() < self.min_token_len || is_stopword(&token) { continue; }
            if self.stem {
                terms.push(STEMMER.stem(&token).into_owned());
            } else {
                terms.push(token);
            }
        }
        terms
    }
}

/// Analyze with the default settings.
pub fn tokenize(text: &str) -> Vec<String> {
    Analyzer::default().analyze(text)
}
