use subsearch_core::tokenizer::{tokenize, Analyzer};

#[test]
fn it_normalizes_and_stems() {
    let analyzer = Analyzer { stem: true, ..Analyzer::default() };
    let words = analyzer.analyze("Running Runners RUN! The ﬁsh.");
    assert!(words.contains(&"run".to_string()));
    // NFKC folds the "ﬁ" ligature
    assert!(words.contains(&"fish".to_string()));
}

#[test]
fn it_filters_stopwords() {
    let words = tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert_eq!(words, vec!["quick", "brown", "fox", "lazy", "dog"]);
}

#[test]
fn it_ignores_digits_and_punctuation() {
    assert_eq!(tokenize("42 -- 7:30, ok?"), vec!["ok"]);
}
