use regex::Regex;
use std::sync::OnceLock;

/// Runs of whitespace or Unicode punctuation (general category `P`).
///
/// Symbols such as `+`, `$` or `|` are not punctuation and stay inside
/// tokens.
fn separators() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[\s\p{P}]+").expect("separator pattern is valid"))
}

/// Lowercases `sentence` and splits it on runs of separators.
/// Empty tokens are never produced.
pub fn tokenize(sentence: &str) -> Vec<String> {
    separators()
        .split(&sentence.to_lowercase())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whole-token, case-insensitive containment.
///
/// `word` is compared as a single token, so a multi-word target such as
/// `"analog clock"` can never be found. An empty `word` never matches.
pub fn contains_word(sentence: &str, word: &str) -> bool {
    let word = word.to_lowercase();
    if word.is_empty() {
        return false;
    }
    tokenize(sentence).iter().any(|token| *token == word)
}
