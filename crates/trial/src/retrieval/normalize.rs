//! Tokenizer/normalizer shared by queries and chunks.

use regex_lite::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9']+").expect("token pattern is valid"));

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "of", "to", "and", "is", "in", "on", "for", "at", "by", "with", "be",
    "are", "as", "it", "that", "this", "from",
];

fn keep(token: &str) -> bool {
    token.len() > 1 && !STOPWORDS.contains(&token)
}

/// Lazy token stream over a lowercased copy of the input.
pub struct Tokens {
    text: String,
    pos: usize,
}

impl Iterator for Tokens {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some(m) = TOKEN.find_at(&self.text, self.pos) {
            self.pos = m.end();
            if keep(m.as_str()) {
                return Some(m.as_str().to_string());
            }
        }
        self.pos = self.text.len();
        None
    }
}

/// Tokens of `text`: lowercase `[a-z0-9']+` runs, without stopwords or
/// single-character tokens. No stemming.
pub fn tokens(text: &str) -> Tokens {
    Tokens {
        text: text.to_lowercase(),
        pos: 0,
    }
}

/// Collected form of [`tokens`].
pub fn normalize(text: &str) -> Vec<String> {
    tokens(text).collect()
}

/// Term → occurrence count.
pub fn term_counts(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for token in tokens(text) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_stopwords_and_punctuation() {
        assert_eq!(normalize("The Quick, Fox!"), vec!["quick", "fox"]);
    }

    #[test]
    fn drops_single_character_tokens() {
        assert_eq!(normalize("a b cat"), vec!["cat"]);
    }

    #[test]
    fn keeps_apostrophes_and_digits() {
        assert_eq!(
            normalize("The defendant's phone, 555 0199"),
            vec!["defendant's", "phone", "555", "0199"]
        );
    }

    #[test]
    fn non_ascii_letters_split_tokens() {
        assert_eq!(normalize("café witness"), vec!["caf", "witness"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(normalize("").is_empty());
        assert!(normalize("... !!! a I").is_empty());
    }

    #[test]
    fn tokens_is_lazy_and_fused() {
        let mut it = tokens("hoodie cctv");
        assert_eq!(it.next().as_deref(), Some("hoodie"));
        assert_eq!(it.next().as_deref(), Some("cctv"));
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn counts_repeated_terms() {
        let counts = term_counts("Witness saw the witness leave. WITNESS!");
        assert_eq!(counts["witness"], 3);
        assert_eq!(counts["saw"], 1);
        assert!(!counts.contains_key("the"));
    }
}
