use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static WORD_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("word token pattern is valid"));

/// Word n-gram analyzer: lowercases, keeps tokens of two or more word
/// characters, and emits every n-gram for `n` in `min_n..=max_n` joined by
/// a single space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NgramAnalyzer {
    min_n: usize,
    max_n: usize,
}

impl NgramAnalyzer {
    pub fn new(min_n: usize, max_n: usize) -> Self {
        let min_n = min_n.max(1);
        Self {
            min_n,
            max_n: max_n.max(min_n),
        }
    }

    pub fn range(&self) -> (usize, usize) {
        (self.min_n, self.max_n)
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        WORD_TOKEN
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Every n-gram in document order, duplicates included.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let tokens = self.tokenize(text);
        let mut ngrams = Vec::new();
        for n in self.min_n..=self.max_n {
            if n > tokens.len() {
                break;
            }
            ngrams.extend(tokens.windows(n).map(|window| window.join(" ")));
        }
        ngrams
    }

    /// The document's vocabulary: each n-gram once.
    pub fn distinct_terms(&self, text: &str) -> BTreeSet<String> {
        self.analyze(text).into_iter().collect()
    }
}

impl Default for NgramAnalyzer {
    fn default() -> Self {
        Self::new(1, 3)
    }
}
