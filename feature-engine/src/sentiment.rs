use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

const BUNDLED_LEXICON: &str = include_str!("data/en-sentiment.tsv");

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[:;]-?[()DP/]|<3|[A-Za-z]+(?:'[A-Za-z]+)?").expect("token pattern is valid")
});

/// Polarity in [-1, 1] and subjectivity in [0, 1] of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sentiment {
    pub polarity: f64,
    pub subjectivity: f64,
}

/// Anything able to score free text. Implementations must be shareable
/// between request handlers.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> Sentiment;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexiconEntry {
    pub polarity: f64,
    pub subjectivity: f64,
    pub intensity: f64,
}

impl LexiconEntry {
    fn is_intensifier(&self) -> bool {
        self.polarity == 0.0 && self.intensity != 1.0
    }
}

/// Averages word-level assessments from a polarity lexicon. Intensifiers
/// scale the next assessed word and a preceding negation flips it at half
/// strength.
#[derive(Debug, Clone)]
pub struct LexiconSentimentScorer {
    entries: HashMap<String, LexiconEntry>,
}

impl LexiconSentimentScorer {
    pub fn new(entries: HashMap<String, LexiconEntry>) -> Self {
        Self { entries }
    }

    /// Lexicon shipped with the crate.
    pub fn english() -> Self {
        let entries = parse_lexicon(BUNDLED_LEXICON);
        debug!("Loaded sentiment lexicon with {} entries", entries.len());
        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, word: &str) -> Option<&LexiconEntry> {
        self.entries.get(word)
    }
}

impl Default for LexiconSentimentScorer {
    fn default() -> Self {
        Self::english()
    }
}

impl SentimentScorer for LexiconSentimentScorer {
    fn score(&self, text: &str) -> Sentiment {
        let mut assessments: Vec<(f64, f64)> = Vec::new();
        let mut intensity = 1.0;
        let mut negated = false;

        for token in TOKEN.find_iter(text) {
            let raw = token.as_str();
            let is_emoticon = !raw.starts_with(|c: char| c.is_ascii_alphabetic());
            let word = if is_emoticon {
                raw.to_string()
            } else {
                raw.to_lowercase()
            };

            if is_negation(&word) {
                negated = true;
                continue;
            }

            let Some(entry) = self.entries.get(&word) else {
                continue;
            };

            if entry.is_intensifier() {
                intensity *= entry.intensity;
                continue;
            }

            let mut polarity = entry.polarity * intensity;
            let subjectivity = (entry.subjectivity * intensity).min(1.0);
            if negated {
                polarity *= -0.5;
            }
            assessments.push((polarity, subjectivity));
            intensity = 1.0;
            negated = false;
        }

        if assessments.is_empty() {
            return Sentiment::default();
        }

        let count = assessments.len() as f64;
        let polarity = assessments.iter().map(|(p, _)| p).sum::<f64>() / count;
        let subjectivity = assessments.iter().map(|(_, s)| s).sum::<f64>() / count;

        Sentiment {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: subjectivity.clamp(0.0, 1.0),
        }
    }
}

fn is_negation(word: &str) -> bool {
    matches!(word, "not" | "never" | "no" | "nor") || word.ends_with("n't")
}

/// Parses `word<TAB>polarity<TAB>subjectivity<TAB>intensity` lines. Blank
/// lines, `#` comments and malformed rows are skipped.
pub fn parse_lexicon(source: &str) -> HashMap<String, LexiconEntry> {
    source
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let word = fields.next()?.trim();
            let polarity = fields.next()?.trim().parse().ok()?;
            let subjectivity = fields.next()?.trim().parse().ok()?;
            let intensity = fields.next()?.trim().parse().ok()?;
            Some((
                word.to_string(),
                LexiconEntry {
                    polarity,
                    subjectivity,
                    intensity,
                },
            ))
        })
        .collect()
}
