use crate::cleaner::clean_comment;
use crate::lemmatizer::Lemmatizer;
use crate::sentiment::{LexiconSentimentScorer, SentimentScorer};
use crate::stopwords::StopwordList;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?:!.]").expect("sentence break pattern is valid"));

/// Number of scalar columns appended after the vocabulary columns.
pub const SCALAR_FEATURE_COUNT: usize = 8;

/// Names of the scalar columns, in the order they trail the vocabulary.
pub const SCALAR_FEATURE_NAMES: [&str; SCALAR_FEATURE_COUNT] = [
    "char_count",
    "max_polarity",
    "max_subjectivity",
    "min_polarity",
    "min_subjectivity",
    "overall_polarity",
    "time",
    "words_count",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentFeatures {
    /// Lemmatized, stopword-free token stream used for vectorization.
    pub comment: String,
    pub char_count: usize,
    pub words_count: usize,
    pub max_polarity: f64,
    pub min_polarity: f64,
    pub max_subjectivity: f64,
    pub min_subjectivity: f64,
    pub overall_polarity: f64,
    pub time: f64,
}

impl CommentFeatures {
    pub fn scalar_features(&self) -> [f64; SCALAR_FEATURE_COUNT] {
        [
            self.char_count as f64,
            self.max_polarity,
            self.max_subjectivity,
            self.min_polarity,
            self.min_subjectivity,
            self.overall_polarity,
            self.time,
            self.words_count as f64,
        ]
    }
}

pub struct CommentFeatureExtractor {
    scorer: Box<dyn SentimentScorer>,
    lemmatizer: Lemmatizer,
    stopwords: StopwordList,
}

impl CommentFeatureExtractor {
    pub fn new(
        scorer: Box<dyn SentimentScorer>,
        lemmatizer: Lemmatizer,
        stopwords: StopwordList,
    ) -> Self {
        Self {
            scorer,
            lemmatizer,
            stopwords,
        }
    }

    pub fn extract(&self, raw_comment: &str, elapsed_minutes: f64) -> CommentFeatures {
        let cleaned = clean_comment(raw_comment);

        // Zero sentinel: an empty comment reports 0 for every extreme.
        let mut polarities = vec![0.0_f64];
        let mut subjectivities = vec![0.0_f64];
        for sentence in SENTENCE_BREAK.split(&cleaned) {
            if sentence.is_empty() {
                continue;
            }
            let sentiment = self.scorer.score(sentence);
            polarities.push(round_to(sentiment.polarity, 4));
            subjectivities.push(round_to(sentiment.subjectivity, 4));
        }

        let overall = self.scorer.score(&cleaned);
        let words: Vec<&str> = cleaned.split_whitespace().collect();

        let comment = words
            .iter()
            .map(|word| self.lemmatizer.lemmatize(word))
            .filter(|lemma| !self.stopwords.contains(lemma))
            .collect::<Vec<_>>()
            .join(" ");

        CommentFeatures {
            comment,
            char_count: cleaned.trim().chars().count(),
            words_count: words.len(),
            max_polarity: max_of(&polarities),
            min_polarity: min_of(&polarities),
            max_subjectivity: max_of(&subjectivities),
            min_subjectivity: min_of(&subjectivities),
            overall_polarity: round_to(overall.polarity, 4),
            time: round_to(elapsed_minutes, 2),
        }
    }
}

impl Default for CommentFeatureExtractor {
    fn default() -> Self {
        Self::new(
            Box::new(LexiconSentimentScorer::english()),
            Lemmatizer::new(),
            StopwordList::all_languages(),
        )
    }
}

/// Rounds the exact binary value half to even, the way fixed-precision
/// formatting does, so 2.125 becomes 2.12.
fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::Sentiment;

    struct FixedScorer(Sentiment);

    impl SentimentScorer for FixedScorer {
        fn score(&self, _text: &str) -> Sentiment {
            self.0
        }
    }

    #[test]
    fn test_empty_comment_yields_sentinels() {
        let features = CommentFeatureExtractor::default().extract("", 0.0);
        assert_eq!(features.max_polarity, 0.0);
        assert_eq!(features.min_polarity, 0.0);
        assert_eq!(features.max_subjectivity, 0.0);
        assert_eq!(features.min_subjectivity, 0.0);
        assert_eq!(features.words_count, 0);
        assert_eq!(features.char_count, 0);
        assert_eq!(features.comment, "");
    }

    #[test]
    fn test_markup_only_comment_yields_sentinels() {
        let features = CommentFeatureExtractor::default().extract("[](https://x.com) **", 1.0);
        assert_eq!(features.max_polarity, 0.0);
        assert_eq!(features.min_subjectivity, 0.0);
        assert_eq!(features.words_count, 0);
    }

    #[test]
    fn test_word_count_uses_cleaned_text() {
        let raw = "The dogs are **really** here.\nSee [docs](https://docs.rs) now";
        let features = CommentFeatureExtractor::default().extract(raw, 2.0);
        let cleaned = clean_comment(raw);
        assert_eq!(features.words_count, cleaned.split_whitespace().count());
        assert_eq!(features.words_count, 8);
        assert_eq!(features.char_count, cleaned.trim().chars().count());
    }

    #[test]
    fn test_lemmatized_stream_drops_stopwords() {
        let features = CommentFeatureExtractor::default().extract("the houses and the cars", 0.0);
        assert_eq!(features.comment, "house car");
    }

    #[test]
    fn test_stopwords_of_other_languages_are_dropped() {
        let extractor = CommentFeatureExtractor::default();
        let features = extractor.extract("la vida es bella y de verdad", 0.0);
        assert_eq!(features.comment, "vida bella verdad");
        assert_eq!(features.words_count, 7);

        let german = extractor.extract("das ist nicht gut", 0.0);
        assert_eq!(german.comment, "gut");
    }

    #[test]
    fn test_sentence_extremes() {
        let features =
            CommentFeatureExtractor::default().extract("This is great. That was terrible!", 0.0);
        assert_eq!(features.max_polarity, 0.8);
        assert_eq!(features.min_polarity, -1.0);
        assert_eq!(features.max_subjectivity, 1.0);
        assert_eq!(features.min_subjectivity, 0.0);
    }

    #[test]
    fn test_positive_comment_keeps_zero_floor() {
        let features = CommentFeatureExtractor::default().extract("good good good", 5.0);
        assert_eq!(features.min_polarity, 0.0);
        assert_eq!(features.max_polarity, 0.7);
        assert_eq!(features.overall_polarity, 0.7);
    }

    #[test]
    fn test_rounding() {
        let scorer = FixedScorer(Sentiment {
            polarity: 0.123456,
            subjectivity: 0.98767,
        });
        let extractor =
            CommentFeatureExtractor::new(Box::new(scorer), Lemmatizer::new(), StopwordList::default());
        let features = extractor.extract("one sentence", 12.3456);
        assert_eq!(features.max_polarity, 0.1235);
        assert_eq!(features.max_subjectivity, 0.9877);
        assert_eq!(features.overall_polarity, 0.1235);
        assert_eq!(features.time, 12.35);
    }

    #[test]
    fn test_rounding_ties_go_to_even() {
        assert_eq!(round_to(2.125, 2), 2.12);
        assert_eq!(round_to(2.375, 2), 2.38);
        assert_eq!(round_to(0.03125, 4), 0.0312);
        assert_eq!(round_to(-0.03125, 4), -0.0312);

        let features = CommentFeatureExtractor::default().extract("x", 2.125);
        assert_eq!(features.time, 2.12);
    }

    #[test]
    fn test_scalar_feature_order() {
        let features = CommentFeatures {
            comment: String::new(),
            char_count: 1,
            words_count: 8,
            max_polarity: 2.0,
            min_polarity: 4.0,
            max_subjectivity: 3.0,
            min_subjectivity: 5.0,
            overall_polarity: 6.0,
            time: 7.0,
        };
        assert_eq!(
            features.scalar_features(),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]
        );
    }
}
