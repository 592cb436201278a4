//! Text cleaning and per-comment feature extraction.

pub mod cleaner;
pub mod features;
pub mod lemmatizer;
pub mod ngrams;
pub mod sentiment;
pub mod stopwords;
#[cfg(feature = "transformer")]
pub mod transformer;

pub use cleaner::clean_comment;
pub use features::{
    CommentFeatureExtractor, CommentFeatures, SCALAR_FEATURE_COUNT, SCALAR_FEATURE_NAMES,
};
pub use lemmatizer::Lemmatizer;
pub use ngrams::NgramAnalyzer;
pub use sentiment::{LexiconSentimentScorer, Sentiment, SentimentScorer};
pub use stopwords::StopwordList;
#[cfg(feature = "transformer")]
pub use transformer::TransformerSentimentScorer;
