use crate::bundle::{Classifier, ModelBundle};
use crate::registry::ModelRegistry;
use feature_engine::{CommentFeatureExtractor, CommentFeatures, NgramAnalyzer};
use rcc_core::PredictionError;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Scores single comments against the community bundles of a registry.
pub struct Predictor {
    registry: Arc<ModelRegistry>,
    extractor: CommentFeatureExtractor,
    analyzer: NgramAnalyzer,
}

impl Predictor {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self::with_extractor(registry, CommentFeatureExtractor::default())
    }

    pub fn with_extractor(registry: Arc<ModelRegistry>, extractor: CommentFeatureExtractor) -> Self {
        Self {
            registry,
            extractor,
            analyzer: NgramAnalyzer::new(1, 3),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Returns the class label (0 or 1) the community's model assigns to
    /// `raw_comment` posted `elapsed_minutes` after its parent post. A comment
    /// with no n-gram left after cleaning fails with `EmptyVocabulary`.
    pub fn predict(
        &self,
        raw_comment: &str,
        elapsed_minutes: f64,
        community: &str,
    ) -> Result<i64, PredictionError> {
        let bundle = self.registry.bundle(community)?;
        let features = self.extractor.extract(raw_comment, elapsed_minutes);
        let terms = self.analyzer.distinct_terms(&features.comment);
        if terms.is_empty() {
            return Err(PredictionError::EmptyVocabulary);
        }
        let row = presence_row(bundle, &terms, &features);
        let label = bundle.classifier.predict(&row)?;
        debug!(
            "r/{}: {} words, {} columns -> {}",
            community,
            features.words_count,
            row.len(),
            label
        );
        Ok(label)
    }

    /// Vocabulary presence columns followed by the scalar features.
    ///
    /// Each distinct n-gram of the comment that the bundle knows adds 1 to
    /// its column, regardless of how often it occurs; unknown n-grams are
    /// dropped.
    pub fn feature_row(&self, bundle: &ModelBundle, features: &CommentFeatures) -> Vec<f64> {
        let terms = self.analyzer.distinct_terms(&features.comment);
        presence_row(bundle, &terms, features)
    }
}

fn presence_row(
    bundle: &ModelBundle,
    terms: &BTreeSet<String>,
    features: &CommentFeatures,
) -> Vec<f64> {
    let mut row = vec![0.0; bundle.vectorizer.len()];
    for term in terms {
        if let Some(column) = bundle.vectorizer.column(term) {
            row[column] += 1.0;
        }
    }
    row.extend_from_slice(&features.scalar_features());
    row
}
