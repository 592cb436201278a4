use crate::tree::DecisionTreeClassifier;
use feature_engine::SCALAR_FEATURE_COUNT;
use rcc_core::{ModelError, PredictionError};
use serde::{Deserialize, Serialize};
use sprs::errors::{StructureError, StructureErrorKind};
use sprs::CsMat;
use std::collections::HashMap;

/// Seam for the trained estimator of a community bundle.
pub trait Classifier: Send + Sync {
    fn n_features(&self) -> usize;
    fn predict(&self, features: &[f64]) -> Result<i64, PredictionError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    DecisionTree(DecisionTreeClassifier),
}

impl ClassifierModel {
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            ClassifierModel::DecisionTree(tree) => tree.validate(),
        }
    }
}

impl Classifier for ClassifierModel {
    fn n_features(&self) -> usize {
        match self {
            ClassifierModel::DecisionTree(tree) => tree.n_features,
        }
    }

    fn predict(&self, features: &[f64]) -> Result<i64, PredictionError> {
        match self {
            ClassifierModel::DecisionTree(tree) => tree.predict(features),
        }
    }
}

/// Term to column mapping learnt when the training matrix was fit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FittedVocabulary {
    pub vocabulary: HashMap<String, usize>,
}

impl FittedVocabulary {
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    pub fn column(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Terms ordered by column index.
    pub fn feature_names(&self) -> Vec<&str> {
        let mut names = vec![""; self.vocabulary.len()];
        for (term, &column) in &self.vocabulary {
            if let Some(slot) = names.get_mut(column) {
                *slot = term.as_str();
            }
        }
        names
    }

    /// Columns must be exactly `0..len` with no gaps or repeats.
    fn validate(&self, community: &str) -> Result<(), ModelError> {
        let mut seen = vec![false; self.vocabulary.len()];
        for (term, &column) in &self.vocabulary {
            match seen.get_mut(column) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(ModelError::InvalidArtifact {
                        path: community.to_string(),
                        details: format!("vocabulary term '{}' has invalid column {}", term, column),
                    })
                }
            }
        }
        Ok(())
    }
}

/// Compressed sparse row matrix, as produced by fitting the vectorizer on the
/// training corpus.
///
/// Artifacts carry the raw `indptr`/`indices`/`data` arrays; they are checked
/// and row-sorted by `sprs` on the way in, so a loaded matrix is always
/// structurally sound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CsrArrays", into = "CsrArrays")]
pub struct CsrMatrix {
    matrix: CsMat<f64>,
}

#[derive(Serialize, Deserialize)]
struct CsrArrays {
    n_rows: usize,
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl CsrMatrix {
    pub fn new(
        n_rows: usize,
        n_cols: usize,
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<f64>,
    ) -> Result<Self, StructureError> {
        let shape = (n_rows, n_cols);
        match CsMat::try_new(shape, indptr, indices, data) {
            Ok(matrix) => Ok(Self { matrix }),
            // Row order is the only defect left once `try_new` gets this far.
            Err((indptr, indices, data, error)) if error.kind() == StructureErrorKind::Unsorted => {
                CsMat::new_from_unsorted(shape, indptr, indices, data)
                    .map(|matrix| Self { matrix })
                    .map_err(|(_, _, _, error)| error)
            }
            Err((_, _, _, error)) => Err(error),
        }
    }

    /// A matrix with no rows over `n_cols` vocabulary columns.
    pub fn empty(n_cols: usize) -> Self {
        Self {
            matrix: CsMat::zero((0, n_cols)),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.matrix.rows()
    }

    pub fn n_cols(&self) -> usize {
        self.matrix.cols()
    }

    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    /// `(column, value)` pairs of a row in column order, `None` past the last
    /// row.
    pub fn row(&self, row: usize) -> Option<Vec<(usize, f64)>> {
        self.matrix
            .outer_view(row)
            .map(|view| view.iter().map(|(column, &value)| (column, value)).collect())
    }
}

impl TryFrom<CsrArrays> for CsrMatrix {
    type Error = StructureError;

    fn try_from(arrays: CsrArrays) -> Result<Self, Self::Error> {
        Self::new(
            arrays.n_rows,
            arrays.n_cols,
            arrays.indptr,
            arrays.indices,
            arrays.data,
        )
    }
}

impl From<CsrMatrix> for CsrArrays {
    fn from(csr: CsrMatrix) -> Self {
        let (n_rows, n_cols) = csr.matrix.shape();
        let (indptr, indices, data) = csr.matrix.into_raw_storage();
        Self {
            n_rows,
            n_cols,
            indptr,
            indices,
            data,
        }
    }
}

/// Everything needed to score comments for one community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub classifier: ClassifierModel,
    pub vectorizer: FittedVocabulary,
    pub fitted_matrix: CsrMatrix,
}

impl ModelBundle {
    /// Width of the rows the classifier expects: vocabulary then scalars.
    pub fn feature_width(&self) -> usize {
        self.vectorizer.len() + SCALAR_FEATURE_COUNT
    }

    pub fn validate(&self, community: &str) -> Result<(), ModelError> {
        self.vectorizer.validate(community)?;
        self.classifier.validate()?;

        if self.fitted_matrix.n_cols() != self.vectorizer.len() {
            return Err(ModelError::MatrixShapeMismatch {
                community: community.to_string(),
                expected: self.vectorizer.len(),
                actual: self.fitted_matrix.n_cols(),
            });
        }
        if self.classifier.n_features() != self.feature_width() {
            return Err(ModelError::FeatureCountMismatch {
                community: community.to_string(),
                expected: self.feature_width(),
                actual: self.classifier.n_features(),
            });
        }
        Ok(())
    }
}
