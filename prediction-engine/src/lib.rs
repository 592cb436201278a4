pub mod bundle;
pub mod predictor;
pub mod registry;
pub mod tree;

pub use bundle::{Classifier, ClassifierModel, CsrMatrix, FittedVocabulary, ModelBundle};
pub use predictor::Predictor;
pub use registry::ModelRegistry;
pub use tree::DecisionTreeClassifier;
