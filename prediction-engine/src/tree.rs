use rcc_core::{ModelError, PredictionError};
use serde::{Deserialize, Serialize};

const LEAF: i64 = -1;

/// Binary decision tree stored as parallel node arrays. Node `i` is a leaf
/// when `children_left[i] == -1`; otherwise samples with
/// `x[feature[i]] <= threshold[i]` go left. `value[i]` holds per-class
/// weights and the predicted label is the class with the largest weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    pub n_features: usize,
    pub classes: Vec<i64>,
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTreeClassifier {
    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let nodes = self.node_count();
        let malformed = |reason: String| Err(ModelError::MalformedTree { reason });

        if nodes == 0 {
            return malformed("tree has no nodes".to_string());
        }
        if self.classes.is_empty() {
            return malformed("tree has no classes".to_string());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != nodes)
        {
            return malformed("node arrays have different lengths".to_string());
        }

        for node in 0..nodes {
            if self.value[node].len() != self.classes.len() {
                return malformed(format!(
                    "node {} has {} class weights for {} classes",
                    node,
                    self.value[node].len(),
                    self.classes.len()
                ));
            }

            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF && right == LEAF {
                continue;
            }
            // Children always come after their parent, which also rules out cycles.
            for child in [left, right] {
                if child <= node as i64 || child >= nodes as i64 {
                    return malformed(format!("node {} has invalid child {}", node, child));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= self.n_features {
                return malformed(format!(
                    "node {} splits on feature {} of {}",
                    node, feature, self.n_features
                ));
            }
        }
        Ok(())
    }

    pub fn predict(&self, features: &[f64]) -> Result<i64, PredictionError> {
        if features.len() != self.n_features {
            return Err(PredictionError::FeatureMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let split = self.feature[node] as usize;
            node = if features[split] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }

        let weights = &self.value[node];
        let best = weights
            .iter()
            .enumerate()
            .fold(0usize, |best, (idx, &w)| if w > weights[best] { idx } else { best });
        Ok(self.classes[best])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x[0] <= 0.5 -> class 0, otherwise class 1
    fn stump() -> DecisionTreeClassifier {
        DecisionTreeClassifier {
            n_features: 2,
            classes: vec![0, 1],
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -2, -2],
            threshold: vec![0.5, -2.0, -2.0],
            value: vec![vec![5.0, 5.0], vec![4.0, 1.0], vec![1.0, 4.0]],
        }
    }

    #[test]
    fn test_stump_predictions() {
        let tree = stump();
        tree.validate().unwrap();
        assert_eq!(tree.predict(&[0.0, 9.0]).unwrap(), 0);
        assert_eq!(tree.predict(&[0.5, 9.0]).unwrap(), 0);
        assert_eq!(tree.predict(&[1.0, 9.0]).unwrap(), 1);
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let result = stump().predict(&[1.0]);
        assert!(matches!(
            result,
            Err(PredictionError::FeatureMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_ties_pick_first_class() {
        let tree = DecisionTreeClassifier {
            n_features: 1,
            classes: vec![0, 1],
            children_left: vec![-1],
            children_right: vec![-1],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![vec![3.0, 3.0]],
        };
        tree.validate().unwrap();
        assert_eq!(tree.predict(&[42.0]).unwrap(), 0);
    }

    #[test]
    fn test_cycle_is_malformed() {
        let mut tree = stump();
        tree.children_left[0] = 0;
        assert!(matches!(tree.validate(), Err(ModelError::MalformedTree { .. })));
    }

    #[test]
    fn test_split_feature_out_of_range_is_malformed() {
        let mut tree = stump();
        tree.feature[0] = 2;
        assert!(matches!(tree.validate(), Err(ModelError::MalformedTree { .. })));
    }

    #[test]
    fn test_mismatched_arrays_are_malformed() {
        let mut tree = stump();
        tree.threshold.pop();
        assert!(matches!(tree.validate(), Err(ModelError::MalformedTree { .. })));
    }
}
