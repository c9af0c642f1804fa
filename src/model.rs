//! Placement classifier: a fitted tree ensemble loaded read-only at start-up.
//!
//! The artifact is a bincode-encoded [`TreeEnsemble`]. It records the feature
//! names it was fitted on so that an artifact produced for a different column
//! order is rejected at load time instead of scoring silently wrong.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{DashboardError, Result};
use crate::models::{FeatureVector, FEATURES, FEATURE_COUNT};

pub const FORMAT_VERSION: u32 = 1;

/// Anything that can produce the probability of the positive ("placed") class.
pub trait Classifier {
    fn positive_probability(&self, features: &FeatureVector) -> f64;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Samples with `x[feature] <= threshold` go to `left`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Fraction of positive training samples that reached this leaf.
    Leaf { positive: f64 },
}

/// A single decision tree stored as a flat node array with the root at 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    #[allow(dead_code)]
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn leaf_value(&self, values: &[f64; FEATURE_COUNT]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { positive } => return *positive,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if values[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    fn depth(&self) -> usize {
        // Children always sit after their parent, so one forward pass suffices.
        let mut depths = vec![0usize; self.nodes.len()];
        let mut max_depth = 0;
        for (index, node) in self.nodes.iter().enumerate() {
            let depth = depths[index] + 1;
            max_depth = max_depth.max(depth);
            if let Node::Split { left, right, .. } = node {
                depths[*left] = depth;
                depths[*right] = depth;
            }
        }
        max_depth
    }

    fn validate(&self, tree_index: usize) -> Result<()> {
        let invalid = |reason: String| {
            DashboardError::ModelIncompatible(format!("tree {tree_index}: {reason}"))
        };

        if self.nodes.is_empty() {
            return Err(invalid("tree has no nodes".to_string()));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { positive } => {
                    if !(0.0..=1.0).contains(positive) {
                        return Err(invalid(format!(
                            "leaf {index} has probability {positive} outside [0, 1]"
                        )));
                    }
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(invalid(format!(
                            "node {index} splits on feature {feature}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(invalid(format!("node {index} has a non-finite threshold")));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(invalid(format!(
                                "node {index} points to invalid child {child}"
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Soft-voting ensemble: the mean of every tree's leaf probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    format_version: u32,
    feature_names: Vec<String>,
    trees: Vec<Tree>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub format_version: u32,
    pub tree_count: usize,
    pub node_count: usize,
    pub max_depth: usize,
    pub split_counts: Vec<(&'static str, usize)>,
}

impl TreeEnsemble {
    #[allow(dead_code)]
    pub fn new(trees: Vec<Tree>) -> Result<Self> {
        let ensemble = Self {
            format_version: FORMAT_VERSION,
            feature_names: FEATURES.iter().map(|name| name.to_string()).collect(),
            trees,
        };
        ensemble.validate()?;
        Ok(ensemble)
    }

    /// Loads and validates an artifact. A missing file is reported as
    /// [`DashboardError::ModelNotFound`] so start-up can fail fast.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DashboardError::ModelNotFound(path.to_path_buf()));
        }

        let bytes = fs::read(path).map_err(|source| DashboardError::ModelRead {
            path: path.to_path_buf(),
            source,
        })?;
        let ensemble = Self::from_bytes(&bytes)?;

        info!(
            path = %path.display(),
            trees = ensemble.trees.len(),
            "Loaded placement model"
        );
        Ok(ensemble)
    }

    #[allow(dead_code)]
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let ensemble: Self = bincode::deserialize(bytes).map_err(DashboardError::ModelDecode)?;
        ensemble.validate()?;
        Ok(ensemble)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(DashboardError::ModelEncode)
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn summary(&self) -> ModelSummary {
        let mut split_counts: Vec<(&'static str, usize)> =
            FEATURES.iter().map(|&name| (name, 0)).collect();

        for tree in &self.trees {
            for node in tree.nodes() {
                if let Node::Split { feature, .. } = node {
                    split_counts[*feature].1 += 1;
                }
            }
        }

        ModelSummary {
            format_version: self.format_version,
            tree_count: self.trees.len(),
            node_count: self.trees().iter().map(|tree| tree.nodes().len()).sum(),
            max_depth: self.trees.iter().map(Tree::depth).max().unwrap_or(0),
            split_counts,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(DashboardError::ModelIncompatible(format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                self.format_version
            )));
        }

        if self.feature_names.iter().map(String::as_str).ne(FEATURES.iter().copied()) {
            return Err(DashboardError::ModelIncompatible(format!(
                "fitted on features {:?}, expected {:?}",
                self.feature_names, FEATURES
            )));
        }

        if self.trees.is_empty() {
            return Err(DashboardError::ModelIncompatible(
                "ensemble has no trees".to_string(),
            ));
        }

        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(index)?;
        }

        Ok(())
    }
}

impl Classifier for TreeEnsemble {
    fn positive_probability(&self, features: &FeatureVector) -> f64 {
        let values = features.values();
        let total: f64 = self.trees.iter().map(|tree| tree.leaf_value(values)).sum();
        total / self.trees.len() as f64
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use tempfile::TempDir;

    use super::*;

    /// Two stumps on coding_score and cgpa, plus a depth-2 tree.
    pub(crate) fn sample_ensemble() -> TreeEnsemble {
        let coding = Tree::new(vec![
            Node::Split {
                feature: 2,
                threshold: 60.0,
                left: 1,
                right: 2,
            },
            Node::Leaf { positive: 0.2 },
            Node::Leaf { positive: 0.9 },
        ]);
        let cgpa = Tree::new(vec![
            Node::Split {
                feature: 0,
                threshold: 7.0,
                left: 1,
                right: 2,
            },
            Node::Leaf { positive: 0.3 },
            Node::Leaf { positive: 0.8 },
        ]);
        let deeper = Tree::new(vec![
            Node::Split {
                feature: 1,
                threshold: 65.0,
                left: 1,
                right: 2,
            },
            Node::Leaf { positive: 0.1 },
            Node::Split {
                feature: 5,
                threshold: 70.0,
                left: 3,
                right: 4,
            },
            Node::Leaf { positive: 0.6 },
            Node::Leaf { positive: 1.0 },
        ]);
        TreeEnsemble::new(vec![coding, cgpa, deeper]).expect("valid sample ensemble")
    }

    fn features(values: [f64; FEATURE_COUNT]) -> FeatureVector {
        FeatureVector::new(values)
    }

    #[test]
    fn averages_leaf_probabilities() {
        let ensemble = sample_ensemble();
        // coding 88 -> 0.9, cgpa 8.4 -> 0.8, aptitude 82 / soft skill 80 -> 1.0
        let strong = features([8.4, 82.0, 88.0, 79.0, 85.0, 80.0]);
        assert!((ensemble.positive_probability(&strong) - 0.9).abs() < 1e-12);

        // coding 49 -> 0.2, cgpa 6.2 -> 0.3, aptitude 58 -> 0.1
        let weak = features([6.2, 58.0, 49.0, 61.0, 66.0, 55.0]);
        assert!((ensemble.positive_probability(&weak) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn threshold_is_inclusive_on_the_left() {
        let ensemble = sample_ensemble();
        let on_threshold = features([7.0, 65.0, 60.0, 0.0, 0.0, 70.0]);
        let expected = (0.2 + 0.3 + 0.1) / 3.0;
        assert!((ensemble.positive_probability(&on_threshold) - expected).abs() < 1e-12);
    }

    #[test]
    fn save_and_load_preserve_inference_bits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("placement_model.bin");
        let ensemble = sample_ensemble();
        ensemble.save(&path).unwrap();

        let reloaded = TreeEnsemble::load(&path).unwrap();
        assert_eq!(reloaded, ensemble);

        let input = features([7.3, 66.0, 61.0, 72.0, 70.0, 71.0]);
        assert_eq!(
            reloaded.positive_probability(&input).to_bits(),
            ensemble.positive_probability(&input).to_bits()
        );
    }

    #[test]
    fn missing_artifact_fails_fast() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.bin");
        let err = TreeEnsemble::load(&path).unwrap_err();
        assert!(matches!(err, DashboardError::ModelNotFound(p) if p == path));
    }

    #[test]
    fn garbage_bytes_do_not_decode() {
        let err = TreeEnsemble::from_bytes(b"not a model").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::ModelDecode(_) | DashboardError::ModelIncompatible(_)
        ));
    }

    #[test]
    fn rejects_artifact_fitted_on_other_columns() {
        let mut ensemble = sample_ensemble();
        ensemble.feature_names.swap(1, 2);
        let bytes = bincode::serialize(&ensemble).unwrap();
        let err = TreeEnsemble::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, DashboardError::ModelIncompatible(_)));
    }

    #[test]
    fn rejects_backward_child_pointer() {
        let looping = Tree::new(vec![
            Node::Split {
                feature: 0,
                threshold: 5.0,
                left: 0,
                right: 1,
            },
            Node::Leaf { positive: 0.5 },
        ]);
        let err = TreeEnsemble::new(vec![looping]).unwrap_err();
        assert!(matches!(err, DashboardError::ModelIncompatible(_)));
    }

    #[test]
    fn rejects_unknown_feature_and_bad_leaf() {
        let wide = Tree::new(vec![
            Node::Split {
                feature: 6,
                threshold: 1.0,
                left: 1,
                right: 2,
            },
            Node::Leaf { positive: 0.1 },
            Node::Leaf { positive: 0.2 },
        ]);
        assert!(TreeEnsemble::new(vec![wide]).is_err());

        let bad_leaf = Tree::new(vec![Node::Leaf { positive: 1.5 }]);
        assert!(TreeEnsemble::new(vec![bad_leaf]).is_err());

        assert!(TreeEnsemble::new(Vec::new()).is_err());
    }

    #[test]
    fn summary_counts_splits_per_feature() {
        let summary = sample_ensemble().summary();
        assert_eq!(summary.tree_count, 3);
        assert_eq!(summary.node_count, 11);
        assert_eq!(summary.max_depth, 3);
        assert_eq!(summary.split_counts[0], ("cgpa", 1));
        assert_eq!(summary.split_counts[2], ("coding_score", 1));
        assert_eq!(summary.split_counts[3], ("placement_training_score", 0));
        assert_eq!(summary.split_counts[5], ("soft_skill_score", 1));
    }
}
