//! Gradient-boosted tree ensemble: `y = base_score + sum of leaf values`.
//!
//! Each tree is a flat node list with the root at index 0. Children always
//! sit after their parent, so traversal terminates without a visited set.

use super::InferenceModel;
use crate::preprocessing::PreprocessingError;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// A node of a regression tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Go left when `x[feature] < threshold`; NaN follows `default_left`.
    Split {
        feature: u32,
        threshold: f64,
        left: u32,
        right: u32,
        default_left: bool,
    },
    Leaf { value: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsembleParams {
    pub n_features: usize,
    pub base_score: f64,
    pub trees: Vec<Vec<TreeNode>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeEnsemble {
    n_features: usize,
    base_score: f64,
    trees: Vec<Vec<TreeNode>>,
}

fn invalid(reason: String) -> PreprocessingError {
    PreprocessingError::InvalidParameter(reason)
}

fn check_tree(tree_idx: usize, nodes: &[TreeNode], n_features: usize) -> Result<(), PreprocessingError> {
    if nodes.is_empty() {
        return Err(invalid(format!("tree {} has no nodes", tree_idx)));
    }
    for (idx, node) in nodes.iter().enumerate() {
        match node {
            TreeNode::Leaf { value } if !value.is_finite() => {
                return Err(invalid(format!(
                    "tree {} node {}: leaf value is not finite",
                    tree_idx, idx
                )));
            }
            TreeNode::Leaf { .. } => {}
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
                ..
            } => {
                if *feature as usize >= n_features {
                    return Err(invalid(format!(
                        "tree {} node {}: split feature {} out of range for {} features",
                        tree_idx, idx, feature, n_features
                    )));
                }
                if threshold.is_nan() {
                    return Err(invalid(format!(
                        "tree {} node {}: threshold is NaN",
                        tree_idx, idx
                    )));
                }
                for child in [*left, *right] {
                    let child = child as usize;
                    if child <= idx || child >= nodes.len() {
                        return Err(invalid(format!(
                            "tree {} node {}: child {} must follow its parent within {} nodes",
                            tree_idx,
                            idx,
                            child,
                            nodes.len()
                        )));
                    }
                }
            }
        }
    }
    Ok(())
}

impl TreeEnsemble {
    /// Validates node links, split features and leaf values.
    ///
    /// # Errors
    /// [`PreprocessingError::InvalidParameter`] describing the first bad node.
    pub fn from_params(params: TreeEnsembleParams) -> Result<Self, PreprocessingError> {
        if params.n_features == 0 {
            return Err(invalid("tree ensemble declares no features".to_string()));
        }
        if params.trees.is_empty() {
            return Err(invalid("tree ensemble has no trees".to_string()));
        }
        if !params.base_score.is_finite() {
            return Err(invalid("base score must be finite".to_string()));
        }
        for (tree_idx, nodes) in params.trees.iter().enumerate() {
            check_tree(tree_idx, nodes, params.n_features)?;
        }
        Ok(Self {
            n_features: params.n_features,
            base_score: params.base_score,
            trees: params.trees,
        })
    }

    pub fn extract_params(&self) -> TreeEnsembleParams {
        TreeEnsembleParams {
            n_features: self.n_features,
            base_score: self.base_score,
            trees: self.trees.clone(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn leaf_value(nodes: &[TreeNode], input: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0usize;
        loop {
            match &nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let x = input.get(*feature as usize).copied().unwrap_or(f64::NAN);
                    let go_left = if x.is_nan() { *default_left } else { x < *threshold };
                    let next = if go_left { *left } else { *right };
                    idx = next as usize;
                }
            }
        }
    }
}

impl InferenceModel for TreeEnsemble {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, input: ArrayView1<'_, f64>) -> f64 {
        self.trees
            .iter()
            .map(|nodes| Self::leaf_value(nodes, input))
            .sum::<f64>()
            + self.base_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn stump(feature: u32, threshold: f64, low: f64, high: f64) -> Vec<TreeNode> {
        vec![
            TreeNode::Split {
                feature,
                threshold,
                left: 1,
                right: 2,
                default_left: true,
            },
            TreeNode::Leaf { value: low },
            TreeNode::Leaf { value: high },
        ]
    }

    fn forest() -> TreeEnsemble {
        TreeEnsemble::from_params(TreeEnsembleParams {
            n_features: 2,
            base_score: 100.0,
            trees: vec![stump(0, 0.5, 10.0, 20.0), stump(1, -1.0, 1.0, 2.0)],
        })
        .unwrap()
    }

    #[test]
    fn test_predict_sums_leaves_and_base() {
        let m = forest();
        assert_eq!(m.predict(array![0.0, 0.0].view()), 100.0 + 10.0 + 2.0);
        assert_eq!(m.predict(array![0.5, -3.0].view()), 100.0 + 20.0 + 1.0);
    }

    #[test]
    fn test_nan_follows_default_direction() {
        assert_eq!(forest().predict(array![f64::NAN, f64::NAN].view()), 111.0);
    }

    #[test]
    fn test_batch_matches_single() {
        let m = forest();
        let x = array![[0.0, 0.0], [1.0, 1.0]];
        assert_eq!(m.predict_batch(x.view()).to_vec(), vec![112.0, 122.0]);
    }

    #[test]
    fn test_rejects_out_of_range_feature() {
        let result = TreeEnsemble::from_params(TreeEnsembleParams {
            n_features: 2,
            base_score: 0.0,
            trees: vec![stump(2, 0.0, 1.0, 2.0)],
        });
        assert!(matches!(result, Err(PreprocessingError::InvalidParameter(_))));
    }

    #[test]
    fn test_rejects_backward_child() {
        let mut nodes = stump(0, 0.0, 1.0, 2.0);
        nodes[0] = TreeNode::Split {
            feature: 0,
            threshold: 0.0,
            left: 0,
            right: 2,
            default_left: false,
        };
        let result = TreeEnsemble::from_params(TreeEnsembleParams {
            n_features: 1,
            base_score: 0.0,
            trees: vec![nodes],
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_empty_forest() {
        let result = TreeEnsemble::from_params(TreeEnsembleParams {
            n_features: 1,
            base_score: 0.0,
            trees: vec![],
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_params_roundtrip() {
        let m = forest();
        assert_eq!(TreeEnsemble::from_params(m.extract_params()).unwrap(), m);
        assert_eq!(m.n_trees(), 2);
    }
}
