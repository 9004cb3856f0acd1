//! Decision Tree Classifier
use super::{
    impurity::gini_gain,
    node::TreeNode,
    params::TreeParams,
};
use crate::{
    data::dataset::{Dataset, Label, RealNumber},
    error::{ForestError, Result},
    metrics::confusion::ClassificationMetrics,
};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, info, instrument};

pub struct SplitData<T: RealNumber> {
    pub feature_index: usize,
    pub threshold: T,
    pub left: Dataset<T>,
    pub right: Dataset<T>,
    information_gain: f64,
}

/// Binary decision tree grown by greedy Gini-gain splits at per-node column means.
///
/// # Examples
///
/// ```
/// use gini_forest::data::dataset::Dataset;
/// use gini_forest::trees::classifier::DecisionTreeClassifier;
/// use nalgebra::{DMatrix, DVector};
///
/// let x = DMatrix::from_row_slice(4, 1, &[1.0, 2.0, 3.0, 4.0]);
/// let y = DVector::from_vec(vec![0, 0, 1, 1]);
/// let dataset = Dataset::new(x, y).unwrap();
///
/// let mut tree = DecisionTreeClassifier::<f64>::new();
/// tree.fit(&dataset).unwrap();
///
/// let predictions = tree.predict(&DMatrix::from_row_slice(2, 1, &[0.5, 3.5])).unwrap();
/// assert_eq!(predictions.as_slice(), &[0, 1]);
/// ```
#[derive(Clone, Debug)]
pub struct DecisionTreeClassifier<T: RealNumber> {
    root: Option<TreeNode<T>>,
    tree_params: TreeParams,
    num_features: Option<usize>,
}

impl<T: RealNumber> Default for DecisionTreeClassifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealNumber> ClassificationMetrics for DecisionTreeClassifier<T> {}

impl<T: RealNumber> DecisionTreeClassifier<T> {
    /// Creates an unfitted tree without a depth limit.
    pub fn new() -> Self {
        Self {
            root: None,
            tree_params: TreeParams::new(),
            num_features: None,
        }
    }

    /// Creates an unfitted tree whose leaves lie at most `max_depth` edges below the root.
    pub fn with_params(max_depth: Option<u16>) -> Self {
        let mut tree = Self::new();
        tree.set_max_depth(max_depth);
        tree
    }

    pub fn set_max_depth(&mut self, max_depth: Option<u16>) {
        self.tree_params.set_max_depth(max_depth)
    }

    pub fn max_depth(&self) -> Option<u16> {
        self.tree_params.max_depth()
    }

    pub fn root(&self) -> Option<&TreeNode<T>> {
        self.root.as_ref()
    }

    /// Depth of the fitted tree, `None` before fitting.
    pub fn depth(&self) -> Option<usize> {
        self.root.as_ref().map(TreeNode::depth)
    }

    /// Builds the tree from a dataset, replacing any previous fit.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::EmptyNode`] when `dataset` has no rows.
    #[instrument(skip_all, fields(n_samples = dataset.nrows(), n_features = dataset.ncols()))]
    pub fn fit(&mut self, dataset: &Dataset<T>) -> Result<()> {
        let root = self.build_tree(dataset, 0)?;
        info!(
            depth = root.depth(),
            leaves = root.leaf_count(),
            "finished building the tree"
        );
        self.root = Some(root);
        self.num_features = Some(dataset.ncols());
        Ok(())
    }

    /// Predicts a label for every row of `features`.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::NotFitted`] before [`fit`](Self::fit), and
    /// [`ForestError::FeatureCountMismatch`] if `features` is not as wide as the training data.
    pub fn predict(&self, features: &DMatrix<T>) -> Result<DVector<Label>> {
        let (root, num_features) = match (&self.root, self.num_features) {
            (Some(root), Some(num_features)) => (root, num_features),
            _ => return Err(ForestError::NotFitted),
        };
        if features.ncols() != num_features {
            return Err(ForestError::FeatureCountMismatch {
                expected: num_features,
                got: features.ncols(),
            });
        }

        let predictions: Vec<_> = features
            .row_iter()
            .map(|row| root.decide(&row.transpose()))
            .collect();

        Ok(DVector::from_vec(predictions))
    }

    /// [`predict`](Self::predict) collected into a plain vector.
    pub fn classify(&self, features: &DMatrix<T>) -> Result<Vec<Label>> {
        Ok(self.predict(features)?.as_slice().to_vec())
    }

    fn build_tree(&self, dataset: &Dataset<T>, current_depth: u16) -> Result<TreeNode<T>> {
        let labels = dataset.labels();
        let first = *labels.first().ok_or(ForestError::EmptyNode {
            depth: current_depth,
        })?;

        if labels.iter().all(|&label| label == first) {
            return Ok(TreeNode::leaf(first));
        }

        // Cut-off leaves take the greatest label present, not the most frequent one.
        let greatest = labels.iter().copied().max().unwrap_or(first);
        if self
            .max_depth()
            .is_some_and(|max_depth| current_depth >= max_depth)
        {
            return Ok(TreeNode::leaf(greatest));
        }

        let best_split = match self.get_best_split(dataset)? {
            Some(split) if split.left.is_not_empty() && split.right.is_not_empty() => split,
            // Every example fell on one side, so no split separates this node.
            _ => return Ok(TreeNode::leaf(greatest)),
        };

        debug!(
            depth = current_depth,
            feature_index = best_split.feature_index,
            threshold = %best_split.threshold,
            gain = best_split.information_gain,
            left = best_split.left.nrows(),
            right = best_split.right.nrows(),
            "split node"
        );

        let left_node = self.build_tree(&best_split.left, current_depth + 1)?;
        let right_node = self.build_tree(&best_split.right, current_depth + 1)?;
        Ok(TreeNode::internal(
            best_split.feature_index,
            best_split.threshold,
            left_node,
            right_node,
        ))
    }

    /// Scores the `x[i] >= mean[i]` split of every feature and keeps the best one.
    ///
    /// Ties keep the lowest feature index. Splits whose gain is undefined are skipped.
    fn get_best_split(&self, dataset: &Dataset<T>) -> Result<Option<SplitData<T>>> {
        let means = dataset.column_means()?;
        let labels = dataset.labels();

        let mut best: Option<(usize, f64)> = None;
        for (feature_index, &mean) in means.iter().enumerate() {
            let mut left_labels = Vec::with_capacity(labels.len());
            let mut right_labels = Vec::with_capacity(labels.len());
            for (value, &label) in dataset.x.column(feature_index).iter().zip(labels) {
                if *value >= mean {
                    left_labels.push(label);
                } else {
                    right_labels.push(label);
                }
            }

            let children = [left_labels.as_slice(), right_labels.as_slice()];
            let Some(gain) = gini_gain(labels, &children) else {
                continue;
            };
            if best.map_or(true, |(_, best_gain)| gain > best_gain) {
                best = Some((feature_index, gain));
            }
        }

        Ok(best.map(|(feature_index, information_gain)| {
            let threshold = means[feature_index];
            let (left, right) = dataset.split_on_threshold(feature_index, threshold);
            SplitData {
                feature_index,
                threshold,
                left,
                right,
                information_gain,
            }
        }))
    }
}
