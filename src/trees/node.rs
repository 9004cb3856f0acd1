use crate::data::dataset::{Label, RealNumber};
use nalgebra::DVector;

/// Decision tree node
///
/// An internal node routes an example to `left` when
/// `example[feature_index] >= threshold` and to `right` otherwise.
#[derive(Clone, Debug, PartialEq)]
pub enum TreeNode<T: RealNumber> {
    Leaf {
        label: Label,
    },
    Internal {
        feature_index: usize,
        threshold: T,
        left: Box<TreeNode<T>>,
        right: Box<TreeNode<T>>,
    },
}

impl<T: RealNumber> TreeNode<T> {
    pub fn leaf(label: Label) -> Self {
        Self::Leaf { label }
    }

    pub fn internal(feature_index: usize, threshold: T, left: Self, right: Self) -> Self {
        Self::Internal {
            feature_index,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Walks from this node down to a leaf and returns its label.
    ///
    /// `example` must be at least `feature_index + 1` wide for every internal node on the path.
    pub fn decide(&self, example: &DVector<T>) -> Label {
        let mut node = self;
        loop {
            match node {
                Self::Leaf { label } => return *label,
                Self::Internal {
                    feature_index,
                    threshold,
                    left,
                    right,
                } => {
                    node = if example[*feature_index] >= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Length of the longest root-to-leaf path below this node. A leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}
