//! Gini impurity and Gini gain over binary label sets.

use crate::data::dataset::Label;

/// Gini impurity `1 - (p1^2 + p0^2)` of a binary label set.
///
/// The empty set has impurity 0.
pub fn gini_impurity(labels: &[Label]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let p_one = labels.iter().filter(|&&label| label == 1).count() as f64 / labels.len() as f64;
    let p_zero = 1.0 - p_one;
    1.0 - (p_one * p_one + p_zero * p_zero)
}

/// Impurity of `parent` minus the size-weighted impurity of `children`.
///
/// Returns `None` when the children hold no labels at all, since the weights are then
/// undefined.
pub fn gini_gain(parent: &[Label], children: &[&[Label]]) -> Option<f64> {
    let total = children.iter().map(|child| child.len()).sum::<usize>();
    if total == 0 {
        return None;
    }
    let weighted = children
        .iter()
        .map(|child| gini_impurity(child) * child.len() as f64)
        .sum::<f64>();

    Some(gini_impurity(parent) - weighted / total as f64)
}
