/// Decision tree classifier and its induction
pub mod classifier;
/// Gini impurity and gain
pub mod impurity;
/// Tree nodes and traversal
pub mod node;
/// Tree hyperparameters
pub mod params;
