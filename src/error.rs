//! Crate-wide error type.

use std::num::ParseFloatError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ForestError>;

/// Errors from dataset handling, tree induction, ensembles and scoring.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Induction reached a node with no examples.
    #[error("invalid training state: empty label set at depth {depth}")]
    EmptyNode {
        /// Depth of the offending node.
        depth: u16,
    },

    #[error("dataset has zero samples")]
    EmptyDataset,

    #[error("dataset has zero feature columns")]
    ZeroFeatures,

    /// Feature rows and labels are not index-aligned.
    #[error("{features} feature rows but {labels} labels")]
    LengthMismatch { features: usize, labels: usize },

    #[error("label {value} at index {index} is not 0 or 1")]
    NonBinaryLabel { index: usize, value: f64 },

    /// Prediction input is narrower or wider than the training data.
    #[error("input has {got} features, expected {expected}")]
    FeatureCountMismatch { expected: usize, got: usize },

    #[error("model has not been fitted")]
    NotFitted,

    #[error("num_trees must be at least 1, got {num_trees}")]
    InvalidTreeCount { num_trees: usize },

    #[error("{name} must be in (0.0, 1.0], got {value}")]
    InvalidSubsampleRate { name: &'static str, value: f64 },

    #[error("fold count must be in [2, {num_samples}], got {k}")]
    InvalidFoldCount { k: usize, num_samples: usize },

    #[error("train size must be in [0.0, 1.0], got {train_size}")]
    InvalidTrainSize { train_size: f64 },

    #[error("{predictions} predictions but {labels} true labels")]
    PredictionLengthMismatch { predictions: usize, labels: usize },

    /// A scoring denominator was zero.
    #[error("{metric} is undefined for these predictions")]
    UndefinedMetric { metric: &'static str },

    #[error("couldn't represent {value} in the feature type")]
    NumericConversion { value: usize },

    #[error("CSV input contains no rows")]
    EmptyCsv,

    #[error("CSV row {row} has {got} fields, expected {expected}")]
    RaggedCsv {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("CSV row {row}, column {column}: {source}")]
    ParseFloat {
        row: usize,
        column: usize,
        #[source]
        source: ParseFloatError,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
