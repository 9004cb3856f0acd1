//! # Gini-forest
//!
//! `gini-forest` trains binary classifiers: decision trees grown by greedy Gini-gain splits, and
//! random forests that bag such trees over bootstrap samples and random attribute subsets.
//! It also contains CSV loading, k-fold splitting and confusion-matrix scoring helpers.
//!
//! ## Getting Started
//!
//! To use `gini-forest`, add the following to your `Cargo.toml` file:
//!
//! ```toml
//! [dependencies]
//! gini-forest = "*"
//! ```
//!
//! ## Example Usage
//!
//! As a quick example, here's how you can train a random forest and score it on an example
//! dataset:
//!
//! ```rust
//! use gini_forest::data::dataset::Dataset;
//! use gini_forest::forests::classifier::RandomForestClassifier;
//! use gini_forest::metrics::confusion::ClassificationMetrics;
//! use nalgebra::{DMatrix, DVector};
//!
//! let x = DMatrix::from_row_slice(6, 2, &[1.0, 9.0, 2.0, 8.0, 3.0, 7.0, 7.0, 3.0, 8.0, 2.0, 9.0, 1.0]);
//! let y = DVector::from_vec(vec![0, 0, 0, 1, 1, 1]);
//! let dataset = Dataset::new(x, y).unwrap();
//!
//! let mut forest = RandomForestClassifier::with_params(Some(15), Some(3), Some(1.0), Some(1.0)).unwrap();
//! forest.fit(&dataset, Some(42)).unwrap();
//!
//! let predictions = forest.predict(&dataset.x).unwrap();
//! let accuracy = forest.accuracy(&dataset.y, &predictions).unwrap();
//! assert!((0.0..=1.0).contains(&accuracy));
//! ```

/// Dataset and data loading utilities
pub mod data;
/// Crate-wide error type
pub mod error;
/// Random Forests
pub mod forests;
/// Functions for evaluating model performance
pub mod metrics;
/// Decision trees
pub mod trees;

pub use error::{ForestError, Result};
