use crate::error::{ForestError, Result};

/// Hyperparameters of a [`RandomForestClassifier`](super::classifier::RandomForestClassifier).
///
/// | Parameter                  | Default |
/// |----------------------------|---------|
/// | `num_trees`                | 5       |
/// | `max_depth`                | `Some(5)` |
/// | `example_subsample_rate`   | 0.5     |
/// | `attribute_subsample_rate` | 0.5     |
#[derive(Clone, Debug, PartialEq)]
pub struct ForestParams {
    num_trees: usize,
    max_depth: Option<u16>,
    example_subsample_rate: f64,
    attribute_subsample_rate: f64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ForestParams {
    pub fn new() -> Self {
        Self {
            num_trees: 5,
            max_depth: Some(5),
            example_subsample_rate: 0.5,
            attribute_subsample_rate: 0.5,
        }
    }

    pub fn set_num_trees(&mut self, num_trees: usize) -> Result<()> {
        if num_trees < 1 {
            return Err(ForestError::InvalidTreeCount { num_trees });
        }
        self.num_trees = num_trees;
        Ok(())
    }

    pub fn set_max_depth(&mut self, max_depth: Option<u16>) {
        self.max_depth = max_depth;
    }

    /// Fraction of the training rows drawn, with replacement, for each tree.
    pub fn set_example_subsample_rate(&mut self, rate: f64) -> Result<()> {
        self.example_subsample_rate = validate_rate("example_subsample_rate", rate)?;
        Ok(())
    }

    /// Fraction of the feature columns drawn, without replacement, for each tree.
    pub fn set_attribute_subsample_rate(&mut self, rate: f64) -> Result<()> {
        self.attribute_subsample_rate = validate_rate("attribute_subsample_rate", rate)?;
        Ok(())
    }

    pub fn num_trees(&self) -> usize {
        self.num_trees
    }

    pub fn max_depth(&self) -> Option<u16> {
        self.max_depth
    }

    pub fn example_subsample_rate(&self) -> f64 {
        self.example_subsample_rate
    }

    pub fn attribute_subsample_rate(&self) -> f64 {
        self.attribute_subsample_rate
    }

    /// Rows per bootstrap sample: `round(rate * num_samples)`, at least one.
    pub fn sample_size(&self, num_samples: usize) -> usize {
        scaled_count(self.example_subsample_rate, num_samples)
    }

    /// Columns per tree: `round(rate * num_features)`, at least one.
    pub fn attribute_count(&self, num_features: usize) -> usize {
        scaled_count(self.attribute_subsample_rate, num_features).min(num_features)
    }
}

fn validate_rate(name: &'static str, value: f64) -> Result<f64> {
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(ForestError::InvalidSubsampleRate { name, value })
    }
}

fn scaled_count(rate: f64, total: usize) -> usize {
    ((rate * total as f64).round() as usize).max(1)
}
