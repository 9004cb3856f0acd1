//! Random Forest Classifier
use super::params::ForestParams;
use crate::{
    data::dataset::{Dataset, Label, RealNumber},
    error::{ForestError, Result},
    metrics::confusion::ClassificationMetrics,
    trees::classifier::DecisionTreeClassifier,
};
use nalgebra::{DMatrix, DVector};
use rand::{rngs::StdRng, seq::index, Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, instrument};

/// A fitted tree together with the original column index of each feature it was trained on.
#[derive(Clone, Debug)]
pub struct SubspaceTree<T: RealNumber> {
    tree: DecisionTreeClassifier<T>,
    attributes: Vec<usize>,
}

impl<T: RealNumber> SubspaceTree<T> {
    /// `attributes[i]` is the full-width column the tree sees as its feature `i`.
    pub fn new(tree: DecisionTreeClassifier<T>, attributes: Vec<usize>) -> Self {
        Self { tree, attributes }
    }

    pub fn tree(&self) -> &DecisionTreeClassifier<T> {
        &self.tree
    }

    pub fn attributes(&self) -> &[usize] {
        &self.attributes
    }

    /// Predicts on full-width rows by projecting them onto this tree's columns first.
    pub fn predict(&self, features: &DMatrix<T>) -> Result<DVector<Label>> {
        if let Some(&widest) = self.attributes.iter().max() {
            if widest >= features.ncols() {
                return Err(ForestError::FeatureCountMismatch {
                    expected: widest + 1,
                    got: features.ncols(),
                });
            }
        }
        self.tree
            .predict(&features.select_columns(&self.attributes))
    }
}

/// Majority vote over binary labels.
///
/// The label with strictly more votes wins and an exact tie goes to 1. Returns `None` when
/// there are no votes.
pub fn majority_vote(votes: &[Label]) -> Option<Label> {
    if votes.is_empty() {
        return None;
    }
    let ones = votes.iter().filter(|&&vote| vote == 1).count();
    let zeros = votes.len() - ones;
    Some(if zeros > ones { 0 } else { 1 })
}

/// Bagged ensemble of decision trees, each trained on a bootstrap sample of the rows restricted
/// to a random subset of the columns.
///
/// # Examples
///
/// ```
/// use gini_forest::data::dataset::Dataset;
/// use gini_forest::forests::classifier::RandomForestClassifier;
/// use nalgebra::{DMatrix, DVector};
///
/// let x = DMatrix::from_fn(40, 3, |i, j| (i * (j + 1)) as f64);
/// let y = DVector::from_fn(40, |i, _| u8::from(i >= 20));
/// let dataset = Dataset::new(x, y).unwrap();
///
/// let mut forest = RandomForestClassifier::<f64>::new();
/// forest.fit(&dataset, Some(42)).unwrap();
///
/// let predictions = forest.predict(&dataset.x).unwrap();
/// assert_eq!(predictions.len(), 40);
/// ```
#[derive(Clone, Debug)]
pub struct RandomForestClassifier<T: RealNumber> {
    trees: Vec<SubspaceTree<T>>,
    forest_params: ForestParams,
    num_features: Option<usize>,
}

impl<T: RealNumber> Default for RandomForestClassifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealNumber> ClassificationMetrics for RandomForestClassifier<T> {}

impl<T: RealNumber> RandomForestClassifier<T> {
    pub fn new() -> Self {
        Self::with_forest_params(ForestParams::new())
    }

    pub fn with_forest_params(forest_params: ForestParams) -> Self {
        Self {
            trees: Vec::with_capacity(forest_params.num_trees()),
            forest_params,
            num_features: None,
        }
    }

    /// Creates an unfitted forest with custom parameters.
    ///
    /// # Errors
    ///
    /// Fails when `num_trees` is 0 or either rate lies outside `(0, 1]`.
    pub fn with_params(
        num_trees: Option<usize>,
        max_depth: Option<u16>,
        example_subsample_rate: Option<f64>,
        attribute_subsample_rate: Option<f64>,
    ) -> Result<Self> {
        let mut forest_params = ForestParams::new();
        if let Some(num_trees) = num_trees {
            forest_params.set_num_trees(num_trees)?;
        }
        forest_params.set_max_depth(max_depth);
        if let Some(rate) = example_subsample_rate {
            forest_params.set_example_subsample_rate(rate)?;
        }
        if let Some(rate) = attribute_subsample_rate {
            forest_params.set_attribute_subsample_rate(rate)?;
        }
        Ok(Self::with_forest_params(forest_params))
    }

    /// Assembles a forest from already-trained members.
    ///
    /// # Errors
    ///
    /// Fails when `trees` is empty or a member references a column at or beyond `num_features`.
    pub fn from_trees(trees: Vec<SubspaceTree<T>>, num_features: usize) -> Result<Self> {
        if trees.is_empty() {
            return Err(ForestError::InvalidTreeCount { num_trees: 0 });
        }
        if let Some(widest) = trees
            .iter()
            .flat_map(|member| member.attributes.iter().copied())
            .max()
            .filter(|&widest| widest >= num_features)
        {
            return Err(ForestError::FeatureCountMismatch {
                expected: widest + 1,
                got: num_features,
            });
        }

        let mut forest_params = ForestParams::new();
        forest_params.set_num_trees(trees.len())?;
        Ok(Self {
            trees,
            forest_params,
            num_features: Some(num_features),
        })
    }

    pub fn forest_params(&self) -> &ForestParams {
        &self.forest_params
    }

    pub fn trees(&self) -> &[SubspaceTree<T>] {
        &self.trees
    }

    /// Trains `num_trees` members in parallel, replacing any previous fit.
    ///
    /// Every member gets its own generator seeded from a master generator, so a given `seed`
    /// always produces the same forest regardless of thread scheduling. `None` seeds from entropy.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::EmptyDataset`] or [`ForestError::ZeroFeatures`] for degenerate input.
    #[instrument(skip_all, fields(n_trees = self.forest_params.num_trees(), n_samples = dataset.nrows()))]
    pub fn fit(&mut self, dataset: &Dataset<T>, seed: Option<u64>) -> Result<()> {
        let (num_samples, num_features) = (dataset.nrows(), dataset.ncols());
        if num_samples == 0 {
            return Err(ForestError::EmptyDataset);
        }
        if num_features == 0 {
            return Err(ForestError::ZeroFeatures);
        }

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            _ => StdRng::from_entropy(),
        };
        let seeds = (0..self.forest_params.num_trees())
            .map(|_| rng.gen::<u64>())
            .collect::<Vec<_>>();

        let sample_size = self.forest_params.sample_size(num_samples);
        let attribute_count = self.forest_params.attribute_count(num_features);
        let max_depth = self.forest_params.max_depth();
        info!(num_features, sample_size, attribute_count, "training random forest");

        let trees: Result<Vec<_>> = seeds
            .into_par_iter()
            .map(|tree_seed| -> Result<SubspaceTree<T>> {
                let mut tree_rng = StdRng::seed_from_u64(tree_seed);
                let subset = dataset.samples_with_rng(sample_size, &mut tree_rng)?;

                let mut attributes =
                    index::sample(&mut tree_rng, num_features, attribute_count).into_vec();
                attributes.sort_unstable();
                debug!(?attributes, "sampled attribute subset");

                let mut tree = DecisionTreeClassifier::with_params(max_depth);
                tree.fit(&subset.select_columns(&attributes))?;
                Ok(SubspaceTree::new(tree, attributes))
            })
            .collect();

        self.trees = trees?;
        self.num_features = Some(num_features);
        Ok(())
    }

    /// Predicts by majority vote of all members.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::NotFitted`] before fitting and
    /// [`ForestError::FeatureCountMismatch`] if `features` is not as wide as the training data.
    pub fn predict(&self, features: &DMatrix<T>) -> Result<DVector<Label>> {
        let num_features = match self.num_features {
            Some(num_features) if !self.trees.is_empty() => num_features,
            _ => return Err(ForestError::NotFitted),
        };
        if features.ncols() != num_features {
            return Err(ForestError::FeatureCountMismatch {
                expected: num_features,
                got: features.ncols(),
            });
        }

        let tree_predictions = self
            .trees
            .iter()
            .map(|member| member.predict(features))
            .collect::<Result<Vec<_>>>()?;

        let mut votes = Vec::with_capacity(tree_predictions.len());
        let mut predictions = Vec::with_capacity(features.nrows());
        for i in 0..features.nrows() {
            votes.clear();
            votes.extend(tree_predictions.iter().map(|prediction| prediction[i]));
            predictions.push(majority_vote(&votes).ok_or(ForestError::NotFitted)?);
        }
        Ok(DVector::from_vec(predictions))
    }

    /// [`predict`](Self::predict) collected into a plain vector.
    pub fn classify(&self, features: &DMatrix<T>) -> Result<Vec<Label>> {
        Ok(self.predict(features)?.as_slice().to_vec())
    }
}
