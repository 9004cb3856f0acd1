use crate::error::{ForestError, Result};
use nalgebra::{DMatrix, DVector};
use num_traits::{Float, FromPrimitive, Num, ToPrimitive};
use rand::seq::SliceRandom;
use rand::Rng;
use rand::{rngs::StdRng, SeedableRng};
use std::cmp::PartialOrd;
use std::fmt::{self, Display};
use std::fmt::{Debug, Formatter};
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

pub trait DataValue:
    Debug
    + Clone
    + Copy
    + Num
    + FromPrimitive
    + ToPrimitive
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Send
    + Sync
    + Display
    + 'static
{
}

impl<T> DataValue for T where
    T: Debug
        + Clone
        + Copy
        + Num
        + FromPrimitive
        + ToPrimitive
        + AddAssign
        + SubAssign
        + MulAssign
        + DivAssign
        + Send
        + Sync
        + Display
        + 'static
{
}

pub trait Number: DataValue + PartialOrd {}
impl<T> Number for T where T: DataValue + PartialOrd {}

pub trait RealNumber: Number + Float {}
impl<T> RealNumber for T where T: Number + Float {}

/// Binary class label, always 0 or 1.
pub type Label = u8;

/// Feature matrix with an index-aligned vector of binary labels.
///
/// Row `i` of `x` is the example whose class is `y[i]`.
#[derive(Clone)]
pub struct Dataset<T: RealNumber> {
    pub x: DMatrix<T>,
    pub y: DVector<Label>,
}

impl<T: RealNumber> Debug for Dataset<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset {{\n    x: [\n")?;

        for i in 0..self.x.nrows() {
            write!(f, "        [")?;
            for j in 0..self.x.ncols() {
                write!(f, "{:?}, ", self.x[(i, j)])?;
            }
            writeln!(f, "],")?;
        }

        write!(f, "    ],\n    y: [")?;
        for i in 0..self.y.len() {
            write!(f, "{:?}, ", self.y[i])?;
        }
        write!(f, "]\n}}")
    }
}

impl<T: RealNumber> Dataset<T> {
    /// Creates a dataset, checking row/label alignment and that every label is 0 or 1.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::LengthMismatch`] when the row count differs from the label count,
    /// and [`ForestError::NonBinaryLabel`] for any label other than 0 or 1.
    pub fn new(x: DMatrix<T>, y: DVector<Label>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(ForestError::LengthMismatch {
                features: x.nrows(),
                labels: y.len(),
            });
        }
        if let Some((index, &value)) = y.iter().enumerate().find(|&(_, &label)| label > 1) {
            return Err(ForestError::NonBinaryLabel {
                index,
                value: f64::from(value),
            });
        }
        Ok(Self { x, y })
    }

    // Subsets of a validated dataset stay valid.
    fn from_parts(x: DMatrix<T>, y: DVector<Label>) -> Self {
        Self { x, y }
    }

    pub fn into_parts(&self) -> (&DMatrix<T>, &DVector<Label>) {
        (&self.x, &self.y)
    }

    pub fn is_not_empty(&self) -> bool {
        !(self.x.is_empty() || self.y.is_empty())
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.x.ncols()
    }

    /// Labels as a contiguous slice.
    pub fn labels(&self) -> &[Label] {
        self.y.as_slice()
    }

    /// Arithmetic mean of every feature column.
    ///
    /// An empty dataset has no meaningful means; its columns come back as NaN.
    pub fn column_means(&self) -> Result<Vec<T>> {
        let nrows = self.x.nrows();
        let denominator =
            T::from_usize(nrows).ok_or(ForestError::NumericConversion { value: nrows })?;

        Ok(self
            .x
            .column_iter()
            .map(|col| col.iter().fold(T::zero(), |acc, &val| acc + val) / denominator)
            .collect())
    }

    /// Partitions rows on `x[feature_index] >= threshold`.
    ///
    /// Rows satisfying the predicate go to the first (left) dataset, the rest to the second.
    /// Either side may be empty.
    pub fn split_on_threshold(&self, feature_index: usize, threshold: T) -> (Self, Self) {
        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = (0..self.x.nrows())
            .partition(|&index| self.x[(index, feature_index)] >= threshold);

        (
            self.select_rows(&left_indices),
            self.select_rows(&right_indices),
        )
    }

    /// Copies the given rows, in order and with repeats, into a new dataset.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self::from_parts(self.x.select_rows(indices), self.y.select_rows(indices))
    }

    /// Restricts the dataset to the given feature columns, keeping every row.
    pub fn select_columns(&self, indices: &[usize]) -> Self {
        Self::from_parts(self.x.select_columns(indices), self.y.clone())
    }

    pub fn train_test_split(&self, train_size: f64, seed: Option<u64>) -> Result<(Self, Self)> {
        if !(0.0..=1.0).contains(&train_size) {
            return Err(ForestError::InvalidTrainSize { train_size });
        }
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut indices = (0..self.x.nrows()).collect::<Vec<_>>();
        indices.shuffle(&mut rng);
        let train_size = (self.x.nrows() as f64 * train_size).floor() as usize;

        Ok((
            self.select_rows(&indices[..train_size]),
            self.select_rows(&indices[train_size..]),
        ))
    }

    /// Shuffles the rows once and cuts them into `k` folds.
    ///
    /// Returns `k` pairs of `(train, test)`. Every test set holds `nrows / k` rows except the
    /// last, which also absorbs the remainder; test sets are pairwise disjoint and together
    /// cover the whole dataset.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidFoldCount`] unless `2 <= k <= nrows`.
    pub fn k_folds(&self, k: usize, seed: Option<u64>) -> Result<Vec<(Self, Self)>> {
        let nrows = self.x.nrows();
        if k < 2 || k > nrows {
            return Err(ForestError::InvalidFoldCount {
                k,
                num_samples: nrows,
            });
        }
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut indices = (0..nrows).collect::<Vec<_>>();
        indices.shuffle(&mut rng);
        let fold_size = nrows / k;

        Ok((0..k)
            .map(|fold| {
                let start = fold * fold_size;
                let end = if fold == k - 1 { nrows } else { start + fold_size };
                let train_indices = indices[..start]
                    .iter()
                    .chain(&indices[end..])
                    .copied()
                    .collect::<Vec<_>>();
                (
                    self.select_rows(&train_indices),
                    self.select_rows(&indices[start..end]),
                )
            })
            .collect())
    }

    /// Draws `sample_size` rows uniformly with replacement.
    pub fn samples(&self, sample_size: usize, seed: Option<u64>) -> Result<Self> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.samples_with_rng(sample_size, &mut rng)
    }

    /// Same as [`Dataset::samples`], drawing from a caller-supplied generator.
    pub fn samples_with_rng<R: Rng>(&self, sample_size: usize, rng: &mut R) -> Result<Self> {
        let nrows = self.x.nrows();
        if nrows == 0 {
            return Err(ForestError::EmptyDataset);
        }
        let sample_indices = (0..sample_size)
            .map(|_| rng.gen_range(0..nrows))
            .collect::<Vec<_>>();

        Ok(self.select_rows(&sample_indices))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn four_rows() -> Dataset<f64> {
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let y = DVector::from_vec(vec![0, 0, 1, 1]);
        Dataset::new(x, y).unwrap()
    }

    #[test]
    fn test_dataset_new() {
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let y = DVector::from_vec(vec![0, 1]);
        let dataset = Dataset::new(x.clone(), y.clone()).unwrap();
        assert_eq!(dataset.x, x);
        assert_eq!(dataset.y, y);
    }

    #[test]
    fn test_dataset_new_length_mismatch() {
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let y = DVector::from_vec(vec![0, 1, 1]);
        let result = Dataset::new(x, y);
        assert!(matches!(
            result,
            Err(ForestError::LengthMismatch {
                features: 2,
                labels: 3
            })
        ));
    }

    #[test]
    fn test_dataset_new_non_binary_label() {
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let y = DVector::from_vec(vec![1, 2]);
        let result = Dataset::new(x, y);
        assert!(matches!(
            result,
            Err(ForestError::NonBinaryLabel { index: 1, .. })
        ));
    }

    #[test]
    fn test_dataset_into_parts() {
        let dataset = four_rows();
        let (x_parts, y_parts) = dataset.into_parts();
        assert_eq!(x_parts.shape(), (4, 2));
        assert_eq!(y_parts.as_slice(), &[0, 0, 1, 1]);
    }

    #[test]
    fn test_dataset_formatting() {
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let y = DVector::from_vec(vec![0, 1]);
        let dataset = Dataset::new(x, y).unwrap();

        let expected_str = "\
Dataset {
    x: [
        [1.0, 2.0, ],
        [3.0, 4.0, ],
    ],
    y: [0, 1, ]
}";

        assert_eq!(format!("{:?}", dataset), expected_str);
    }

    #[test]
    fn test_dataset_is_not_empty() {
        assert!(four_rows().is_not_empty());

        let empty_x = DMatrix::<f64>::from_row_slice(0, 2, &[]);
        let empty_y = DVector::<Label>::from_vec(vec![]);
        let empty_dataset = Dataset::new(empty_x, empty_y).unwrap();
        assert!(!empty_dataset.is_not_empty());
    }

    #[test]
    fn test_dataset_column_means() {
        let means = four_rows().column_means().unwrap();
        assert_relative_eq!(means[0], 4.0);
        assert_relative_eq!(means[1], 5.0);
    }

    #[test]
    fn test_dataset_split_on_threshold() {
        let (left, right) = four_rows().split_on_threshold(0, 4.0);
        assert_eq!(left.nrows(), 2);
        assert_eq!(right.nrows(), 2);
        assert_eq!(left.labels(), &[1, 1]);
        assert_eq!(right.labels(), &[0, 0]);
    }

    #[test]
    fn test_dataset_split_on_threshold_is_inclusive_left() {
        let (left, right) = four_rows().split_on_threshold(0, 5.0);
        assert_eq!(left.nrows(), 2);
        assert_eq!(left.x[(0, 0)], 5.0);
        assert_eq!(right.nrows(), 2);
    }

    #[test]
    fn test_dataset_split_on_threshold_right_empty() {
        let (left, right) = four_rows().split_on_threshold(0, -1.0);
        assert_eq!(left.nrows(), 4);
        assert_eq!(right.nrows(), 0);
        assert_eq!(right.ncols(), 2);
    }

    #[test]
    fn test_dataset_split_on_threshold_left_empty() {
        let (left, right) = four_rows().split_on_threshold(0, 9.0);
        assert_eq!(left.nrows(), 0);
        assert_eq!(right.nrows(), 4);
    }

    #[test]
    fn test_dataset_select_columns() {
        let projected = four_rows().select_columns(&[1]);
        assert_eq!(projected.x.shape(), (4, 1));
        assert_eq!(projected.x[(2, 0)], 6.0);
        assert_eq!(projected.labels(), &[0, 0, 1, 1]);
    }

    #[test]
    fn test_dataset_train_test_split() {
        let (train_dataset, test_dataset) = four_rows().train_test_split(0.75, None).unwrap();
        assert_eq!(train_dataset.x.nrows(), 3);
        assert_eq!(test_dataset.x.nrows(), 1);
    }

    #[test]
    fn test_dataset_train_test_split_invalid_size() {
        assert!(four_rows().train_test_split(1.5, None).is_err());
    }

    #[test]
    fn test_dataset_k_folds_cover_all_rows() {
        let x = DMatrix::from_fn(10, 1, |i, _| i as f64);
        let y = DVector::from_fn(10, |i, _| (i % 2) as Label);
        let dataset = Dataset::new(x, y).unwrap();

        let folds = dataset.k_folds(3, Some(7)).unwrap();
        assert_eq!(folds.len(), 3);

        let mut seen = Vec::new();
        for (train, test) in &folds {
            assert_eq!(train.nrows() + test.nrows(), 10);
            seen.extend(test.x.iter().copied());
        }
        assert_eq!(folds[0].1.nrows(), 3);
        assert_eq!(folds[2].1.nrows(), 4);

        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(seen, (0..10).map(|i| i as f64).collect::<Vec<_>>());
    }

    #[test]
    fn test_dataset_k_folds_invalid() {
        assert!(matches!(
            four_rows().k_folds(1, None),
            Err(ForestError::InvalidFoldCount { k: 1, .. })
        ));
        assert!(four_rows().k_folds(5, None).is_err());
    }

    #[test]
    fn test_dataset_samples() {
        let sampled_dataset = four_rows().samples(2, None).unwrap();
        assert_eq!(sampled_dataset.x.nrows(), 2);
    }

    #[test]
    fn test_dataset_samples_with_seed_is_reproducible() {
        let first = four_rows().samples(6, Some(1000)).unwrap();
        let second = four_rows().samples(6, Some(1000)).unwrap();
        assert_eq!(first.x, second.x);
        assert_eq!(first.y, second.y);
    }

    #[test]
    fn test_dataset_samples_from_empty() {
        let empty = Dataset::<f64>::new(DMatrix::zeros(0, 2), DVector::zeros(0)).unwrap();
        assert!(matches!(
            empty.samples(3, Some(1)),
            Err(ForestError::EmptyDataset)
        ));
    }
}
