use nalgebra::{DMatrix, DVector};

use crate::{
    data::dataset::Label,
    error::{ForestError, Result},
};

/// Counts of a binary classifier's outcomes, with 1 as the positive class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BinaryConfusion {
    pub true_positive: usize,
    pub false_negative: usize,
    pub false_positive: usize,
    pub true_negative: usize,
}

impl BinaryConfusion {
    /// Tallies predictions against the true labels.
    ///
    /// # Errors
    ///
    /// Fails when the two sequences differ in length or contain a label other than 0 or 1.
    pub fn from_labels(y_true: &[Label], y_pred: &[Label]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(ForestError::PredictionLengthMismatch {
                predictions: y_pred.len(),
                labels: y_true.len(),
            });
        }

        let mut confusion = Self::default();
        for (index, (&truth, &prediction)) in y_true.iter().zip(y_pred).enumerate() {
            match (truth, prediction) {
                (1, 1) => confusion.true_positive += 1,
                (1, 0) => confusion.false_negative += 1,
                (0, 1) => confusion.false_positive += 1,
                (0, 0) => confusion.true_negative += 1,
                (truth, prediction) => {
                    return Err(ForestError::NonBinaryLabel {
                        index,
                        value: f64::from(truth.max(prediction)),
                    })
                }
            }
        }
        Ok(confusion)
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_negative + self.false_positive + self.true_negative
    }

    /// The counts laid out as `[[tp, fn], [fp, tn]]`.
    pub fn as_matrix(&self) -> DMatrix<usize> {
        DMatrix::from_row_slice(
            2,
            2,
            &[
                self.true_positive,
                self.false_negative,
                self.false_positive,
                self.true_negative,
            ],
        )
    }

    /// `(tp + tn) / total`, undefined for an empty tally.
    pub fn accuracy(&self) -> Result<f64> {
        ratio(
            self.true_positive + self.true_negative,
            self.total(),
            "accuracy",
        )
    }

    /// `tp / (tp + fp)`, undefined when nothing was predicted positive.
    pub fn precision(&self) -> Result<f64> {
        ratio(
            self.true_positive,
            self.true_positive + self.false_positive,
            "precision",
        )
    }

    /// `tp / (tp + fn)`, undefined when there are no positive labels.
    pub fn recall(&self) -> Result<f64> {
        ratio(
            self.true_positive,
            self.true_positive + self.false_negative,
            "recall",
        )
    }

    pub fn f1_score(&self) -> Result<f64> {
        let precision = self.precision()?;
        let recall = self.recall()?;

        match (precision + recall).abs() < f64::EPSILON {
            true => Err(ForestError::UndefinedMetric { metric: "f1 score" }),
            false => Ok(2.0 * (precision * recall) / (precision + recall)),
        }
    }
}

fn ratio(numerator: usize, denominator: usize, metric: &'static str) -> Result<f64> {
    if denominator == 0 {
        return Err(ForestError::UndefinedMetric { metric });
    }
    Ok(numerator as f64 / denominator as f64)
}

/// Scoring helpers for binary classifiers.
pub trait ClassificationMetrics {
    /// Computes the confusion counts based on the true labels and predicted labels.
    ///
    /// # Arguments
    ///
    /// * `y_true` - The true labels.
    /// * `y_pred` - The predicted labels.
    fn confusion_matrix(
        &self,
        y_true: &DVector<Label>,
        y_pred: &DVector<Label>,
    ) -> Result<BinaryConfusion> {
        BinaryConfusion::from_labels(y_true.as_slice(), y_pred.as_slice())
    }

    fn accuracy(&self, y_true: &DVector<Label>, y_pred: &DVector<Label>) -> Result<f64> {
        self.confusion_matrix(y_true, y_pred)?.accuracy()
    }

    fn precision(&self, y_true: &DVector<Label>, y_pred: &DVector<Label>) -> Result<f64> {
        self.confusion_matrix(y_true, y_pred)?.precision()
    }

    fn recall(&self, y_true: &DVector<Label>, y_pred: &DVector<Label>) -> Result<f64> {
        self.confusion_matrix(y_true, y_pred)?.recall()
    }

    fn f1_score(&self, y_true: &DVector<Label>, y_pred: &DVector<Label>) -> Result<f64> {
        self.confusion_matrix(y_true, y_pred)?.f1_score()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    struct MockClassifier;

    impl ClassificationMetrics for MockClassifier {}

    fn labels(values: &[Label]) -> DVector<Label> {
        DVector::from_row_slice(values)
    }

    #[test]
    fn test_confusion_matrix() {
        let classifier = MockClassifier;

        let y_true = labels(&[1, 0, 1, 0, 1]);
        let y_pred = labels(&[1, 1, 0, 0, 1]);

        let result = classifier.confusion_matrix(&y_true, &y_pred).unwrap();

        assert_eq!(
            result,
            BinaryConfusion {
                true_positive: 2,
                false_negative: 1,
                false_positive: 1,
                true_negative: 1,
            }
        );
        let expected = DMatrix::from_row_slice(2, 2, &[2, 1, 1, 1]);
        assert_eq!(result.as_matrix(), expected);
    }

    #[test]
    fn test_confusion_matrix_unequal() {
        let classifier = MockClassifier;

        let y_true = labels(&[1, 0, 1, 0, 1, 0]);
        let y_pred = labels(&[1, 1, 0, 0, 1]);

        let result = classifier.confusion_matrix(&y_true, &y_pred);

        assert!(matches!(
            result,
            Err(ForestError::PredictionLengthMismatch {
                predictions: 5,
                labels: 6
            })
        ));
    }

    #[test]
    fn test_confusion_matrix_rejects_other_labels() {
        let result = BinaryConfusion::from_labels(&[0, 1], &[0, 2]);
        assert!(matches!(
            result,
            Err(ForestError::NonBinaryLabel { index: 1, .. })
        ));
    }

    #[test]
    fn test_accuracy() {
        let classifier = MockClassifier;

        let y_true = labels(&[1, 0, 1, 0, 1]);
        let y_pred = labels(&[1, 1, 0, 0, 1]);

        let result = classifier.accuracy(&y_true, &y_pred).unwrap();

        assert_eq!(result, 0.6);
    }

    #[test]
    fn test_perfect_classification() {
        let classifier = MockClassifier;

        let y_true = labels(&[1, 0, 1, 0, 1]);
        let y_pred = y_true.clone();

        assert_eq!(classifier.accuracy(&y_true, &y_pred).unwrap(), 1.0);
        assert_eq!(classifier.precision(&y_true, &y_pred).unwrap(), 1.0);
        assert_eq!(classifier.recall(&y_true, &y_pred).unwrap(), 1.0);
        assert_eq!(classifier.f1_score(&y_true, &y_pred).unwrap(), 1.0);
    }

    #[test]
    fn test_accuracy_empty() {
        let result = BinaryConfusion::from_labels(&[], &[]).unwrap().accuracy();
        assert!(matches!(
            result,
            Err(ForestError::UndefinedMetric {
                metric: "accuracy"
            })
        ));
    }

    #[test]
    fn test_precision() {
        let classifier = MockClassifier;

        let y_true = labels(&[1, 0, 1, 0, 1]);
        let y_pred = labels(&[1, 1, 0, 0, 1]);

        let result = classifier.precision(&y_true, &y_pred).unwrap();

        assert_eq!(result, 2.0 / 3.0);
    }

    #[test]
    fn test_precision_no_positive_predictions() {
        let classifier = MockClassifier;

        let y_true = labels(&[1, 1, 1, 1, 1]);
        let y_pred = labels(&[0, 0, 0, 0, 0]);

        let result = classifier.precision(&y_true, &y_pred);

        assert!(matches!(
            result,
            Err(ForestError::UndefinedMetric {
                metric: "precision"
            })
        ));
    }

    #[test]
    fn test_recall() {
        let classifier = MockClassifier;

        let y_true = labels(&[1, 0, 1, 0, 1]);
        let y_pred = labels(&[1, 1, 0, 0, 1]);

        let result = classifier.recall(&y_true, &y_pred).unwrap();

        assert_eq!(result, 2.0 / 3.0);
    }

    #[test]
    fn test_recall_no_positive_labels() {
        let classifier = MockClassifier;

        let y_true = labels(&[0, 0, 0]);
        let y_pred = labels(&[1, 0, 0]);

        let result = classifier.recall(&y_true, &y_pred);

        assert!(matches!(
            result,
            Err(ForestError::UndefinedMetric { metric: "recall" })
        ));
    }

    #[test]
    fn test_recall_no_true_positives() {
        let classifier = MockClassifier;

        let y_true = labels(&[1, 1, 1, 1, 1]);
        let y_pred = labels(&[0, 0, 0, 0, 0]);

        let result = classifier.recall(&y_true, &y_pred).unwrap();

        assert_eq!(result, 0.0);
    }

    #[test]
    fn test_f1_score() {
        let classifier = MockClassifier;

        let y_true = labels(&[1, 0, 1, 0, 1]);
        let y_pred = labels(&[1, 1, 0, 0, 1]);

        let result = classifier.f1_score(&y_true, &y_pred).unwrap();

        assert!((result - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_f1_score_error() {
        let classifier = MockClassifier;

        let y_true = labels(&[1, 1, 0, 0]);
        let y_pred = labels(&[0, 0, 1, 1]);

        let result = classifier.f1_score(&y_true, &y_pred);

        assert!(matches!(
            result,
            Err(ForestError::UndefinedMetric { metric: "f1 score" })
        ));
    }
}
