//! Loading numeric CSV files into a [`Dataset`].

use crate::data::dataset::{Dataset, Label};
use crate::error::{ForestError, Result};
use csv::ReaderBuilder;
use nalgebra::{DMatrix, DVector};
use std::io::Read;
use std::path::Path;
use tracing::{debug, instrument};

/// Which CSV column holds the class label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LabelColumn {
    First,
    #[default]
    Last,
}

/// Reads a headerless or headed CSV file of numbers into a dataset.
///
/// Every field must parse as `f64`. The label column must contain only `0` and `1`.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_csv<P: AsRef<Path>>(
    path: P,
    label_column: LabelColumn,
    has_headers: bool,
) -> Result<Dataset<f64>> {
    let reader = ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .from_path(path)?;
    read_records(reader, label_column)
}

/// Same as [`load_csv`] over any reader.
pub fn load_csv_from_reader<R: Read>(
    input: R,
    label_column: LabelColumn,
    has_headers: bool,
) -> Result<Dataset<f64>> {
    let reader = ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .from_reader(input);
    read_records(reader, label_column)
}

fn read_records<R: Read>(
    mut reader: csv::Reader<R>,
    label_column: LabelColumn,
) -> Result<Dataset<f64>> {
    let mut features = Vec::new();
    let mut labels = Vec::new();
    let mut width: Option<usize> = None;

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let expected = *width.get_or_insert(record.len());
        if record.len() != expected || expected < 2 {
            return Err(ForestError::RaggedCsv {
                row,
                expected: expected.max(2),
                got: record.len(),
            });
        }

        let values = record
            .iter()
            .enumerate()
            .map(|(column, field)| {
                field
                    .trim()
                    .parse::<f64>()
                    .map_err(|source| ForestError::ParseFloat {
                        row,
                        column,
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let (label, feature_row) = match label_column {
            LabelColumn::First => (values[0], &values[1..]),
            LabelColumn::Last => (values[expected - 1], &values[..expected - 1]),
        };
        labels.push(to_label(label, labels.len())?);
        features.extend_from_slice(feature_row);
    }

    let width = width.ok_or(ForestError::EmptyCsv)?;
    let nrows = labels.len();
    debug!(nrows, ncols = width - 1, "parsed csv records");

    Dataset::new(
        DMatrix::from_row_slice(nrows, width - 1, &features),
        DVector::from_vec(labels),
    )
}

fn to_label(value: f64, index: usize) -> Result<Label> {
    if value == 0.0 {
        Ok(0)
    } else if value == 1.0 {
        Ok(1)
    } else {
        Err(ForestError::NonBinaryLabel { index, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_label_last() {
        let input = "1.0,2.0,0\n3.0,4.0,1\n5.5,6.5,1\n";
        let dataset = load_csv_from_reader(input.as_bytes(), LabelColumn::Last, false).unwrap();

        assert_eq!(dataset.x.shape(), (3, 2));
        assert_eq!(dataset.x[(2, 0)], 5.5);
        assert_eq!(dataset.labels(), &[0, 1, 1]);
    }

    #[test]
    fn test_load_label_first_with_header() {
        let input = "class,a,b\n1,0.5,0.25\n0,0.75,1.0\n";
        let dataset = load_csv_from_reader(input.as_bytes(), LabelColumn::First, true).unwrap();

        assert_eq!(dataset.x.shape(), (2, 2));
        assert_eq!(dataset.x[(0, 1)], 0.25);
        assert_eq!(dataset.labels(), &[1, 0]);
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let input = "1,2,0\n\n3,4,1\n";
        let dataset = load_csv_from_reader(input.as_bytes(), LabelColumn::Last, false).unwrap();
        assert_eq!(dataset.nrows(), 2);
    }

    #[test]
    fn test_load_non_binary_label() {
        let input = "1,2,0\n3,4,2\n";
        let result = load_csv_from_reader(input.as_bytes(), LabelColumn::Last, false);
        assert!(matches!(
            result,
            Err(ForestError::NonBinaryLabel { index: 1, .. })
        ));
    }

    #[test]
    fn test_load_ragged_rows() {
        let input = "1,2,0\n3,1\n";
        let result = load_csv_from_reader(input.as_bytes(), LabelColumn::Last, false);
        assert!(matches!(
            result,
            Err(ForestError::RaggedCsv {
                row: 1,
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn test_load_unparsable_field() {
        let input = "1,abc,0\n";
        let result = load_csv_from_reader(input.as_bytes(), LabelColumn::Last, false);
        assert!(matches!(
            result,
            Err(ForestError::ParseFloat { row: 0, column: 1, .. })
        ));
    }

    #[test]
    fn test_load_empty_input() {
        let result = load_csv_from_reader("".as_bytes(), LabelColumn::Last, false);
        assert!(matches!(result, Err(ForestError::EmptyCsv)));
    }
}
