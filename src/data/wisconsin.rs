//! Parser for the raw UCI Breast Cancer Wisconsin (Original) file
//!
//! Each line holds eleven comma separated values:
//! `id, 9 cytology features (integers 1..=10), class` where class `2` is
//! benign and `4` is malignant. Missing values are written as `?`; such rows
//! are dropped. The id column is discarded.

use crate::core::{Dataset, Result, SVMError, Sample, BENIGN, MALIGNANT};
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Names of the nine feature columns, in file order
pub const FEATURE_NAMES: [&str; 9] = [
    "clump_thickness",
    "uniformity_of_cell_size",
    "uniformity_of_cell_shape",
    "marginal_adhesion",
    "single_epithelial_cell_size",
    "bare_nuclei",
    "bland_chromatin",
    "normal_nucleoli",
    "mitoses",
];

/// Header row used when exporting cleaned samples
pub const CSV_HEADER: [&str; 10] = [
    "clump_thickness",
    "uniformity_of_cell_size",
    "uniformity_of_cell_shape",
    "marginal_adhesion",
    "single_epithelial_cell_size",
    "bare_nuclei",
    "bland_chromatin",
    "normal_nucleoli",
    "mitoses",
    "class",
];

const N_COLUMNS: usize = 11;
const MISSING: &str = "?";
const BENIGN_CODE: &str = "2";
const MALIGNANT_CODE: &str = "4";
const FEATURE_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// Cleaned Wisconsin dataset
#[derive(Debug, Clone)]
pub struct WisconsinDataset {
    samples: Vec<Sample>,
    dropped_rows: usize,
}

impl WisconsinDataset {
    /// Load and clean the raw data file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let dataset = Self::from_reader(BufReader::new(file))?;
        info!(
            "Loaded {} rows from {} ({} dropped for missing values)",
            dataset.len(),
            path.display(),
            dataset.dropped_rows()
        );
        Ok(dataset)
    }

    /// Parse raw rows from any reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut samples = Vec::new();
        let mut dropped_rows = 0;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match Self::parse_row(line, line_num + 1)? {
                Some(sample) => samples.push(sample),
                None => {
                    debug!("Dropping line {} with missing values", line_num + 1);
                    dropped_rows += 1;
                }
            }
        }

        if samples.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        Ok(Self {
            samples,
            dropped_rows,
        })
    }

    /// Number of rows removed because they contained `?`
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Borrow the cleaned samples
    pub fn as_samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Consume the dataset, returning the cleaned samples
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }

    /// Parse one row; `Ok(None)` marks a row with missing values
    fn parse_row(line: &str, line_num: usize) -> Result<Option<Sample>> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != N_COLUMNS {
            return Err(SVMError::ParseError(format!(
                "Line {line_num}: expected {N_COLUMNS} columns, found {}",
                fields.len()
            )));
        }

        if fields.iter().any(|&f| f == MISSING) {
            return Ok(None);
        }

        let label = match fields[N_COLUMNS - 1] {
            BENIGN_CODE => BENIGN,
            MALIGNANT_CODE => MALIGNANT,
            other => {
                return Err(SVMError::ParseError(format!(
                    "Line {line_num}: unknown class '{other}' (expected 2 or 4)"
                )))
            }
        };

        let features = fields[1..N_COLUMNS - 1]
            .iter()
            .enumerate()
            .map(|(j, field)| match field.parse::<u8>() {
                Ok(value) if FEATURE_RANGE.contains(&value) => Ok(f64::from(value)),
                _ => Err(SVMError::ParseError(format!(
                    "Line {line_num}: invalid value '{field}' for {} (expected 1..=10)",
                    FEATURE_NAMES[j]
                ))),
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(Some(Sample::new(features, label)))
    }
}

impl Dataset for WisconsinDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn dim(&self) -> usize {
        FEATURE_NAMES.len()
    }

    fn get_sample(&self, i: usize) -> Sample {
        self.samples[i].clone()
    }

    fn get_labels(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.label).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const RAW: &str = "\
1000025,5,1,1,1,2,1,3,1,1,2
1002945,5,4,4,5,7,10,3,2,1,2
1057013,8,4,5,1,2,?,7,3,1,4

1017122,8,10,10,8,7,10,9,7,1,4
";

    #[test]
    fn test_parse_drops_missing_rows() {
        let dataset = WisconsinDataset::from_reader(Cursor::new(RAW)).expect("Should parse");

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.dropped_rows(), 1);
        assert_eq!(dataset.dim(), 9);
        assert_eq!(dataset.get_labels(), vec![BENIGN, BENIGN, MALIGNANT]);
    }

    #[test]
    fn test_id_column_is_discarded() {
        let dataset = WisconsinDataset::from_reader(Cursor::new(RAW)).expect("Should parse");

        let sample = dataset.get_sample(2);
        assert_eq!(
            sample.features,
            vec![8.0, 10.0, 10.0, 8.0, 7.0, 10.0, 9.0, 7.0, 1.0]
        );
    }

    #[test]
    fn test_unknown_class_is_error() {
        let data = "1000025,5,1,1,1,2,1,3,1,1,3\n";
        let result = WisconsinDataset::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(SVMError::ParseError(msg)) if msg.contains("unknown class")));
    }

    #[test]
    fn test_wrong_column_count_is_error() {
        let data = "1000025,5,1,1,1,2,1,3,1,2\n";
        assert!(WisconsinDataset::from_reader(Cursor::new(data)).is_err());
    }

    #[test]
    fn test_non_numeric_feature_is_error() {
        let data = "1000025,5,x,1,1,2,1,3,1,1,2\n";
        let result = WisconsinDataset::from_reader(Cursor::new(data));
        assert!(matches!(
            result,
            Err(SVMError::ParseError(msg)) if msg.contains("uniformity_of_cell_size")
        ));
    }

    #[test]
    fn test_out_of_range_features_are_errors() {
        for bad in ["NaN", "inf", "0", "11", "99", "2.5", "-1"] {
            let data = format!("1000025,5,{bad},1,1,2,1,3,1,1,2\n");
            let result = WisconsinDataset::from_reader(Cursor::new(data));
            let rejected = matches!(
                &result,
                Err(SVMError::ParseError(msg)) if msg.contains("uniformity_of_cell_size")
            );
            assert!(rejected, "'{bad}' should be rejected, got: {result:?}");
        }
    }

    #[test]
    fn test_range_bounds_are_accepted() {
        let data = "1000025,1,10,1,10,1,10,1,10,1,4\n";
        let dataset = WisconsinDataset::from_reader(Cursor::new(data)).expect("Should parse");
        assert_eq!(
            dataset.get_sample(0).features,
            vec![1.0, 10.0, 1.0, 10.0, 1.0, 10.0, 1.0, 10.0, 1.0]
        );
    }

    #[test]
    fn test_only_missing_rows_is_empty() {
        let data = "1057013,8,4,5,1,2,?,7,3,1,4\n";
        assert!(matches!(
            WisconsinDataset::from_reader(Cursor::new(data)),
            Err(SVMError::EmptyDataset)
        ));
    }

    #[test]
    fn test_header_matches_feature_names() {
        assert_eq!(&CSV_HEADER[..9], &FEATURE_NAMES[..]);
        assert_eq!(CSV_HEADER[9], "class");
    }
}
