//! CSV format dataset implementation
//!
//! Supports loading datasets from CSV files where:
//! - The last column is the label
//! - All other columns are features
//! - First row can be headers (automatically detected)
//!
//! [`write_csv`] produces files in the same layout.

use crate::core::{Dataset, Result, SVMError, Sample};
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Dataset implementation for CSV format files
#[derive(Debug, Clone)]
pub struct CSVDataset {
    samples: Vec<Sample>,
    dimensions: usize,
}

impl CSVDataset {
    /// Load a dataset from a CSV file
    ///
    /// The last column is assumed to be the label.
    /// Headers are automatically detected if present.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let dataset = Self::from_reader(BufReader::new(file))?;
        debug!(
            "Loaded {} samples with {} features from {}",
            dataset.len(),
            dataset.dim(),
            path.display()
        );
        Ok(dataset)
    }

    /// Load a dataset from a reader, detecting a header row
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, true)
    }

    /// Load a dataset from a reader with explicit header option
    pub fn from_reader_with_options<R: BufRead>(
        reader: R,
        auto_detect_header: bool,
    ) -> Result<Self> {
        let mut samples: Vec<Sample> = Vec::new();
        let mut seen_data_or_header = false;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // Only the first non-comment line may be a header
            if !seen_data_or_header {
                seen_data_or_header = true;
                if auto_detect_header && Self::is_header_line(line) {
                    continue;
                }
            }

            let sample = Self::parse_data_line(line)?;
            if let Some(first) = samples.first() {
                if first.dim() != sample.dim() {
                    return Err(SVMError::DimensionMismatch {
                        expected: first.dim(),
                        actual: sample.dim(),
                    });
                }
            }
            samples.push(sample);
        }

        if samples.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        let dimensions = samples[0].dim();
        Ok(CSVDataset {
            samples,
            dimensions,
        })
    }

    /// Wrap already parsed samples
    pub fn from_samples(samples: Vec<Sample>) -> Result<Self> {
        let dimensions = samples.first().ok_or(SVMError::EmptyDataset)?.dim();
        Ok(CSVDataset {
            samples,
            dimensions,
        })
    }

    /// Borrow the samples
    pub fn as_samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Check if a line appears to be a header
    fn is_header_line(line: &str) -> bool {
        let fields: Vec<&str> = line.split(',').collect();

        if fields.len() < 2 {
            return false;
        }

        // Most feature columns fail to parse as numbers
        let non_numeric_count = fields
            .iter()
            .take(fields.len() - 1)
            .filter(|field| field.trim().parse::<f64>().is_err())
            .count();

        non_numeric_count > fields.len() / 2
    }

    /// Parse a CSV data line into a Sample
    fn parse_data_line(line: &str) -> Result<Sample> {
        let fields: Vec<&str> = line.split(',').map(|f| f.trim()).collect();

        if fields.len() < 2 {
            return Err(SVMError::ParseError(format!(
                "Line has too few fields: {line}"
            )));
        }

        let label_str = fields[fields.len() - 1];
        let label = label_str
            .parse::<f64>()
            .map_err(|_| SVMError::ParseError(format!("Invalid label: {label_str}")))?;

        // Convert to binary label if needed
        let label = if label > 0.0 { 1.0 } else { -1.0 };

        let features = fields[..fields.len() - 1]
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                field.parse::<f64>().map_err(|_| {
                    SVMError::ParseError(format!(
                        "Invalid feature value at column {}: {field}",
                        idx + 1
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(Sample::new(features, label))
    }
}

impl Dataset for CSVDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn dim(&self) -> usize {
        self.dimensions
    }

    fn get_sample(&self, i: usize) -> Sample {
        self.samples[i].clone()
    }

    fn get_labels(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.label).collect()
    }
}

/// Write samples as CSV (features..., label)
///
/// `header` is written as the first row unless it is empty.
pub fn write_csv<P: AsRef<Path>>(path: P, samples: &[Sample], header: &[&str]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    if !header.is_empty() {
        writeln!(writer, "{}", header.join(","))?;
    }

    for sample in samples {
        for value in &sample.features {
            write!(writer, "{value},")?;
        }
        writeln!(writer, "{}", sample.label)?;
    }

    writer.flush()?;
    debug!(
        "Wrote {} samples to {}",
        samples.len(),
        path.as_ref().display()
    );
    Ok(())
}
