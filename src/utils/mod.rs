//! Utility functions for preprocessing and inspecting samples

use crate::core::Sample;

/// Feature scaling utilities
pub mod scaling {
    use super::*;
    use crate::core::{Result, SVMError};
    use serde::{Deserialize, Serialize};

    /// Feature scaling methods
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "method", rename_all = "snake_case")]
    pub enum ScalingMethod {
        /// Min-Max scaling to [min_val, max_val] range
        MinMax { min_val: f64, max_val: f64 },
        /// Standard (Z-score) normalization: (x - mean) / std
        StandardScore,
    }

    impl Default for ScalingMethod {
        fn default() -> Self {
            Self::StandardScore
        }
    }

    /// Per-feature statistics fitted on the training samples
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ScalingParams {
        pub method: ScalingMethod,
        pub feature_stats: Vec<FeatureStats>,
    }

    /// Statistics for a single feature
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct FeatureStats {
        pub min: f64,
        pub max: f64,
        pub mean: f64,
        /// Population standard deviation
        pub std: f64,
    }

    impl ScalingParams {
        /// Compute scaling parameters from training data
        pub fn fit(samples: &[Sample], method: ScalingMethod) -> Result<Self> {
            let first = samples.first().ok_or(SVMError::EmptyDataset)?;
            let dim = first.dim();
            if let Some(bad) = samples.iter().find(|s| s.dim() != dim) {
                return Err(SVMError::DimensionMismatch {
                    expected: dim,
                    actual: bad.dim(),
                });
            }

            let n = samples.len() as f64;
            let feature_stats = (0..dim)
                .map(|j| {
                    let column = samples.iter().map(|s| s.features[j]);
                    let min = column.clone().fold(f64::INFINITY, f64::min);
                    let max = column.clone().fold(f64::NEG_INFINITY, f64::max);
                    let mean = column.clone().sum::<f64>() / n;
                    let variance = column.map(|x| (x - mean).powi(2)).sum::<f64>() / n;

                    FeatureStats {
                        min,
                        max,
                        mean,
                        std: variance.sqrt(),
                    }
                })
                .collect();

            Ok(Self {
                method,
                feature_stats,
            })
        }

        /// Number of features the parameters were fitted on
        pub fn dim(&self) -> usize {
            self.feature_stats.len()
        }

        /// Transform a single sample using fitted parameters
        ///
        /// The sample must have exactly the fitted number of features.
        pub fn transform_sample(&self, sample: &Sample) -> Result<Sample> {
            if sample.features.len() != self.dim() {
                return Err(SVMError::DimensionMismatch {
                    expected: self.dim(),
                    actual: sample.features.len(),
                });
            }

            let features = sample
                .features
                .iter()
                .zip(&self.feature_stats)
                .map(|(&value, stats)| self.scale_value(value, stats))
                .collect();

            Ok(Sample::new(features, sample.label))
        }

        /// Transform multiple samples
        pub fn transform_samples(&self, samples: &[Sample]) -> Result<Vec<Sample>> {
            samples
                .iter()
                .map(|sample| self.transform_sample(sample))
                .collect()
        }

        fn scale_value(&self, value: f64, stats: &FeatureStats) -> f64 {
            match self.method {
                ScalingMethod::MinMax { min_val, max_val } => {
                    if (stats.max - stats.min).abs() < 1e-12 {
                        // Constant feature
                        (min_val + max_val) / 2.0
                    } else {
                        let normalized = (value - stats.min) / (stats.max - stats.min);
                        min_val + normalized * (max_val - min_val)
                    }
                }
                ScalingMethod::StandardScore => {
                    if stats.std < 1e-12 {
                        value - stats.mean
                    } else {
                        (value - stats.mean) / stats.std
                    }
                }
            }
        }
    }

    /// Convenience function: fit and transform in one step
    pub fn fit_transform(
        samples: &[Sample],
        method: ScalingMethod,
    ) -> Result<(Vec<Sample>, ScalingParams)> {
        let params = ScalingParams::fit(samples, method)?;
        let transformed = params.transform_samples(samples)?;
        Ok((transformed, params))
    }
}

/// Validation and inspection utilities
pub mod validation {
    use super::*;

    /// Count (positive, negative) labels
    pub fn class_counts(samples: &[Sample]) -> (usize, usize) {
        let positive = samples.iter().filter(|s| s.label > 0.0).count();
        (positive, samples.len() - positive)
    }
}

#[cfg(test)]
mod tests {
    use super::scaling::*;
    use super::*;
    use crate::core::SVMError;
    use approx::assert_relative_eq;

    fn column_samples(values: &[f64]) -> Vec<Sample> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Sample::new(vec![v, 7.0], if i % 2 == 0 { 1.0 } else { -1.0 }))
            .collect()
    }

    #[test]
    fn test_standard_score_uses_population_std() {
        let samples = column_samples(&[1.0, 2.0, 3.0, 4.0]);
        let params =
            ScalingParams::fit(&samples, ScalingMethod::StandardScore).expect("Fit should work");

        let stats = &params.feature_stats[0];
        assert_relative_eq!(stats.mean, 2.5);
        // population variance = 1.25
        assert_relative_eq!(stats.std, 1.25f64.sqrt());

        let scaled = params.transform_samples(&samples).expect("Same dimension");
        let mean: f64 = scaled.iter().map(|s| s.features[0]).sum::<f64>() / 4.0;
        let var: f64 = scaled.iter().map(|s| s.features[0].powi(2)).sum::<f64>() / 4.0;
        assert_relative_eq!(mean, 0.0, epsilon = 1e-12);
        assert_relative_eq!(var, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_feature_is_centered() {
        let samples = column_samples(&[1.0, 2.0, 3.0]);
        let params =
            ScalingParams::fit(&samples, ScalingMethod::StandardScore).expect("Fit should work");

        let probe = Sample::new(vec![2.0, 9.0], 1.0);
        let scaled = params.transform_sample(&probe).expect("Same dimension");
        assert_relative_eq!(scaled.features[1], 2.0);
        assert_eq!(scaled.label, 1.0);
    }

    #[test]
    fn test_min_max_scaling() {
        let samples = column_samples(&[0.0, 5.0, 10.0]);
        let method = ScalingMethod::MinMax {
            min_val: -1.0,
            max_val: 1.0,
        };
        let (scaled, params) = fit_transform(&samples, method).expect("Fit should work");

        assert_relative_eq!(scaled[0].features[0], -1.0);
        assert_relative_eq!(scaled[1].features[0], 0.0);
        assert_relative_eq!(scaled[2].features[0], 1.0);
        // constant column maps to the middle of the range
        assert_relative_eq!(scaled[0].features[1], 0.0);
        assert_eq!(params.dim(), 2);
    }

    #[test]
    fn test_transform_uses_training_statistics() {
        let train = column_samples(&[0.0, 2.0]);
        let params =
            ScalingParams::fit(&train, ScalingMethod::StandardScore).expect("Fit should work");

        // mean 1, std 1
        let scaled = params
            .transform_sample(&Sample::new(vec![5.0, 7.0], -1.0))
            .expect("Same dimension");
        assert_relative_eq!(scaled.features[0], 4.0);
    }

    #[test]
    fn test_transform_rejects_wrong_dimension() {
        let params = ScalingParams::fit(&column_samples(&[0.0, 2.0]), ScalingMethod::default())
            .expect("Fit should work");

        for features in [vec![1.0], vec![1.0, 2.0, 3.0]] {
            let result = params.transform_sample(&Sample::new(features.clone(), 1.0));
            assert!(
                matches!(
                    result,
                    Err(SVMError::DimensionMismatch { expected: 2, actual })
                        if actual == features.len()
                ),
                "{features:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        assert!(ScalingParams::fit(&[], ScalingMethod::StandardScore).is_err());

        let ragged = vec![Sample::new(vec![1.0], 1.0), Sample::new(vec![1.0, 2.0], -1.0)];
        assert!(ScalingParams::fit(&ragged, ScalingMethod::StandardScore).is_err());
    }

    #[test]
    fn test_scaling_params_serde() {
        let samples = column_samples(&[1.0, 3.0]);
        let params =
            ScalingParams::fit(&samples, ScalingMethod::StandardScore).expect("Fit should work");

        let json = serde_json::to_string(&params).expect("Should serialize");
        assert!(json.contains("\"method\":\"standard_score\""));
        let restored: ScalingParams = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(restored.feature_stats, params.feature_stats);
    }

    #[test]
    fn test_class_counts() {
        let samples = column_samples(&[1.0, 2.0, 3.0]);
        assert_eq!(validation::class_counts(&samples), (2, 1));
    }
}
