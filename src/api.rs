//! High-level API for Support Vector Machine operations
//!
//! This module provides a user-friendly interface for common SVM tasks,
//! including training, prediction, and model evaluation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bcw_svm::api::SVM;
//! use bcw_svm::utils::scaling::ScalingMethod;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let model = SVM::with_rbf(0.01)?
//!     .with_c(10.0)
//!     .with_feature_scaling(ScalingMethod::StandardScore)
//!     .train_from_csv("breast-cancer-train.csv")?;
//!
//! let test = bcw_svm::data::CSVDataset::from_file("breast-cancer-test.csv")?;
//! let metrics = model.evaluate_detailed(&test)?;
//! println!("Recall: {:.3}", metrics.recall());
//! # Ok(())
//! # }
//! ```

use crate::core::{Dataset, OptimizerConfig, Prediction, Result, SVMError, SVMModel, Sample};
use crate::data::CSVDataset;
use crate::kernel::{Kernel, KernelType, LinearKernel, RBFKernel};
use crate::optimizer::{SVMOptimizer, TrainedSVM};
use crate::utils::scaling::{ScalingMethod, ScalingParams};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// High-level SVM interface with builder pattern
pub struct SVM<K: Kernel = LinearKernel> {
    kernel: K,
    config: OptimizerConfig,
    scaling: Option<ScalingMethod>,
}

impl SVM<LinearKernel> {
    /// Create a new SVM with linear kernel and default parameters
    pub fn new() -> Self {
        Self::with_kernel(LinearKernel::new())
    }
}

impl Default for SVM<LinearKernel> {
    fn default() -> Self {
        Self::new()
    }
}

impl SVM<RBFKernel> {
    /// Create an SVM with an RBF kernel of the given width
    pub fn with_rbf(gamma: f64) -> Result<Self> {
        Ok(Self::with_kernel(RBFKernel::try_new(gamma)?))
    }
}

impl<K: Kernel> SVM<K> {
    /// Create SVM with custom kernel
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel,
            config: OptimizerConfig::default(),
            scaling: None,
        }
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set convergence tolerance
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    /// Set maximum number of iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set kernel cache size in bytes
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.config.cache_size = cache_size;
        self
    }

    /// Fit a feature scaler on the training samples and apply it to
    /// everything the model sees afterwards
    pub fn with_feature_scaling(mut self, method: ScalingMethod) -> Self {
        self.scaling = Some(method);
        self
    }

    /// Train on a dataset
    pub fn train<D: Dataset>(self, dataset: &D) -> Result<TrainedModel<K>> {
        self.train_samples(&dataset.samples())
    }

    /// Train on samples
    pub fn train_samples(self, samples: &[Sample]) -> Result<TrainedModel<K>> {
        let scaling = self
            .scaling
            .map(|method| ScalingParams::fit(samples, method))
            .transpose()?;

        let config = self.config.clone();
        let optimizer = SVMOptimizer::new(self.kernel, self.config);
        let model = match &scaling {
            Some(params) => optimizer.train_samples(&params.transform_samples(samples)?)?,
            None => optimizer.train_samples(samples)?,
        };

        Ok(TrainedModel {
            model,
            scaling,
            config,
        })
    }

    /// Train from CSV file (automatically detects headers)
    pub fn train_from_csv<P: AsRef<Path>>(self, path: P) -> Result<TrainedModel<K>> {
        let dataset = CSVDataset::from_file(path)?;
        self.train(&dataset)
    }
}

/// Trained SVM model with high-level prediction interface
///
/// Inputs are passed through the fitted scaler (if any) before reaching the
/// kernel, so callers always work in raw feature units.
pub struct TrainedModel<K: Kernel> {
    model: TrainedSVM<K>,
    scaling: Option<ScalingParams>,
    config: OptimizerConfig,
}

impl<K: Kernel> TrainedModel<K> {
    pub(crate) fn from_parts(
        model: TrainedSVM<K>,
        scaling: Option<ScalingParams>,
        config: OptimizerConfig,
    ) -> Self {
        Self {
            model,
            scaling,
            config,
        }
    }

    /// Number of features the model expects
    pub fn dim(&self) -> usize {
        match &self.scaling {
            Some(params) => params.dim(),
            None => self.model.dim(),
        }
    }

    fn check_dim(&self, actual: usize) -> Result<()> {
        if actual != self.dim() {
            return Err(SVMError::DimensionMismatch {
                expected: self.dim(),
                actual,
            });
        }
        Ok(())
    }

    /// Predict a single sample given in raw feature units
    pub fn predict(&self, sample: &Sample) -> Result<Prediction> {
        self.check_dim(sample.features.len())?;
        match &self.scaling {
            Some(params) => Ok(self.model.predict(&params.transform_sample(sample)?)),
            None => Ok(self.model.predict(sample)),
        }
    }

    /// Predict multiple samples
    pub fn predict_batch(&self, samples: &[Sample]) -> Result<Vec<Prediction>> {
        samples.iter().map(|s| self.predict(s)).collect()
    }

    /// Predict from dataset
    pub fn predict_dataset<D: Dataset>(&self, dataset: &D) -> Result<Vec<Prediction>> {
        self.check_dim(dataset.dim())?;
        self.predict_batch(&dataset.samples())
    }

    /// Evaluate accuracy on a dataset
    pub fn evaluate<D: Dataset>(&self, dataset: &D) -> Result<f64> {
        Ok(self.evaluate_detailed(dataset)?.accuracy())
    }

    /// Evaluate accuracy from CSV file
    pub fn evaluate_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<f64> {
        let dataset = CSVDataset::from_file(path)?;
        self.evaluate(&dataset)
    }

    /// Get detailed evaluation metrics
    pub fn evaluate_detailed<D: Dataset>(&self, dataset: &D) -> Result<EvaluationMetrics> {
        let predictions = self.predict_dataset(dataset)?;
        Ok(EvaluationMetrics::from_predictions(
            &predictions,
            &dataset.get_labels(),
        ))
    }

    /// Get model information
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            kernel: self.model.kernel().kernel_type(),
            c: self.config.c,
            n_support_vectors: self.model.n_support_vectors(),
            bias: self.model.bias(),
            support_vector_indices: self.model.support_vector_indices().to_vec(),
        }
    }

    /// Get the underlying trained model
    pub fn inner(&self) -> &TrainedSVM<K> {
        &self.model
    }

    /// Scaler fitted during training, if scaling was enabled
    pub fn scaling(&self) -> Option<&ScalingParams> {
        self.scaling.as_ref()
    }

    /// Solver configuration the model was trained with
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }
}

/// Confusion matrix with malignant (+1) as the positive class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl EvaluationMetrics {
    pub fn new(tp: usize, tn: usize, fp: usize, fn_: usize) -> Self {
        Self {
            true_positives: tp,
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_,
        }
    }

    /// Tally predictions against the true labels
    pub fn from_predictions(predictions: &[Prediction], labels: &[f64]) -> Self {
        let mut metrics = Self::default();

        for (pred, &actual) in predictions.iter().zip(labels.iter()) {
            match (pred.is_positive(), actual > 0.0) {
                (true, true) => metrics.true_positives += 1,
                (false, false) => metrics.true_negatives += 1,
                (true, false) => metrics.false_positives += 1,
                (false, true) => metrics.false_negatives += 1,
            }
        }

        metrics
    }

    /// Number of evaluated samples
    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Calculate accuracy: (TP + TN) / (TP + TN + FP + FN)
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    /// Calculate precision: TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_positives,
        )
    }

    /// Calculate recall (sensitivity): TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_negatives,
        )
    }

    /// Calculate F1 score: 2 * (precision * recall) / (precision + recall)
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * (p * r) / (p + r)
        }
    }

    /// Calculate specificity: TN / (TN + FP)
    pub fn specificity(&self) -> f64 {
        ratio(
            self.true_negatives,
            self.true_negatives + self.false_positives,
        )
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub kernel: KernelType,
    pub c: f64,
    pub n_support_vectors: usize,
    pub bias: f64,
    pub support_vector_indices: Vec<usize>,
}
