//! Optimization front-end for SVM training
//!
//! Ties a kernel and the SMO solver together and turns the raw dual
//! solution into a model that can make predictions.

use crate::cache::KernelCache;
use crate::core::{
    Dataset, OptimizationResult, OptimizerConfig, Prediction, Result, SVMModel, Sample,
};
use crate::kernel::Kernel;
use crate::solver::SMOSolver;
use log::debug;
use std::sync::Arc;

/// High-level SVM optimizer that integrates kernel functions and solving algorithms
pub struct SVMOptimizer<K: Kernel> {
    kernel: Arc<K>,
    config: OptimizerConfig,
}

impl<K: Kernel> SVMOptimizer<K> {
    /// Create a new SVM optimizer with the given kernel and configuration
    pub fn new(kernel: K, config: OptimizerConfig) -> Self {
        Self {
            kernel: Arc::new(kernel),
            config,
        }
    }

    /// Create a new SVM optimizer with default configuration
    pub fn with_kernel(kernel: K) -> Self {
        Self::new(kernel, OptimizerConfig::default())
    }

    /// Train an SVM model on the given dataset
    pub fn train<D: Dataset>(&self, dataset: &D) -> Result<TrainedSVM<K>> {
        self.train_samples(&dataset.samples())
    }

    /// Train an SVM model on a slice of samples
    pub fn train_samples(&self, samples: &[Sample]) -> Result<TrainedSVM<K>> {
        let solver = SMOSolver::new(Arc::clone(&self.kernel), self.config.clone());
        let result = solver.solve(samples)?;
        debug!(
            "Trained {} model: {} support vectors, {} iterations, objective {:.6}",
            self.kernel.kernel_type(),
            result.support_vectors.len(),
            result.iterations,
            result.objective_value
        );

        Ok(TrainedSVM::new(Arc::clone(&self.kernel), samples, result))
    }

    /// Train reusing kernel rows from a cache built for the same samples
    ///
    /// Useful when several values of C are tried with one kernel.
    pub fn train_samples_with_cache(
        &self,
        samples: &[Sample],
        cache: &mut KernelCache,
    ) -> Result<TrainedSVM<K>> {
        let solver = SMOSolver::new(Arc::clone(&self.kernel), self.config.clone());
        let result = solver.solve_with_cache(samples, cache)?;
        Ok(TrainedSVM::new(Arc::clone(&self.kernel), samples, result))
    }

    /// Get the optimizer configuration
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Get the kernel
    pub fn kernel(&self) -> &K {
        &self.kernel
    }
}

/// A trained SVM model that can make predictions
pub struct TrainedSVM<K: Kernel> {
    kernel: Arc<K>,
    support_vectors: Vec<Sample>,
    alpha: Vec<f64>,
    bias: f64,
    support_indices: Vec<usize>,
    dim: usize,
}

impl<K: Kernel> TrainedSVM<K> {
    pub(crate) fn new(
        kernel: Arc<K>,
        training_samples: &[Sample],
        optimization_result: OptimizationResult,
    ) -> Self {
        let support_vectors = optimization_result
            .support_vectors
            .iter()
            .map(|&i| training_samples[i].clone())
            .collect();
        let alpha = optimization_result
            .support_vectors
            .iter()
            .map(|&i| optimization_result.alpha[i])
            .collect();

        Self {
            kernel,
            support_vectors,
            alpha,
            bias: optimization_result.b,
            support_indices: optimization_result.support_vectors,
            dim: training_samples.first().map_or(0, |s| s.features.len()),
        }
    }

    /// Rebuild a model from stored parts (support vectors keep their labels)
    pub(crate) fn from_parts(
        kernel: K,
        support_vectors: Vec<Sample>,
        alpha: Vec<f64>,
        bias: f64,
    ) -> Self {
        let support_indices = (0..support_vectors.len()).collect();
        let dim = support_vectors.first().map_or(0, |sv| sv.features.len());
        Self {
            kernel: Arc::new(kernel),
            support_vectors,
            alpha,
            bias,
            support_indices,
            dim,
        }
    }

    /// Get the decision function value for a sample
    pub fn decision_function(&self, sample: &Sample) -> f64 {
        let sum: f64 = self
            .support_vectors
            .iter()
            .zip(&self.alpha)
            .map(|(sv, &alpha)| {
                alpha * sv.label * self.kernel.compute(&sample.features, &sv.features)
            })
            .sum();
        sum + self.bias
    }

    /// Get the support vectors
    pub fn support_vectors(&self) -> &[Sample] {
        &self.support_vectors
    }

    /// Get the alpha values for support vectors
    pub fn alpha_values(&self) -> &[f64] {
        &self.alpha
    }

    /// Get the indices of support vectors in the original training set
    pub fn support_vector_indices(&self) -> &[usize] {
        &self.support_indices
    }

    /// Get the kernel
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Number of features the model was trained on
    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl<K: Kernel> SVMModel for TrainedSVM<K> {
    fn predict(&self, sample: &Sample) -> Prediction {
        let decision_value = self.decision_function(sample);
        let label = if decision_value > 0.0 { 1.0 } else { -1.0 };
        Prediction::new(label, decision_value)
    }

    fn n_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }

    fn bias(&self) -> f64 {
        self.bias
    }
}
