//! Core type definitions

/// Label used for malignant tumours (the positive class)
pub const MALIGNANT: f64 = 1.0;

/// Label used for benign tumours (the negative class)
pub const BENIGN: f64 = -1.0;

/// Prediction result containing label and decision value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label (+1 or -1)
    pub label: f64,
    /// Raw decision function value
    pub decision_value: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: f64, decision_value: f64) -> Self {
        Self {
            label,
            decision_value,
        }
    }

    /// Get confidence as absolute value of decision value
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }

    /// True when the sample was classified as malignant
    pub fn is_positive(&self) -> bool {
        self.label > 0.0
    }
}

/// Labelled sample with a dense feature vector
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Feature values, one per attribute
    pub features: Vec<f64>,
    /// Class label (+1 malignant, -1 benign)
    pub label: f64,
}

impl Sample {
    /// Create a new sample
    pub fn new(features: Vec<f64>, label: f64) -> Self {
        Self { features, label }
    }

    /// Number of features
    pub fn dim(&self) -> usize {
        self.features.len()
    }
}

/// Result of the dual optimization
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Lagrange multipliers (alpha values)
    pub alpha: Vec<f64>,
    /// Bias term (b) of the decision function
    pub b: f64,
    /// Indices of support vectors (where alpha > 0)
    pub support_vectors: Vec<usize>,
    /// Number of pair updates performed
    pub iterations: usize,
    /// Final dual objective value (maximisation form)
    pub objective_value: f64,
}

/// Configuration for optimizer
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Regularization parameter (upper bound for alpha)
    pub c: f64,
    /// Tolerance on the KKT gap
    pub epsilon: f64,
    /// Maximum number of pair updates
    pub max_iterations: usize,
    /// Kernel cache size in bytes
    pub cache_size: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            epsilon: 0.001,
            max_iterations: 10000,
            cache_size: 100_000_000, // 100MB
        }
    }
}
