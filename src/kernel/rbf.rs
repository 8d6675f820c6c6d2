//! RBF (Radial Basis Function) kernel implementation
//!
//! The RBF kernel is defined as: K(x, y) = exp(-γ * ||x - y||²)
//! where γ (gamma) is a hyperparameter that controls the kernel width.

use crate::core::{Result, SVMError};
use crate::kernel::{Kernel, KernelType};

/// RBF (Radial Basis Function) kernel: K(x, y) = exp(-γ * ||x - y||²)
///
/// The gamma parameter controls the "reach" of each training example:
/// - High gamma: close points have high influence (potential overfitting)
/// - Low gamma: distant points have influence (potential underfitting)
///
/// This is the kernel whose `C`/`gamma` surface the grid search explores.
#[derive(Debug, Clone, Copy)]
pub struct RBFKernel {
    gamma: f64,
}

impl RBFKernel {
    /// Create a new RBF kernel with specified gamma parameter
    ///
    /// # Panics
    /// Panics if gamma is not positive and finite
    pub fn new(gamma: f64) -> Self {
        assert!(
            gamma > 0.0 && gamma.is_finite(),
            "Gamma must be positive, got: {}",
            gamma
        );
        Self { gamma }
    }

    /// Fallible constructor for values coming from configuration
    pub fn try_new(gamma: f64) -> Result<Self> {
        if gamma > 0.0 && gamma.is_finite() {
            Ok(Self { gamma })
        } else {
            Err(SVMError::InvalidParameter(format!(
                "gamma must be positive and finite, got: {gamma}"
            )))
        }
    }

    /// Get the gamma parameter
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for RBFKernel {
    /// Default RBF kernel with gamma = 1.0
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Kernel for RBFKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        (-self.gamma * squared_euclidean_distance(x, y)).exp()
    }

    fn kernel_type(&self) -> KernelType {
        KernelType::Rbf { gamma: self.gamma }
    }
}

/// ||x - y||² of two dense vectors of equal length
fn squared_euclidean_distance(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len(), "kernel inputs differ in dimension");
    x.iter()
        .zip(y.iter())
        .map(|(a, b)| {
            let diff = a - b;
            diff * diff
        })
        .sum()
}
