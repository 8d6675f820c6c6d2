//! Kernel trait definition

use crate::core::Result;
use crate::kernel::{LinearKernel, RBFKernel};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Serializable description of a kernel and its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KernelType {
    Linear,
    Rbf { gamma: f64 },
}

impl fmt::Display for KernelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelType::Linear => write!(f, "linear"),
            KernelType::Rbf { gamma } => write!(f, "rbf(gamma={gamma})"),
        }
    }
}

impl KernelType {
    /// Instantiate the described kernel, validating its parameters
    pub fn build(self) -> Result<Box<dyn Kernel>> {
        match self {
            KernelType::Linear => Ok(Box::new(LinearKernel::new())),
            KernelType::Rbf { gamma } => Ok(Box::new(RBFKernel::try_new(gamma)?)),
        }
    }
}

/// Kernel function trait
///
/// A kernel function K(x, y) must satisfy Mercer's condition to be valid for SVM.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: &[f64], y: &[f64]) -> f64;

    /// Describe the kernel for persistence and reporting
    fn kernel_type(&self) -> KernelType;
}

impl<K: Kernel + ?Sized> Kernel for Box<K> {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        (**self).compute(x, y)
    }

    fn kernel_type(&self) -> KernelType {
        (**self).kernel_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_type_display() {
        assert_eq!(KernelType::Linear.to_string(), "linear");
        assert_eq!(KernelType::Rbf { gamma: 0.5 }.to_string(), "rbf(gamma=0.5)");
    }

    #[test]
    fn test_kernel_type_serde() {
        let json = serde_json::to_string(&KernelType::Rbf { gamma: 0.01 }).unwrap();
        assert_eq!(json, r#"{"type":"rbf","gamma":0.01}"#);
        let back: KernelType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, KernelType::Rbf { gamma: 0.01 });
    }

    #[test]
    fn test_build_from_kernel_type() {
        let kernel = KernelType::Rbf { gamma: 0.5 }.build().expect("Valid gamma");
        assert_eq!(kernel.kernel_type(), KernelType::Rbf { gamma: 0.5 });
        assert_eq!(kernel.compute(&[1.0, 2.0], &[1.0, 2.0]), 1.0);

        let linear = KernelType::Linear.build().expect("Always valid");
        assert_eq!(linear.compute(&[1.0, 2.0], &[3.0, 4.0]), 11.0);

        assert!(KernelType::Rbf { gamma: -1.0 }.build().is_err());
    }
}
