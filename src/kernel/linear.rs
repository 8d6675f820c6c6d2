//! Linear kernel implementation

use crate::kernel::{Kernel, KernelType};

/// Linear kernel: K(x, y) = x^T * y
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearKernel;

impl LinearKernel {
    /// Create a new linear kernel
    pub fn new() -> Self {
        Self
    }
}

impl Kernel for LinearKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        dot(x, y)
    }

    fn kernel_type(&self) -> KernelType {
        KernelType::Linear
    }
}

/// Dot product of two dense vectors of equal length
pub(crate) fn dot(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len(), "kernel inputs differ in dimension");
    x.iter().zip(y.iter()).map(|(a, b)| a * b).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_kernel_basic() {
        let kernel = LinearKernel::new();
        let x = [1.0, 0.0, 2.0];
        let y = [0.5, 3.0, 2.0];
        assert_eq!(kernel.compute(&x, &y), 4.5);
    }

    #[test]
    fn test_linear_kernel_identical() {
        let kernel = LinearKernel::new();
        let x = [1.0, 2.0, 3.0];
        // x^T * x = 1 + 4 + 9
        assert_eq!(kernel.compute(&x, &x), 14.0);
    }

    #[test]
    fn test_linear_kernel_orthogonal() {
        let kernel = LinearKernel::new();
        assert_eq!(kernel.compute(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(kernel.kernel_type(), KernelType::Linear);
    }
}
