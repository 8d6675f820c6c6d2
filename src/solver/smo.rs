//! Sequential Minimal Optimization (SMO) solver implementation
//!
//! Solves the C-SVC dual
//!
//! ```text
//! min  ½ αᵀQα − eᵀα    s.t.  0 ≤ αᵢ ≤ C,  yᵀα = 0,   Qᵢⱼ = yᵢyⱼK(xᵢ, xⱼ)
//! ```
//!
//! by repeatedly optimizing a pair of Lagrange multipliers. The pair is the
//! maximal violating pair with second-order selection of the second index,
//! and the loop stops once the KKT gap `m(α) − M(α)` drops below epsilon.

use crate::cache::KernelCache;
use crate::core::{OptimizationResult, OptimizerConfig, Result, SVMError, Sample};
use crate::kernel::Kernel;
use log::{debug, warn};
use std::sync::Arc;

/// Substitute for a non-positive curvature along the chosen direction
const TAU: f64 = 1e-12;

/// SMO solver for SVM optimization
pub struct SMOSolver<K: Kernel> {
    kernel: Arc<K>,
    config: OptimizerConfig,
}

/// Mutable state of one solve
struct SolverState {
    y: Vec<f64>,
    alpha: Vec<f64>,
    /// Gradient of the dual objective, ∇f(α) = Qα − e
    grad: Vec<f64>,
    /// Kernel diagonal K(xᵢ, xᵢ)
    diag: Vec<f64>,
}

impl<K: Kernel> SMOSolver<K> {
    /// Create a new SMO solver with the given kernel and configuration
    pub fn new(kernel: Arc<K>, config: OptimizerConfig) -> Self {
        Self { kernel, config }
    }

    /// Solve the SVM optimization problem
    pub fn solve(&self, samples: &[Sample]) -> Result<OptimizationResult> {
        let mut cache = KernelCache::with_memory_limit(self.config.cache_size, samples.len());
        self.solve_with_cache(samples, &mut cache)
    }

    /// Solve with an externally managed kernel cache
    ///
    /// The cache must be empty or hold rows computed for exactly these samples.
    pub fn solve_with_cache(
        &self,
        samples: &[Sample],
        cache: &mut KernelCache,
    ) -> Result<OptimizationResult> {
        self.validate(samples)?;

        let n = samples.len();
        let mut state = SolverState {
            y: samples.iter().map(|s| s.label).collect(),
            alpha: vec![0.0; n],
            grad: vec![-1.0; n],
            diag: samples
                .iter()
                .map(|s| self.kernel.compute(&s.features, &s.features))
                .collect(),
        };

        let mut iterations = 0;
        loop {
            if iterations >= self.config.max_iterations {
                warn!(
                    "SMO reached max_iterations={} before convergence (C={})",
                    self.config.max_iterations, self.config.c
                );
                break;
            }

            let Some((i, j)) = self.select_working_set(&state, samples, cache) else {
                break;
            };

            let k_i = self.kernel_row(cache, samples, i);
            let k_j = self.kernel_row(cache, samples, j);
            self.take_step(&mut state, i, j, &k_i, &k_j);

            iterations += 1;
        }

        let stats = cache.stats();
        debug!(
            "SMO finished after {} iterations (cache hits={}, misses={})",
            iterations, stats.hits, stats.misses
        );

        let b = self.calculate_bias(&state);
        let support_vectors: Vec<usize> = state
            .alpha
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| if a > 0.0 { Some(i) } else { None })
            .collect();
        let objective_value = self.calculate_objective(&state);

        Ok(OptimizationResult {
            alpha: state.alpha,
            b,
            support_vectors,
            iterations,
            objective_value,
        })
    }

    fn validate(&self, samples: &[Sample]) -> Result<()> {
        if samples.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        for sample in samples {
            if sample.label != 1.0 && sample.label != -1.0 {
                return Err(SVMError::InvalidLabel(sample.label));
            }
        }

        if !(self.config.c > 0.0 && self.config.c.is_finite()) {
            return Err(SVMError::InvalidParameter(format!(
                "C must be positive and finite, got: {}",
                self.config.c
            )));
        }
        if !(self.config.epsilon > 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "epsilon must be positive, got: {}",
                self.config.epsilon
            )));
        }

        let dim = samples[0].dim();
        if let Some(bad) = samples.iter().find(|s| s.dim() != dim) {
            return Err(SVMError::DimensionMismatch {
                expected: dim,
                actual: bad.dim(),
            });
        }

        let positives = samples.iter().filter(|s| s.label > 0.0).count();
        if positives == 0 || positives == samples.len() {
            return Err(SVMError::InvalidDataset(
                "training samples must contain both classes".to_string(),
            ));
        }

        Ok(())
    }

    fn kernel_row(&self, cache: &mut KernelCache, samples: &[Sample], i: usize) -> Arc<[f64]> {
        cache.get_or_compute(i, || {
            let x_i = &samples[i].features;
            samples
                .iter()
                .map(|s| self.kernel.compute(x_i, &s.features))
                .collect()
        })
    }

    /// αₜ may still increase along the direction yₜ
    fn in_up(&self, state: &SolverState, t: usize) -> bool {
        if state.y[t] > 0.0 {
            state.alpha[t] < self.config.c
        } else {
            state.alpha[t] > 0.0
        }
    }

    /// αₜ may still decrease along the direction yₜ
    fn in_low(&self, state: &SolverState, t: usize) -> bool {
        if state.y[t] > 0.0 {
            state.alpha[t] > 0.0
        } else {
            state.alpha[t] < self.config.c
        }
    }

    /// Select the working pair, or `None` once the KKT gap is below epsilon
    fn select_working_set(
        &self,
        state: &SolverState,
        samples: &[Sample],
        cache: &mut KernelCache,
    ) -> Option<(usize, usize)> {
        let n = state.alpha.len();

        let mut g_max = f64::NEG_INFINITY;
        let mut i_sel = None;
        for t in 0..n {
            if self.in_up(state, t) {
                let v = -state.y[t] * state.grad[t];
                if v >= g_max {
                    g_max = v;
                    i_sel = Some(t);
                }
            }
        }
        let i = i_sel?;
        let k_i = self.kernel_row(cache, samples, i);

        let mut g_min = f64::INFINITY;
        let mut obj_min = f64::INFINITY;
        let mut j_sel = None;
        for t in 0..n {
            if !self.in_low(state, t) {
                continue;
            }
            let v = -state.y[t] * state.grad[t];
            g_min = g_min.min(v);

            let b = g_max - v;
            if b > 0.0 {
                let mut a = state.diag[i] + state.diag[t] - 2.0 * k_i[t];
                if a <= 0.0 {
                    a = TAU;
                }
                let obj = -(b * b) / a;
                if obj <= obj_min {
                    obj_min = obj;
                    j_sel = Some(t);
                }
            }
        }

        if g_max - g_min < self.config.epsilon {
            return None;
        }
        j_sel.map(|j| (i, j))
    }

    /// Analytically optimize αᵢ, αⱼ and refresh the gradient
    fn take_step(&self, state: &mut SolverState, i: usize, j: usize, k_i: &[f64], k_j: &[f64]) {
        let c = self.config.c;
        let (y_i, y_j) = (state.y[i], state.y[j]);
        let q_ij = y_i * y_j * k_i[j];
        let old_alpha_i = state.alpha[i];
        let old_alpha_j = state.alpha[j];
        let alpha = &mut state.alpha;

        if y_i != y_j {
            let mut quad = state.diag[i] + state.diag[j] + 2.0 * q_ij;
            if quad <= 0.0 {
                quad = TAU;
            }
            let delta = (-state.grad[i] - state.grad[j]) / quad;
            let diff = alpha[i] - alpha[j];
            alpha[i] += delta;
            alpha[j] += delta;

            if diff > 0.0 {
                if alpha[j] < 0.0 {
                    alpha[j] = 0.0;
                    alpha[i] = diff;
                }
            } else if alpha[i] < 0.0 {
                alpha[i] = 0.0;
                alpha[j] = -diff;
            }

            if diff > 0.0 {
                if alpha[i] > c {
                    alpha[i] = c;
                    alpha[j] = c - diff;
                }
            } else if alpha[j] > c {
                alpha[j] = c;
                alpha[i] = c + diff;
            }
        } else {
            let mut quad = state.diag[i] + state.diag[j] - 2.0 * q_ij;
            if quad <= 0.0 {
                quad = TAU;
            }
            let delta = (state.grad[i] - state.grad[j]) / quad;
            let sum = alpha[i] + alpha[j];
            alpha[i] -= delta;
            alpha[j] += delta;

            if sum > c {
                if alpha[i] > c {
                    alpha[i] = c;
                    alpha[j] = sum - c;
                }
            } else if alpha[j] < 0.0 {
                alpha[j] = 0.0;
                alpha[i] = sum;
            }

            if sum > c {
                if alpha[j] > c {
                    alpha[j] = c;
                    alpha[i] = sum - c;
                }
            } else if alpha[i] < 0.0 {
                alpha[i] = 0.0;
                alpha[j] = sum;
            }
        }

        let delta_i = alpha[i] - old_alpha_i;
        let delta_j = alpha[j] - old_alpha_j;
        for (k, g) in state.grad.iter_mut().enumerate() {
            *g += state.y[k] * (y_i * k_i[k] * delta_i + y_j * k_j[k] * delta_j);
        }
    }

    /// Bias from free support vectors, else the midpoint of the feasible range
    fn calculate_bias(&self, state: &SolverState) -> f64 {
        let c = self.config.c;
        let mut upper = f64::INFINITY;
        let mut lower = f64::NEG_INFINITY;
        let mut free_sum = 0.0;
        let mut free_count = 0usize;

        for ((&a, &y), &g) in state.alpha.iter().zip(&state.y).zip(&state.grad) {
            let yg = y * g;
            let at_upper = a >= c;
            let at_lower = a <= 0.0;
            if at_upper {
                if y < 0.0 {
                    upper = upper.min(yg);
                } else {
                    lower = lower.max(yg);
                }
            } else if at_lower {
                if y > 0.0 {
                    upper = upper.min(yg);
                } else {
                    lower = lower.max(yg);
                }
            } else {
                free_sum += yg;
                free_count += 1;
            }
        }

        let rho = if free_count > 0 {
            free_sum / free_count as f64
        } else {
            match (upper.is_finite(), lower.is_finite()) {
                (true, true) => (upper + lower) / 2.0,
                (true, false) => upper,
                (false, true) => lower,
                (false, false) => 0.0,
            }
        };

        -rho
    }

    /// Dual objective in maximisation form: Σαᵢ − ½ αᵀQα
    fn calculate_objective(&self, state: &SolverState) -> f64 {
        state
            .alpha
            .iter()
            .zip(&state.grad)
            .map(|(&a, &g)| a * (1.0 - g))
            .sum::<f64>()
            / 2.0
    }
}
