//! Exhaustive grid search over `C` and `gamma` with stratified k-fold CV
//!
//! Every grid point is scored by the mean held-out accuracy over the folds.
//! Fits for the same fold and `gamma` share one kernel row cache, since only
//! `C` changes between them.

use crate::cache::KernelCache;
use crate::core::{OptimizerConfig, Result, SVMError, SVMModel, Sample};
use crate::data::{select, StratifiedKFold};
use crate::kernel::RBFKernel;
use crate::optimizer::{SVMOptimizer, TrainedSVM};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Candidate values for `C` and `gamma`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterGrid {
    pub c_values: Vec<f64>,
    pub gamma_values: Vec<f64>,
}

impl Default for ParameterGrid {
    /// Both parameters over `1e-5, 1e-4, ..., 1e5`
    fn default() -> Self {
        Self {
            c_values: logspace(-5, 5),
            gamma_values: logspace(-5, 5),
        }
    }
}

impl ParameterGrid {
    /// Create a grid, checking that both axes are non-empty and positive
    pub fn new(c_values: Vec<f64>, gamma_values: Vec<f64>) -> Result<Self> {
        let grid = Self {
            c_values,
            gamma_values,
        };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, values) in [("C", &self.c_values), ("gamma", &self.gamma_values)] {
            if values.is_empty() {
                return Err(SVMError::InvalidParameter(format!(
                    "{name} grid must not be empty"
                )));
            }
            if let Some(bad) = values.iter().find(|v| !(**v > 0.0 && v.is_finite())) {
                return Err(SVMError::InvalidParameter(format!(
                    "{name} values must be positive and finite, got: {bad}"
                )));
            }
        }
        Ok(())
    }

    /// Number of grid points
    pub fn len(&self) -> usize {
        self.c_values.len() * self.gamma_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grid points in C-major order
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.c_values
            .iter()
            .flat_map(move |&c| self.gamma_values.iter().map(move |&gamma| (c, gamma)))
    }
}

/// Powers of ten from `10^start` to `10^end` inclusive
pub fn logspace(start: i32, end: i32) -> Vec<f64> {
    (start..=end).map(|e| 10f64.powi(e)).collect()
}

/// Cross-validated score of one grid point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridEntry {
    pub c: f64,
    pub gamma: f64,
    pub mean_score: f64,
    /// Population standard deviation of the fold scores
    pub std_score: f64,
    pub fold_scores: Vec<f64>,
}

impl GridEntry {
    fn from_scores(c: f64, gamma: f64, fold_scores: Vec<f64>) -> Self {
        let n = fold_scores.len().max(1) as f64;
        let mean_score = fold_scores.iter().sum::<f64>() / n;
        let variance = fold_scores
            .iter()
            .map(|s| (s - mean_score).powi(2))
            .sum::<f64>()
            / n;

        Self {
            c,
            gamma,
            mean_score,
            std_score: variance.sqrt(),
            fold_scores,
        }
    }
}

/// Outcome of a grid search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSearchResult {
    pub c_values: Vec<f64>,
    pub gamma_values: Vec<f64>,
    pub n_folds: usize,
    /// One entry per grid point, C-major
    pub entries: Vec<GridEntry>,
}

impl GridSearchResult {
    /// Highest mean score; ties go to the earliest point in grid order
    pub fn best(&self) -> Option<&GridEntry> {
        self.entries.iter().fold(None, |best, entry| match best {
            Some(b) if b.mean_score >= entry.mean_score => Some(b),
            _ => Some(entry),
        })
    }

    /// Entry for the `i`-th C and `j`-th gamma value
    pub fn entry(&self, i: usize, j: usize) -> Option<&GridEntry> {
        if i < self.c_values.len() && j < self.gamma_values.len() {
            self.entries.get(i * self.gamma_values.len() + j)
        } else {
            None
        }
    }

    /// Mean scores as a matrix with one row per C and one column per gamma
    pub fn score_matrix(&self) -> Vec<Vec<f64>> {
        self.entries
            .chunks(self.gamma_values.len().max(1))
            .map(|row| row.iter().map(|e| e.mean_score).collect())
            .collect()
    }

    /// Mean scores across all C values for the `j`-th gamma
    pub fn scores_for_gamma(&self, j: usize) -> Vec<f64> {
        (0..self.c_values.len())
            .filter_map(|i| self.entry(i, j).map(|e| e.mean_score))
            .collect()
    }
}

/// Grid search driver
#[derive(Debug, Clone)]
pub struct GridSearch {
    grid: ParameterGrid,
    n_folds: usize,
    config: OptimizerConfig,
}

impl GridSearch {
    /// Search `grid` with 3 folds and default solver settings
    pub fn new(grid: ParameterGrid) -> Self {
        Self {
            grid,
            n_folds: 3,
            config: OptimizerConfig::default(),
        }
    }

    /// Set the number of cross-validation folds
    pub fn with_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }

    /// Solver settings for every fit; `c` is overwritten per grid point
    pub fn with_optimizer_config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn grid(&self) -> &ParameterGrid {
        &self.grid
    }

    /// Score every grid point on `samples`
    pub fn fit(&self, samples: &[Sample]) -> Result<GridSearchResult> {
        self.grid.validate()?;
        if samples.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        let labels: Vec<f64> = samples.iter().map(|s| s.label).collect();
        let folds = StratifiedKFold::new(self.n_folds)?.split(&labels)?;
        let fold_data: Vec<(Vec<Sample>, Vec<Sample>)> = folds
            .iter()
            .map(|f| (select(samples, &f.train), select(samples, &f.test)))
            .collect();

        let n_c = self.grid.c_values.len();
        let n_gamma = self.grid.gamma_values.len();
        info!(
            "Grid search: {} C values x {} gamma values, {}-fold CV on {} samples",
            n_c,
            n_gamma,
            self.n_folds,
            samples.len()
        );

        // scores[i][j] collects fold scores for (c_values[i], gamma_values[j])
        let mut scores = vec![vec![Vec::with_capacity(self.n_folds); n_gamma]; n_c];

        for (j, &gamma) in self.grid.gamma_values.iter().enumerate() {
            let kernel = RBFKernel::try_new(gamma)?;

            for (train, test) in &fold_data {
                let mut cache =
                    KernelCache::with_memory_limit(self.config.cache_size, train.len());

                for (i, &c) in self.grid.c_values.iter().enumerate() {
                    let config = OptimizerConfig {
                        c,
                        ..self.config.clone()
                    };
                    let optimizer = SVMOptimizer::new(kernel, config);
                    let score = match optimizer.train_samples_with_cache(train, &mut cache) {
                        Ok(model) => accuracy(&model, test),
                        Err(e) => {
                            warn!("Fit failed for C={c}, gamma={gamma}: {e}");
                            0.0
                        }
                    };
                    scores[i][j].push(score);
                }
                debug!(
                    "Kernel cache hit rate {:.1}% for gamma={gamma}",
                    cache.hit_rate() * 100.0
                );
            }

            debug!("Finished gamma={gamma} ({}/{n_gamma})", j + 1);
        }

        let entries: Vec<GridEntry> = scores
            .into_iter()
            .zip(&self.grid.c_values)
            .flat_map(|(row, &c)| {
                row.into_iter()
                    .zip(&self.grid.gamma_values)
                    .map(move |(fold_scores, &gamma)| {
                        GridEntry::from_scores(c, gamma, fold_scores)
                    })
            })
            .collect();

        let result = GridSearchResult {
            c_values: self.grid.c_values.clone(),
            gamma_values: self.grid.gamma_values.clone(),
            n_folds: self.n_folds,
            entries,
        };

        if let Some(best) = result.best() {
            info!(
                "Best parameters: C={}, gamma={} (mean accuracy {:.4})",
                best.c, best.gamma, best.mean_score
            );
        }

        Ok(result)
    }
}

fn accuracy(model: &TrainedSVM<RBFKernel>, test: &[Sample]) -> f64 {
    if test.is_empty() {
        return 0.0;
    }
    let correct = test
        .iter()
        .filter(|s| model.predict(s).label == s.label)
        .count();
    correct as f64 / test.len() as f64
}
