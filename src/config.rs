//! Experiment configuration
//!
//! Every field has a default, so a JSON config file only needs the keys it
//! wants to change.

use crate::core::{OptimizerConfig, Result, SVMError};
use crate::data::{DATASET_URL, RAW_FILE_NAME};
use crate::model_selection::ParameterGrid;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Solver settings shared by every fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub epsilon: f64,
    pub max_iterations: usize,
    /// Kernel cache size in bytes
    pub cache_size: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        let defaults = OptimizerConfig::default();
        Self {
            epsilon: defaults.epsilon,
            max_iterations: defaults.max_iterations,
            cache_size: defaults.cache_size,
        }
    }
}

/// Settings for one run of the experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub dataset_url: String,
    /// Where the raw data file lives (downloaded if missing)
    pub data_path: PathBuf,
    /// Directory for plots, exports, report and model
    pub output_dir: PathBuf,
    /// Share of the cleaned samples held out for the final evaluation
    pub test_fraction: f64,
    pub seed: u64,
    pub folds: usize,
    pub grid: ParameterGrid,
    pub solver: SolverSettings,
    pub plots: bool,
    pub export_splits: bool,
    pub save_model: bool,
    pub save_report: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            dataset_url: DATASET_URL.to_string(),
            data_path: Path::new("data").join(RAW_FILE_NAME),
            output_dir: PathBuf::from("output"),
            test_fraction: 0.6,
            seed: 42,
            folds: 3,
            grid: ParameterGrid::default(),
            solver: SolverSettings::default(),
            plots: true,
            export_splits: true,
            save_model: false,
            save_report: false,
        }
    }
}

impl ExperimentConfig {
    /// Load a JSON config file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges before any work is done
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(SVMError::InvalidParameter(format!(
                "test_fraction must be between 0 and 1, got: {}",
                self.test_fraction
            )));
        }
        if self.folds < 2 {
            return Err(SVMError::InvalidParameter(format!(
                "folds must be at least 2, got: {}",
                self.folds
            )));
        }
        if !(self.solver.epsilon > 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "solver epsilon must be positive, got: {}",
                self.solver.epsilon
            )));
        }
        self.grid.validate()
    }

    /// Solver configuration for a given C
    pub fn optimizer_config(&self, c: f64) -> OptimizerConfig {
        OptimizerConfig {
            c,
            epsilon: self.solver.epsilon,
            max_iterations: self.solver.max_iterations,
            cache_size: self.solver.cache_size,
        }
    }

    pub fn heatmap_path(&self) -> PathBuf {
        self.output_dir.join("heatmap.svg")
    }

    pub fn accuracy_plot_path(&self) -> PathBuf {
        self.output_dir.join("accuracy_vs_c.svg")
    }

    pub fn train_csv_path(&self) -> PathBuf {
        self.output_dir.join("breast-cancer-train.csv")
    }

    pub fn test_csv_path(&self) -> PathBuf {
        self.output_dir.join("breast-cancer-test.csv")
    }

    pub fn model_path(&self) -> PathBuf {
        self.output_dir.join("model.json")
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join("report.json")
    }
}
