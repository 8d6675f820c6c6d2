//! RBF support vector machine experiment on the UCI Breast Cancer Wisconsin data
//!
//! Downloads and cleans the dataset, grid-searches `C` and `gamma` with
//! stratified cross-validation, evaluates the best model on a held-out test
//! set and plots the search surface.

pub mod api;
pub mod cache;
pub mod config;
pub mod core;
pub mod data;
pub mod experiment;
pub mod kernel;
pub mod model_selection;
pub mod optimizer;
pub mod persistence;
pub mod plot;
pub mod report;
pub mod solver;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{EvaluationMetrics, ModelInfo, TrainedModel, SVM};
pub use crate::cache::{CacheStats, KernelCache};
pub use crate::config::ExperimentConfig;
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{Result, SVMError};
pub use crate::data::{CSVDataset, WisconsinDataset};
pub use crate::experiment::{Experiment, ExperimentOutcome};
pub use crate::kernel::{Kernel, KernelType, LinearKernel, RBFKernel};
pub use crate::model_selection::{GridSearch, GridSearchResult, ParameterGrid};
pub use crate::optimizer::{SVMOptimizer, TrainedSVM};
pub use crate::report::Report;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
