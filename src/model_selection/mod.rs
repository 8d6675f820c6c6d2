//! Hyperparameter search for the RBF SVM

pub mod grid;

pub use self::grid::*;
