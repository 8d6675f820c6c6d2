//! Data acquisition, parsing and splitting
//!
//! This module fetches the raw Wisconsin data, turns it into labelled
//! samples and provides the train/test and cross-validation splitters.

pub mod csv;
pub mod download;
pub mod split;
pub mod wisconsin;

pub use self::csv::*;
pub use self::download::*;
pub use self::split::*;
pub use self::wisconsin::*;
