//! Model serialization and persistence
//!
//! A saved model carries everything needed to classify raw feature vectors
//! again: the support vectors, their `alpha * y` weights, the bias, the
//! kernel description and the scaler fitted on the training data.

use crate::api::TrainedModel;
use crate::core::{OptimizerConfig, Result, SVMError, SVMModel, Sample};
use crate::kernel::{Kernel, KernelType};
use crate::optimizer::TrainedSVM;
use crate::utils::scaling::ScalingParams;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable representation of a trained SVM model
#[derive(Debug, Serialize, Deserialize)]
pub struct SerializableModel {
    /// Support vectors (in scaled feature space)
    pub support_vectors: Vec<SerializableSample>,
    /// Alpha values times labels (alpha_i * y_i)
    pub alpha_y: Vec<f64>,
    /// Bias term
    pub bias: f64,
    pub kernel: KernelType,
    /// Scaler to apply to raw inputs before the kernel
    pub scaling: Option<ScalingParams>,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Serializable sample representation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SerializableSample {
    pub features: Vec<f64>,
    pub label: f64,
}

/// Model metadata for tracking and validation
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Number of support vectors
    pub n_support_vectors: usize,
    /// Training parameters used
    pub training_params: TrainingParams,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

/// Training parameters for reference
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingParams {
    pub c: f64,
    pub epsilon: f64,
    pub max_iterations: usize,
}

impl From<&Sample> for SerializableSample {
    fn from(sample: &Sample) -> Self {
        Self {
            features: sample.features.clone(),
            label: sample.label,
        }
    }
}

impl From<&SerializableSample> for Sample {
    fn from(s: &SerializableSample) -> Self {
        Sample::new(s.features.clone(), s.label)
    }
}

impl SerializableModel {
    /// Create a serializable model from a trained model
    pub fn from_trained_model<K: Kernel>(model: &TrainedModel<K>) -> Self {
        let inner = model.inner();
        let config = model.config();

        let support_vectors: Vec<SerializableSample> = inner
            .support_vectors()
            .iter()
            .map(SerializableSample::from)
            .collect();

        let alpha_y: Vec<f64> = inner
            .alpha_values()
            .iter()
            .zip(inner.support_vectors().iter())
            .map(|(&alpha, sample)| alpha * sample.label)
            .collect();

        Self {
            support_vectors,
            alpha_y,
            bias: inner.bias(),
            kernel: inner.kernel().kernel_type(),
            scaling: model.scaling().cloned(),
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                n_support_vectors: inner.n_support_vectors(),
                training_params: TrainingParams {
                    c: config.c,
                    epsilon: config.epsilon,
                    max_iterations: config.max_iterations,
                },
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let model: Self = serde_json::from_reader(reader)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.alpha_y.len() != self.support_vectors.len() {
            return Err(SVMError::InvalidDataset(format!(
                "Model has {} support vectors but {} weights",
                self.support_vectors.len(),
                self.alpha_y.len()
            )));
        }
        if let Some(sv) = self
            .support_vectors
            .iter()
            .find(|sv| sv.label != 1.0 && sv.label != -1.0)
        {
            return Err(SVMError::InvalidLabel(sv.label));
        }

        let dim = self.support_vectors.first().map(|sv| sv.features.len());
        if let Some(dim) = dim {
            if let Some(sv) = self.support_vectors.iter().find(|sv| sv.features.len() != dim) {
                return Err(SVMError::DimensionMismatch {
                    expected: dim,
                    actual: sv.features.len(),
                });
            }
            if let Some(params) = &self.scaling {
                if params.dim() != dim {
                    return Err(SVMError::DimensionMismatch {
                        expected: params.dim(),
                        actual: dim,
                    });
                }
            }
        }
        Ok(())
    }

    /// Rebuild a model that can make predictions
    pub fn to_trained_model(&self) -> Result<TrainedModel<Box<dyn Kernel>>> {
        self.validate()?;
        let kernel = self.kernel.build()?;

        let support_vectors: Vec<Sample> = self.support_vectors.iter().map(Sample::from).collect();
        // labels are +-1, so alpha = alpha_y * y
        let alpha: Vec<f64> = self
            .alpha_y
            .iter()
            .zip(&support_vectors)
            .map(|(&ay, sv)| ay * sv.label)
            .collect();

        let params = &self.metadata.training_params;
        let config = OptimizerConfig {
            c: params.c,
            epsilon: params.epsilon,
            max_iterations: params.max_iterations,
            ..OptimizerConfig::default()
        };

        let model = TrainedSVM::from_parts(kernel, support_vectors, alpha, self.bias);
        Ok(TrainedModel::from_parts(model, self.scaling.clone(), config))
    }

    /// Print model summary
    pub fn print_summary(&self) {
        println!("=== SVM Model Summary ===");
        println!("Kernel: {}", self.kernel);
        println!("Support Vectors: {}", self.metadata.n_support_vectors);
        println!("Bias: {:.6}", self.bias);
        match &self.scaling {
            Some(params) => println!(
                "Feature Scaling: {:?} over {} features",
                params.method,
                params.dim()
            ),
            None => println!("Feature Scaling: none"),
        }
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        println!("Training Parameters:");
        println!("  C: {}", self.metadata.training_params.c);
        println!("  Epsilon: {}", self.metadata.training_params.epsilon);
        println!(
            "  Max Iterations: {}",
            self.metadata.training_params.max_iterations
        );
    }
}
