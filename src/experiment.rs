//! The end-to-end experiment
//!
//! download -> clean/split -> scale -> grid search -> evaluate -> plot

use crate::api::SVM;
use crate::config::ExperimentConfig;
use crate::core::{Result, SVMError};
use crate::data::{
    download_dataset, train_test_split, write_csv, CSVDataset, DownloadStatus, TrainTestSplit,
    WisconsinDataset, CSV_HEADER,
};
use crate::model_selection::{GridSearch, GridSearchResult};
use crate::persistence::SerializableModel;
use crate::plot::{plot_accuracy_vs_c, plot_heatmap};
use crate::report::Report;
use crate::utils::scaling::{ScalingMethod, ScalingParams};
use crate::utils::validation::class_counts;
use log::info;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

/// Cleaned data split into training and test parts
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub split: TrainTestSplit,
    /// Samples left after dropping rows with missing values
    pub total_samples: usize,
    pub dropped_rows: usize,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct ExperimentOutcome {
    pub search: GridSearchResult,
    pub report: Report,
    /// Files written during the run
    pub artifacts: Vec<PathBuf>,
}

/// Runs the experiment described by an [`ExperimentConfig`]
pub struct Experiment {
    config: ExperimentConfig,
}

impl Experiment {
    pub fn new(config: ExperimentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Make sure the raw data file is present
    pub fn fetch(&self) -> Result<DownloadStatus> {
        download_dataset(&self.config.dataset_url, &self.config.data_path)
    }

    /// Fetch, clean and split the data
    pub fn prepare(&self) -> Result<PreparedData> {
        self.fetch()?;
        let dataset = WisconsinDataset::from_file(&self.config.data_path)?;
        let dropped_rows = dataset.dropped_rows();
        let samples = dataset.into_samples();

        let (malignant, benign) = class_counts(&samples);
        info!(
            "{} clean samples: {} malignant, {} benign",
            samples.len(),
            malignant,
            benign
        );

        let split = train_test_split(&samples, self.config.test_fraction, self.config.seed)?;
        info!(
            "Split into {} training and {} test samples",
            split.train.len(),
            split.test.len()
        );

        Ok(PreparedData {
            split,
            total_samples: samples.len(),
            dropped_rows,
        })
    }

    /// Write the train and test parts as CSV files in the output directory
    pub fn export_splits(&self, split: &TrainTestSplit) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.config.output_dir)?;
        let train_path = self.config.train_csv_path();
        let test_path = self.config.test_csv_path();

        write_csv(&train_path, &split.train, &CSV_HEADER)?;
        write_csv(&test_path, &split.test, &CSV_HEADER)?;
        info!(
            "Exported splits to {} and {}",
            train_path.display(),
            test_path.display()
        );

        Ok(vec![train_path, test_path])
    }

    /// Run the whole pipeline
    pub fn run(&self) -> Result<ExperimentOutcome> {
        let config = &self.config;
        fs::create_dir_all(&config.output_dir)?;
        let mut artifacts = Vec::new();

        let data = self.prepare()?;
        let split = &data.split;
        if config.export_splits {
            artifacts.extend(self.export_splits(split)?);
        }

        // The scaler only ever sees training data
        let scaler = ScalingParams::fit(&split.train, ScalingMethod::StandardScore)?;
        let train_scaled = scaler.transform_samples(&split.train)?;

        let search = GridSearch::new(config.grid.clone())
            .with_folds(config.folds)
            .with_optimizer_config(config.optimizer_config(1.0))
            .fit(&train_scaled)?;
        let best = search
            .best()
            .ok_or_else(|| SVMError::OptimizationError("grid search produced no scores".into()))?
            .clone();

        let model = SVM::with_rbf(best.gamma)?
            .with_c(best.c)
            .with_epsilon(config.solver.epsilon)
            .with_max_iterations(config.solver.max_iterations)
            .with_cache_size(config.solver.cache_size)
            .with_feature_scaling(ScalingMethod::StandardScore)
            .train_samples(&split.train)?;

        let test_set = CSVDataset::from_samples(split.test.clone())?;
        let confusion = model.evaluate_detailed(&test_set)?;
        let info = model.info();
        let report = Report::new(
            &best,
            confusion,
            data.total_samples,
            info.n_support_vectors,
            info.bias,
        );

        if config.plots {
            let heatmap = config.heatmap_path();
            plot_heatmap(&heatmap, &search)?;
            artifacts.push(heatmap);

            let accuracy = config.accuracy_plot_path();
            plot_accuracy_vs_c(&accuracy, &search)?;
            artifacts.push(accuracy);
        }

        if config.save_model {
            let path = config.model_path();
            SerializableModel::from_trained_model(&model).save_to_file(&path)?;
            info!("Saved model to {}", path.display());
            artifacts.push(path);
        }

        if config.save_report {
            let path = config.report_path();
            let writer = BufWriter::new(File::create(&path)?);
            serde_json::to_writer_pretty(writer, &report)?;
            info!("Saved report to {}", path.display());
            artifacts.push(path);
        }

        Ok(ExperimentOutcome {
            search,
            report,
            artifacts,
        })
    }
}
