//! Integration tests for the bcw-svm library
//!
//! These run the experiment pipeline end to end on a small local copy of the
//! dataset format, so no network access is needed.

use bcw_svm::data::{train_test_split, StratifiedKFold, CSV_HEADER};
use bcw_svm::persistence::SerializableModel;
use bcw_svm::utils::scaling::{ScalingMethod, ScalingParams};
use bcw_svm::{
    CSVDataset, Dataset, Experiment, ExperimentConfig, GridSearch, KernelType, ParameterGrid,
    Sample, WisconsinDataset, BENIGN, MALIGNANT, SVM,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn sample_data_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/breast-cancer-sample.data")
}

fn small_grid() -> ParameterGrid {
    ParameterGrid::new(vec![1.0, 10.0, 100.0], vec![0.01, 0.1, 1.0]).expect("Valid grid")
}

fn local_config(output_dir: PathBuf) -> ExperimentConfig {
    ExperimentConfig {
        // The file exists, so nothing is downloaded
        dataset_url: "not a url".to_string(),
        data_path: sample_data_path(),
        output_dir,
        test_fraction: 0.3,
        grid: small_grid(),
        ..ExperimentConfig::default()
    }
}

#[test]
fn test_sample_file_parses() {
    let dataset = WisconsinDataset::from_file(sample_data_path()).expect("Should parse");

    assert_eq!(dataset.dropped_rows(), 4);
    assert_eq!(dataset.len(), 86);
    assert_eq!(dataset.dim(), 9);

    let malignant = dataset
        .as_samples()
        .iter()
        .filter(|s| s.label == MALIGNANT)
        .count();
    assert_eq!(malignant, 30);
    assert!(dataset
        .as_samples()
        .iter()
        .all(|s| s.label == MALIGNANT || s.label == BENIGN));
}

#[test]
fn test_full_experiment_run() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = ExperimentConfig {
        save_model: true,
        save_report: true,
        ..local_config(temp_dir.path().join("out"))
    };

    let experiment = Experiment::new(config.clone()).expect("Valid config");
    let outcome = experiment.run().expect("Experiment should succeed");

    // Search covered the whole grid
    assert_eq!(outcome.search.entries.len(), 9);
    assert_eq!(outcome.search.n_folds, 3);
    let best = outcome.search.best().expect("Should have a best entry");
    assert_eq!(best.fold_scores.len(), 3);
    assert!(outcome
        .search
        .entries
        .iter()
        .all(|entry| entry.mean_score <= best.mean_score));

    // Report describes the held-out evaluation
    let report = &outcome.report;
    assert_eq!(report.best_c, best.c);
    assert_eq!(report.best_gamma, best.gamma);
    assert_eq!(report.total_samples, 86);
    assert_eq!(report.test_samples, 26);
    assert_eq!(report.confusion.total(), 26);
    assert!(
        report.confusion.accuracy() >= 0.9,
        "Well separated classes should classify well, got: {}",
        report.confusion.accuracy()
    );
    assert!(report.n_support_vectors > 0);

    let rendered = report.to_string();
    assert!(rendered.contains("Precision"));
    assert!(rendered.contains("Specificity"));

    // Every artifact was written
    for path in [
        config.train_csv_path(),
        config.test_csv_path(),
        config.heatmap_path(),
        config.accuracy_plot_path(),
        config.model_path(),
        config.report_path(),
    ] {
        assert!(path.exists(), "Missing artifact: {}", path.display());
        assert!(outcome.artifacts.contains(&path));
    }

    let heatmap = std::fs::read_to_string(config.heatmap_path()).expect("Readable SVG");
    assert!(heatmap.contains("<svg"));

    // Exported splits are readable again with the same row counts
    let train = CSVDataset::from_file(config.train_csv_path()).expect("Train CSV");
    let test = CSVDataset::from_file(config.test_csv_path()).expect("Test CSV");
    assert_eq!(train.len(), 60);
    assert_eq!(test.len(), 26);
    assert_eq!(train.dim(), CSV_HEADER.len() - 1);
}

#[test]
fn test_run_without_outputs_writes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = ExperimentConfig {
        plots: false,
        export_splits: false,
        ..local_config(temp_dir.path().join("out"))
    };

    let outcome = Experiment::new(config)
        .expect("Valid config")
        .run()
        .expect("Experiment should succeed");

    assert!(outcome.artifacts.is_empty());
    let written = std::fs::read_dir(temp_dir.path().join("out"))
        .expect("Output dir exists")
        .count();
    assert_eq!(written, 0);
}

#[test]
fn test_saved_model_matches_report() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = ExperimentConfig {
        plots: false,
        save_model: true,
        ..local_config(temp_dir.path().join("out"))
    };

    let outcome = Experiment::new(config.clone())
        .expect("Valid config")
        .run()
        .expect("Experiment should succeed");

    let saved = SerializableModel::load_from_file(config.model_path()).expect("Model loads");
    assert_eq!(
        saved.kernel,
        KernelType::Rbf {
            gamma: outcome.report.best_gamma
        }
    );
    assert_eq!(saved.metadata.training_params.c, outcome.report.best_c);
    assert_eq!(
        saved.metadata.n_support_vectors,
        outcome.report.n_support_vectors
    );

    // The restored model scales raw rows itself and reproduces the test confusion matrix
    let restored = saved.to_trained_model().expect("Model rebuilds");
    let test = CSVDataset::from_file(config.test_csv_path()).expect("Test CSV");
    let confusion = restored.evaluate_detailed(&test).expect("Same dimension");
    assert_eq!(confusion, outcome.report.confusion);
}

#[test]
fn test_manual_pipeline_with_library_types() {
    let dataset = WisconsinDataset::from_file(sample_data_path()).expect("Should parse");
    let split = train_test_split(dataset.as_samples(), 0.5, 7).expect("Split");
    assert_eq!(split.test.len(), 43);
    assert_eq!(split.train.len() + split.test.len(), 86);

    let scaler = ScalingParams::fit(&split.train, ScalingMethod::StandardScore).expect("Fit");
    let train_scaled = scaler.transform_samples(&split.train).expect("Same dimension");

    let labels: Vec<f64> = train_scaled.iter().map(|s| s.label).collect();
    let folds = StratifiedKFold::new(3)
        .expect("Valid fold count")
        .split(&labels)
        .expect("Both classes have enough members");
    let covered: usize = folds.iter().map(|fold| fold.test.len()).sum();
    assert_eq!(covered, train_scaled.len());

    let result = GridSearch::new(small_grid())
        .fit(&train_scaled)
        .expect("Search");
    let best = result.best().expect("Best entry");
    assert!(best.mean_score > 0.8);

    let model = SVM::with_rbf(best.gamma)
        .expect("Valid gamma")
        .with_c(best.c)
        .with_feature_scaling(ScalingMethod::StandardScore)
        .train_samples(&split.train)
        .expect("Training");

    let clear_malignant = Sample::new(vec![10.0; 9], MALIGNANT);
    let clear_benign = Sample::new(vec![1.0; 9], BENIGN);
    let malignant = model.predict(&clear_malignant).expect("Nine features");
    let benign = model.predict(&clear_benign).expect("Nine features");
    assert_eq!(malignant.label, MALIGNANT);
    assert_eq!(benign.label, BENIGN);
}
