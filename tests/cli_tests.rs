//! Integration tests for the CLI application
//!
//! These tests run the compiled binary against the bundled sample data file.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn sample_data_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/breast-cancer-sample.data")
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bcw-svm"))
        .args(args)
        .output()
        .expect("Failed to run CLI")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("Temp paths are valid UTF-8")
}

/// Run a small experiment that saves its model into `output_dir`
fn run_small_experiment(output_dir: &Path, extra: &[&str]) -> Output {
    let data = sample_data_path();
    let mut args = vec![
        "run",
        "--data",
        path_arg(&data),
        "--url",
        "not a url",
        "--output-dir",
        path_arg(output_dir),
        "--test-fraction",
        "0.3",
        "--c-values",
        "1,10,100",
        "--gamma-values",
        "0.01,0.1,1",
    ];
    args.extend_from_slice(extra);
    run_cli(&args)
}

#[test]
fn test_cli_run_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output_dir = temp_dir.path().join("out");

    let output = run_small_experiment(&output_dir, &["--save-report"]);

    assert!(
        output.status.success(),
        "Run command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Evaluated 9 parameter combinations"));
    assert!(stdout.contains("Precision"));
    assert!(output_dir.join("heatmap.svg").exists());
    assert!(output_dir.join("accuracy_vs_c.svg").exists());
    assert!(output_dir.join("breast-cancer-train.csv").exists());
    assert!(output_dir.join("report.json").exists());
    assert!(!output_dir.join("model.json").exists());
}

#[test]
fn test_cli_run_without_plots_or_exports() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output_dir = temp_dir.path().join("out");

    let output = run_small_experiment(&output_dir, &["--no-plots", "--no-export"]);

    assert!(
        output.status.success(),
        "Run command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(!output_dir.join("heatmap.svg").exists());
    assert!(!output_dir.join("breast-cancer-test.csv").exists());
}

#[test]
fn test_cli_split_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let data = sample_data_path();

    let output = run_cli(&[
        "split",
        "--data",
        path_arg(&data),
        "--output-dir",
        path_arg(temp_dir.path()),
        "--test-fraction",
        "0.5",
    ]);

    assert!(
        output.status.success(),
        "Split command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Clean samples: 86 (4 rows dropped"));
    assert!(stdout.contains("Training samples: 43"));
    assert!(temp_dir.path().join("breast-cancer-train.csv").exists());
    assert!(temp_dir.path().join("breast-cancer-test.csv").exists());
}

#[test]
fn test_cli_download_skips_existing_file() {
    let data = sample_data_path();

    let output = run_cli(&["download", "--data", path_arg(&data)]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("already exists"));
}

#[test]
fn test_cli_info_and_evaluate_commands() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output_dir = temp_dir.path().join("out");

    let run_output = run_small_experiment(&output_dir, &["--no-plots", "--save-model"]);
    assert!(run_output.status.success());

    let model_path = output_dir.join("model.json");
    assert!(model_path.exists(), "Model file was not created");

    let info_output = run_cli(&["info", path_arg(&model_path)]);
    assert!(
        info_output.status.success(),
        "Info command failed: {}",
        String::from_utf8_lossy(&info_output.stderr)
    );
    let info_stdout = String::from_utf8_lossy(&info_output.stdout);
    assert!(info_stdout.contains("SVM Model Summary"));
    assert!(info_stdout.contains("rbf"));
    assert!(info_stdout.contains("Dimensions: 9"));

    let test_csv = output_dir.join("breast-cancer-test.csv");
    let eval_output = run_cli(&[
        "evaluate",
        "--model",
        path_arg(&model_path),
        "--data",
        path_arg(&test_csv),
        "--detailed",
    ]);
    assert!(
        eval_output.status.success(),
        "Evaluate command failed: {}",
        String::from_utf8_lossy(&eval_output.stderr)
    );
    let eval_stdout = String::from_utf8_lossy(&eval_output.stdout);
    assert!(eval_stdout.contains("Samples:  26"));
    assert!(eval_stdout.contains("Specificity:"));

    // A CSV with an extra column is refused rather than scored
    let wide_csv = temp_dir.path().join("wide.csv");
    std::fs::write(&wide_csv, "1,1,1,1,1,1,1,1,1,1,-1\n9,9,9,9,9,9,9,9,9,9,1\n")
        .expect("Failed to write");
    let wide_output = run_cli(&[
        "evaluate",
        "--model",
        path_arg(&model_path),
        "--data",
        path_arg(&wide_csv),
    ]);
    assert_eq!(wide_output.status.code(), Some(1));
    assert!(!String::from_utf8_lossy(&wide_output.stdout).contains("Accuracy"));
}

#[test]
fn test_cli_error_handling() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    // Missing model file
    let output = run_cli(&["info", path_arg(&temp_dir.path().join("missing.json"))]);
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));

    // Invalid test fraction
    let data = sample_data_path();
    let output = run_cli(&[
        "split",
        "--data",
        path_arg(&data),
        "--output-dir",
        path_arg(temp_dir.path()),
        "--test-fraction",
        "1.5",
    ]);
    assert_eq!(output.status.code(), Some(1));

    // Cache size that does not fit in bytes
    let output = run_cli(&[
        "run",
        "--data",
        path_arg(&data),
        "--output-dir",
        path_arg(temp_dir.path()),
        "--cache-size",
        &usize::MAX.to_string(),
    ]);
    assert_eq!(output.status.code(), Some(1));

    // Missing data without a reachable URL
    let output = run_cli(&[
        "download",
        "--data",
        path_arg(&temp_dir.path().join("missing.data")),
        "--url",
        "not a url",
    ]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_cli_help() {
    let output = run_cli(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["run", "download", "split", "evaluate", "info"] {
        assert!(stdout.contains(command), "Help should list {command}");
    }
}
