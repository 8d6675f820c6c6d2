//! bcw-svm command line interface
//!
//! Runs the breast cancer SVM experiment end to end, or any of its steps on
//! their own.

use bcw_svm::core::{Result, SVMError};
use bcw_svm::data::DownloadStatus;
use bcw_svm::experiment::Experiment;
use bcw_svm::persistence::SerializableModel;
use bcw_svm::{CSVDataset, ExperimentConfig, ParameterGrid};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "bcw-svm")]
#[command(about = "RBF SVM grid search on the Breast Cancer Wisconsin dataset")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full experiment: download, split, search, evaluate, plot
    Run(RunArgs),
    /// Download the raw dataset only
    Download(DataArgs),
    /// Clean the dataset and export train/test CSV files
    Split(DataArgs),
    /// Evaluate a saved model on a CSV file
    Evaluate(EvaluateArgs),
    /// Display saved model information
    Info(InfoArgs),
}

/// Options shared by every subcommand that touches the dataset
#[derive(Args)]
struct DataArgs {
    /// JSON experiment config; command line options override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Raw data file (downloaded here if missing)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Dataset URL
    #[arg(long)]
    url: Option<String>,

    /// Directory for plots, exports, report and model
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Share of samples held out for testing
    #[arg(long)]
    test_fraction: Option<f64>,

    /// Seed of the train/test shuffle
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Number of cross-validation folds
    #[arg(long)]
    folds: Option<usize>,

    /// Comma separated C values to search
    #[arg(long, value_delimiter = ',')]
    c_values: Option<Vec<f64>>,

    /// Comma separated gamma values to search
    #[arg(long, value_delimiter = ',')]
    gamma_values: Option<Vec<f64>>,

    /// Solver convergence tolerance
    #[arg(short, long)]
    epsilon: Option<f64>,

    /// Maximum solver iterations per fit
    #[arg(short, long)]
    max_iterations: Option<usize>,

    /// Kernel cache size in MB
    #[arg(long)]
    cache_size: Option<usize>,

    /// Skip writing the SVG plots
    #[arg(long)]
    no_plots: bool,

    /// Skip exporting the train/test CSV files
    #[arg(long)]
    no_export: bool,

    /// Save the final model as JSON
    #[arg(long)]
    save_model: bool,

    /// Save the report as JSON
    #[arg(long)]
    save_report: bool,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Test data file (CSV, last column is the label)
    #[arg(long)]
    data: PathBuf,

    /// Show detailed metrics
    #[arg(long)]
    detailed: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Run(args) => run_command(args),
        Commands::Download(args) => download_command(args),
        Commands::Split(args) => split_command(args),
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Info(args) => info_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn load_config(args: &DataArgs) -> Result<ExperimentConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            ExperimentConfig::from_file(path)?
        }
        None => ExperimentConfig::default(),
    };

    if let Some(data) = &args.data {
        config.data_path = data.clone();
    }
    if let Some(url) = &args.url {
        config.dataset_url = url.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(fraction) = args.test_fraction {
        config.test_fraction = fraction;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    Ok(config)
}

fn megabytes_to_bytes(mb: usize) -> Result<usize> {
    mb.checked_mul(1024 * 1024).ok_or_else(|| {
        SVMError::InvalidParameter(format!("cache size of {mb} MB is too large"))
    })
}

fn run_command(args: RunArgs) -> Result<()> {
    let mut config = load_config(&args.data)?;

    if let Some(folds) = args.folds {
        config.folds = folds;
    }
    if args.c_values.is_some() || args.gamma_values.is_some() {
        config.grid = ParameterGrid::new(
            args.c_values.unwrap_or(config.grid.c_values),
            args.gamma_values.unwrap_or(config.grid.gamma_values),
        )?;
    }
    if let Some(epsilon) = args.epsilon {
        config.solver.epsilon = epsilon;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.solver.max_iterations = max_iterations;
    }
    if let Some(cache_mb) = args.cache_size {
        config.solver.cache_size = megabytes_to_bytes(cache_mb)?;
    }
    config.plots &= !args.no_plots;
    config.export_splits &= !args.no_export;
    config.save_model |= args.save_model;
    config.save_report |= args.save_report;

    info!(
        "Searching {} C values x {} gamma values with {}-fold CV",
        config.grid.c_values.len(),
        config.grid.gamma_values.len(),
        config.folds
    );

    let experiment = Experiment::new(config)?;
    let outcome = experiment.run()?;

    println!("=== Grid Search ===");
    println!(
        "Evaluated {} parameter combinations with {}-fold cross-validation",
        outcome.search.entries.len(),
        outcome.search.n_folds
    );
    println!();
    println!("{}", outcome.report);

    if !outcome.artifacts.is_empty() {
        println!();
        println!("Written files:");
        for path in &outcome.artifacts {
            println!("  {}", path.display());
        }
    }

    Ok(())
}

fn download_command(args: DataArgs) -> Result<()> {
    let experiment = Experiment::new(load_config(&args)?)?;
    let path = experiment.config().data_path.clone();

    match experiment.fetch()? {
        DownloadStatus::Downloaded { bytes } => {
            println!("Downloaded {bytes} bytes to {}", path.display())
        }
        DownloadStatus::AlreadyPresent => {
            println!("{} already exists, nothing to do", path.display())
        }
    }

    Ok(())
}

fn split_command(args: DataArgs) -> Result<()> {
    let experiment = Experiment::new(load_config(&args)?)?;
    let data = experiment.prepare()?;
    let written = experiment.export_splits(&data.split)?;

    println!("=== Dataset Split ===");
    println!(
        "Clean samples: {} ({} rows dropped for missing values)",
        data.total_samples, data.dropped_rows
    );
    println!("Training samples: {}", data.split.train.len());
    println!(
        "Test samples: {} ({:.1}% of the cleaned dataset)",
        data.split.test.len(),
        data.split.test_share() * 100.0
    );
    for path in written {
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable_model = SerializableModel::load_from_file(&args.model)?;
    let model = serializable_model.to_trained_model()?;

    info!("Loading test data from: {:?}", args.data);
    let dataset = CSVDataset::from_file(&args.data)?;
    let metrics = model.evaluate_detailed(&dataset)?;

    println!("=== Model Evaluation ===");
    serializable_model.print_summary();

    println!("\nTest Results:");
    println!("  Samples:  {}", metrics.total());
    println!("  Accuracy: {:.2}%", metrics.accuracy() * 100.0);

    if args.detailed {
        println!("\nDetailed Metrics:");
        println!("  True Positives:  {}", metrics.true_positives);
        println!("  True Negatives:  {}", metrics.true_negatives);
        println!("  False Positives: {}", metrics.false_positives);
        println!("  False Negatives: {}", metrics.false_negatives);
        println!("  Precision:       {:.4}", metrics.precision());
        println!("  Recall:          {:.4}", metrics.recall());
        println!("  F1 Score:        {:.4}", metrics.f1_score());
        println!("  Specificity:     {:.4}", metrics.specificity());
    }

    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable_model = SerializableModel::load_from_file(&args.model)?;

    serializable_model.print_summary();

    println!("\nSupport Vector Details:");
    println!("  Total: {}", serializable_model.support_vectors.len());

    if let Some(first_sv) = serializable_model.support_vectors.first() {
        println!("  Dimensions: {}", first_sv.features.len());
        println!(
            "  First SV features: {:?}",
            &first_sv.features[..first_sv.features.len().min(5)]
        );

        if first_sv.features.len() > 5 {
            println!("    ... ({} more)", first_sv.features.len() - 5);
        }
    }

    println!("\nAlpha*Y values:");
    let alpha_y = &serializable_model.alpha_y;
    let n_show = alpha_y.len().min(10);
    for (i, &alpha_y_val) in alpha_y.iter().enumerate().take(n_show) {
        println!("  α{i}*y{i}: {alpha_y_val:.6}");
    }
    if alpha_y.len() > n_show {
        println!("  ... ({} more)", alpha_y.len() - n_show);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_megabytes_to_bytes() {
        assert_eq!(megabytes_to_bytes(0).unwrap(), 0);
        assert_eq!(megabytes_to_bytes(100).unwrap(), 100 * 1024 * 1024);
        assert!(matches!(
            megabytes_to_bytes(usize::MAX),
            Err(SVMError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_cli_parses_run_overrides() {
        let cli = Cli::try_parse_from([
            "bcw-svm",
            "run",
            "--c-values",
            "1,10",
            "--cache-size",
            "16",
            "--no-plots",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.c_values, Some(vec![1.0, 10.0]));
                assert_eq!(args.cache_size, Some(16));
                assert!(args.no_plots);
                assert!(args.gamma_values.is_none());
            }
            _ => panic!("Expected run command"),
        }
    }
}
