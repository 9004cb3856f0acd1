use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gini_forest::data::csv::{load_csv, LabelColumn};
use gini_forest::data::dataset::Dataset;
use gini_forest::forests::classifier::RandomForestClassifier;
use gini_forest::metrics::confusion::{BinaryConfusion, ClassificationMetrics};
use gini_forest::trees::classifier::DecisionTreeClassifier;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LabelPosition {
    First,
    Last,
}

impl From<LabelPosition> for LabelColumn {
    fn from(position: LabelPosition) -> Self {
        match position {
            LabelPosition::First => LabelColumn::First,
            LabelPosition::Last => LabelColumn::Last,
        }
    }
}

#[derive(Parser)]
#[command(name = "evaluate-forest")]
#[command(about = "K-fold evaluation of a Gini decision tree and a bagged random forest")]
#[command(version)]
struct Cli {
    /// Numeric CSV file, one example per row
    data: PathBuf,

    /// Column holding the 0/1 class label
    #[arg(long, value_enum, default_value_t = LabelPosition::Last)]
    label_column: LabelPosition,

    /// Skip the first CSV row
    #[arg(long)]
    headers: bool,

    /// Number of cross-validation folds
    #[arg(long, default_value_t = 5)]
    folds: usize,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 5)]
    trees: usize,

    /// Depth limit for the tree and every forest member
    #[arg(long, default_value_t = 5, conflicts_with = "unbounded")]
    max_depth: u16,

    /// Grow trees until every leaf is pure
    #[arg(long)]
    unbounded: bool,

    /// Fraction of rows bootstrapped for each forest member
    #[arg(long, default_value_t = 0.5)]
    example_rate: f64,

    /// Fraction of columns sampled for each forest member
    #[arg(long, default_value_t = 0.5)]
    attribute_rate: f64,

    /// RNG seed for fold shuffling and bagging
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of threads for forest training (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Enable verbose (debug-level) logging
    #[arg(long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long)]
    quiet: bool,
}

fn report(model: &str, fold: usize, confusion: &BinaryConfusion) -> Option<f64> {
    let accuracy = confusion.accuracy().ok();
    match (accuracy, confusion.precision(), confusion.recall()) {
        (Some(accuracy), Ok(precision), Ok(recall)) => {
            info!(model, fold, accuracy, precision, recall, "fold scored")
        }
        (accuracy, precision, recall) => warn!(
            model,
            fold,
            ?accuracy,
            precision = ?precision.ok(),
            recall = ?recall.ok(),
            "fold scored with undefined metrics"
        ),
    }
    accuracy
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

fn evaluate(cli: &Cli, dataset: &Dataset<f64>) -> Result<()> {
    let max_depth = (!cli.unbounded).then_some(cli.max_depth);
    let folds = dataset
        .k_folds(cli.folds, Some(cli.seed))
        .context("failed to split folds")?;

    let mut tree_accuracies = Vec::with_capacity(folds.len());
    let mut forest_accuracies = Vec::with_capacity(folds.len());

    for (fold, (train, test)) in folds.iter().enumerate() {
        let mut tree = DecisionTreeClassifier::with_params(max_depth);
        tree.fit(train)?;
        let confusion = tree.confusion_matrix(&test.y, &tree.predict(&test.x)?)?;
        tree_accuracies.extend(report("tree", fold, &confusion));

        let mut forest = RandomForestClassifier::with_params(
            Some(cli.trees),
            max_depth,
            Some(cli.example_rate),
            Some(cli.attribute_rate),
        )?;
        forest.fit(train, Some(cli.seed.wrapping_add(fold as u64)))?;
        let confusion = forest.confusion_matrix(&test.y, &forest.predict(&test.x)?)?;
        forest_accuracies.extend(report("forest", fold, &confusion));
    }

    info!(
        folds = folds.len(),
        tree_accuracy = ?mean(&tree_accuracies),
        forest_accuracy = ?mean(&forest_accuracies),
        "cross-validation finished"
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    let dataset = load_csv(&cli.data, cli.label_column.into(), cli.headers)
        .with_context(|| format!("failed to load {}", cli.data.display()))?;
    info!(
        rows = dataset.nrows(),
        features = dataset.ncols(),
        "loaded dataset"
    );

    evaluate(&cli, &dataset)
}
