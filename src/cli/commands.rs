// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `inspect`, and all
// their configurable flags.
//
// Both share DataArgs (where the data is and how to read it);
// `train` adds the model and optimiser settings.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::train_use_case::TrainConfig;
use crate::data::loader::MalformedRowPolicy;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the classifier and print evaluation stats after every epoch
    Train(TrainArgs),

    /// Read, split and transform the data, then print the schemas and split sizes
    Inspect(InspectArgs),
}

/// Input file and parsing options shared by both commands.
#[derive(Args, Debug)]
pub struct DataArgs {
    /// Delimited sensor data file
    #[arg(long, default_value = "data/arem.csv")]
    pub data: PathBuf,

    /// JSON schema file; the built-in activity-recognition schema when omitted
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Number of leading lines to skip (header)
    #[arg(long, default_value_t = 1)]
    pub skip_lines: usize,

    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Rows before this index train, the rest test
    #[arg(long, default_value_t = 7000)]
    pub train_count: usize,

    /// What to do with malformed rows: abort or skip
    #[arg(long, default_value_t = MalformedRowPolicy::Abort)]
    pub malformed_rows: MalformedRowPolicy,
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Zero-based index of the label column
    #[arg(long, default_value_t = 6)]
    pub label_column: usize,

    /// Number of classes; must match the label vocabulary
    #[arg(long, default_value_t = 7)]
    pub num_classes: usize,

    /// Width of the hidden layer
    #[arg(long, default_value_t = 20)]
    pub hidden_units: usize,

    #[arg(long, default_value_t = 1e-3)]
    pub learning_rate: f64,

    /// Nesterov momentum coefficient
    #[arg(long, default_value_t = 0.9)]
    pub momentum: f64,

    /// Seed for weight initialisation
    #[arg(long, default_value_t = 1234)]
    pub seed: u64,

    /// Examples per batch; the whole split when omitted
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Log the training loss every N iterations (0 disables)
    #[arg(long, default_value_t = 10)]
    pub score_interval: usize,

    /// Append per-epoch metrics to this CSV file
    #[arg(long)]
    pub metrics_csv: Option<PathBuf>,
}

/// All arguments for the `inspect` command
#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

impl DataArgs {
    /// Fill the data fields of `base`.
    fn apply(self, base: TrainConfig) -> TrainConfig {
        TrainConfig {
            data_path: self.data,
            schema_path: self.schema,
            skip_lines: self.skip_lines,
            delimiter: self.delimiter,
            train_count: self.train_count,
            malformed_rows: self.malformed_rows,
            ..base
        }
    }
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        a.data.apply(TrainConfig {
            epochs: a.epochs,
            label_column: a.label_column,
            num_classes: a.num_classes,
            hidden_units: a.hidden_units,
            learning_rate: a.learning_rate,
            momentum: a.momentum,
            seed: a.seed,
            batch_size: a.batch_size,
            score_interval: a.score_interval,
            metrics_csv: a.metrics_csv,
            ..TrainConfig::default()
        })
    }
}

impl From<InspectArgs> for TrainConfig {
    fn from(a: InspectArgs) -> Self {
        a.data.apply(TrainConfig::default())
    }
}
