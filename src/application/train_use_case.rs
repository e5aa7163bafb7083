// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load and check the schema       (Layer 3 - domain)
//   Step 2: Open the CSV rows lazily        (Layer 4 - data)
//   Step 3: Transform, then split by count  (Layer 4 - data)
//   Step 4: Assemble datasets + iterators   (Layer 4 - data)
//   Step 5: Initialise the network          (Layer 5 - ml)
//   Step 6: Attach report sinks             (Layer 6 - infra)
//   Step 7: Run the epoch loop              (Layer 5 - ml)
//
// Steps 1-3 are shared with the `inspect` command through
// prepare_splits().
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{Context, Result};
use burn::backend::{Autodiff, NdArray};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{
    dataset::SensorDataset,
    loader::{CsvRecordSource, MalformedRowPolicy},
    splitter::split_stream,
    transformer::SchemaTransformer,
};
use crate::domain::{
    error::{PipelineError, PipelineResult},
    evaluation::EpochReport,
    record::TransformedRow,
    schema::{ColumnKind, Schema},
    traits::ReportSink,
};
use crate::infra::{console::ConsoleSink, metrics::MetricsLogger};
use crate::ml::{
    model::SensorClassifierConfig,
    network::{Network, NetworkConfig},
    trainer::run_epochs,
};

/// CPU backend with automatic differentiation for training.
type TrainBackend = Autodiff<NdArray>;

// ─── Training Configuration ──────────────────────────────────────────────────
// All run parameters in one place. Built from CLI flags; serialised
// to JSON in the debug log so every run records its settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub data_path: PathBuf,
    /// JSON schema; the activity-recognition layout when absent.
    pub schema_path: Option<PathBuf>,
    pub skip_lines: usize,
    pub delimiter: char,
    /// Rows [0, train_count) train, the rest test.
    pub train_count: usize,
    pub epochs: usize,
    pub label_column: usize,
    pub num_classes: usize,
    pub hidden_units: usize,
    pub learning_rate: f64,
    pub momentum: f64,
    pub seed: u64,
    /// None trains and evaluates on the whole split in one batch.
    pub batch_size: Option<usize>,
    pub score_interval: usize,
    pub malformed_rows: MalformedRowPolicy,
    pub metrics_csv: Option<PathBuf>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/arem.csv"),
            schema_path: None,
            skip_lines: 1,
            delimiter: ',',
            train_count: 7000,
            epochs: 10,
            label_column: 6,
            num_classes: 7,
            hidden_units: 20,
            learning_rate: 1e-3,
            momentum: 0.9,
            seed: 1234,
            batch_size: None,
            score_interval: 10,
            malformed_rows: MalformedRowPolicy::Abort,
            metrics_csv: None,
        }
    }
}

impl TrainConfig {
    /// The schema file if one is configured, otherwise the built-in layout.
    pub fn load_schema(&self) -> PipelineResult<Schema> {
        match &self.schema_path {
            Some(path) => Schema::from_json_file(path),
            None => Ok(Schema::activity_recognition()),
        }
    }

    /// Check the run parameters against each other and against `schema`.
    pub fn validate(&self, schema: &Schema) -> PipelineResult<()> {
        let fail = |msg: String| Err(PipelineError::Config(msg));

        if self.epochs == 0 {
            return fail("epochs must be at least 1".into());
        }
        if self.num_classes == 0 {
            return fail("num_classes must be at least 1".into());
        }
        if self.hidden_units == 0 {
            return fail("hidden_units must be at least 1".into());
        }
        if !(self.learning_rate > 0.0) {
            return fail(format!("learning_rate must be positive, got {}", self.learning_rate));
        }
        if !self.delimiter.is_ascii() {
            return fail(format!("delimiter {:?} is not a single-byte character", self.delimiter));
        }
        if schema.num_columns() < 2 {
            return fail("the schema needs at least one feature column besides the label".into());
        }

        let label = schema.column(self.label_column).ok_or_else(|| {
            PipelineError::Config(format!(
                "label column {} is outside the schema's {} columns",
                self.label_column,
                schema.num_columns()
            ))
        })?;

        match &label.kind {
            ColumnKind::Categorical { vocabulary } if vocabulary.len() == self.num_classes => Ok(()),
            ColumnKind::Categorical { vocabulary } => fail(format!(
                "num_classes is {} but label column '{}' has {} categories",
                self.num_classes,
                label.name,
                vocabulary.len()
            )),
            _ => fail(format!("label column '{}' is not categorical", label.name)),
        }
    }

    pub fn record_source(&self, schema: &Schema) -> CsvRecordSource {
        CsvRecordSource::new(&self.data_path, schema.num_columns())
            .with_skip_lines(self.skip_lines)
            .with_delimiter(self.delimiter as u8)
            .with_policy(self.malformed_rows)
    }
}

// ─── Shared Preparation ──────────────────────────────────────────────────────
/// Both splits after transformation, with the transformer that produced them.
#[derive(Debug, Clone)]
pub struct PreparedSplits {
    pub transformer: SchemaTransformer,
    pub train: Vec<TransformedRow>,
    pub test: Vec<TransformedRow>,
}

/// Read, transform and split; everything before dataset assembly.
///
/// Rows stream from the file through the transformer into the
/// splitter, so a malformed row dropped under `Skip` never counts
/// toward `train_count`, whichever stage rejected it.
pub fn prepare_splits(cfg: &TrainConfig, schema: &Schema) -> Result<PreparedSplits> {
    let source = cfg.record_source(schema);
    let transformer = SchemaTransformer::new(schema.clone())?.with_policy(cfg.malformed_rows);

    // ── Step 2: Open the CSV rows lazily ─────────────────────────────────────
    let rows = source
        .rows()
        .with_context(|| format!("cannot read '{}'", cfg.data_path.display()))?;

    // ── Step 3: Transform row by row, then split by position ─────────────────
    let (train, test) = split_stream(transformer.transform_iter(rows), cfg.train_count)
        .with_context(|| format!("cannot load '{}'", cfg.data_path.display()))?;
    tracing::info!("Split: {} train, {} test", train.len(), test.len());

    Ok(PreparedSplits {
        transformer,
        train,
        test,
    })
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end, printing each epoch.
    pub fn execute(&self) -> Result<Vec<EpochReport>> {
        self.execute_with(ConsoleSink::stdout())
    }

    /// Same as `execute`, reporting to `console` instead of stdout.
    pub fn execute_with<S: ReportSink + 'static>(&self, console: S) -> Result<Vec<EpochReport>> {
        let cfg = &self.config;

        // ── Step 1: Load and check the schema ────────────────────────────────
        let schema = cfg.load_schema().context("cannot load the schema")?;
        cfg.validate(&schema).context("invalid training configuration")?;
        let class_names = match &schema.columns()[cfg.label_column].kind {
            ColumnKind::Categorical { vocabulary } => vocabulary.clone(),
            _ => Vec::new(),
        };

        tracing::debug!("Run configuration: {}", serde_json::to_string(cfg)?);
        tracing::info!("Input data schema:\n{}", schema);

        // ── Steps 2-3: Read, transform, split ────────────────────────────────
        let splits = prepare_splits(cfg, &schema)?;
        tracing::info!(
            "Final data schema after transformation:\n{}",
            splits.transformer.final_schema()
        );

        // ── Step 4: Assemble datasets and their iterators ────────────────────
        let train_set = SensorDataset::assemble(&splits.train, cfg.label_column, cfg.num_classes)
            .context("cannot assemble the training set")?;
        let test_set = SensorDataset::assemble(&splits.test, cfg.label_column, cfg.num_classes)
            .context("cannot assemble the test set")?;
        let mut train_iter = train_set.iter_batches(cfg.batch_size);
        let mut test_iter = test_set.iter_batches(cfg.batch_size);

        // ── Step 5: Initialise the network ───────────────────────────────────
        let num_features = schema.num_columns() - 1;
        let network_cfg = NetworkConfig::new(SensorClassifierConfig::new(
            num_features,
            cfg.hidden_units,
            cfg.num_classes,
        ))
        .with_learning_rate(cfg.learning_rate)
        .with_momentum(cfg.momentum)
        .with_seed(cfg.seed)
        .with_score_interval(cfg.score_interval);

        let mut network =
            Network::<TrainBackend>::new(network_cfg, Default::default()).with_class_names(class_names);
        network.init();

        // ── Step 6: Attach report sinks ──────────────────────────────────────
        let mut sinks: Vec<Box<dyn ReportSink>> = vec![Box::new(console)];
        if let Some(path) = &cfg.metrics_csv {
            sinks.push(Box::new(MetricsLogger::new(path)?));
            tracing::info!("Logging metrics to '{}'", path.display());
        }

        // ── Step 7: Run the epoch loop ───────────────────────────────────────
        run_epochs(&mut network, &mut train_iter, &mut test_iter, cfg.epochs, &mut sinks)
    }
}
