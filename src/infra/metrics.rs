// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records evaluation metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:           0-based epoch index
//   - train_loss:      mean loss over the epoch's fit pass
//   - accuracy:        fraction of test examples classified correctly
//   - macro_precision, macro_recall, macro_f1
//   - examples:        size of the test set
//
// Example CSV output:
//   epoch,train_loss,accuracy,macro_precision,macro_recall,macro_f1,examples
//   0,1.902113,0.312000,0.208341,0.297143,0.221084,1500
//   1,1.651902,0.418667,0.391620,0.402857,0.360517,1500
//   ...
//
// The header is written only when the file is new, so repeated
// runs append to the same log.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use crate::domain::evaluation::EpochReport;
use crate::domain::traits::ReportSink;

/// One row of metrics data for a single epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,

    /// NaN when the training set was empty
    pub train_loss: f64,

    pub accuracy: f64,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_f1: f64,

    /// Number of test examples behind the metrics
    pub examples: usize,
}

impl From<&EpochReport> for EpochMetrics {
    fn from(report: &EpochReport) -> Self {
        let eval = &report.evaluation;
        Self {
            epoch: report.epoch,
            train_loss: report.fit.mean_loss,
            accuracy: eval.accuracy(),
            macro_precision: eval.macro_precision(),
            macro_recall: eval.macro_recall(),
            macro_f1: eval.macro_f1(),
            examples: eval.num_examples(),
        }
    }
}

/// Appends epoch metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
    writer: csv::Writer<fs::File>,
}

impl MetricsLogger {
    /// Open (or create) the CSV log at `path`, creating parent directories.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let csv_path = path.as_ref().to_path_buf();

        if let Some(dir) = csv_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("cannot create directory '{}'", dir.display()))?;
        }

        // Header only for a new or empty file
        let is_new = fs::metadata(&csv_path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&csv_path)
            .with_context(|| format!("cannot open metrics log '{}'", csv_path.display()))?;

        let writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);

        if is_new {
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path, writer })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&mut self, m: &EpochMetrics) -> Result<()> {
        self.writer.serialize(m)?;
        self.writer.flush()?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, accuracy={:.4}",
            m.epoch,
            m.train_loss,
            m.accuracy,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

impl ReportSink for MetricsLogger {
    fn record(&mut self, report: &EpochReport) -> Result<()> {
        self.log(&EpochMetrics::from(report))
            .with_context(|| format!("cannot write to '{}'", self.csv_path.display()))
    }
}
