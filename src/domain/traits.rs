// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams between the data layer, the model and the reports:
//
//   BatchIterator → a resettable batch cursor over a dataset
//   Classifier    → anything that can fit on one iterator and
//                   evaluate on another
//   ReportSink    → where per-epoch reports go (console, CSV, ...)
//
// The training loop is written against these traits only, so it
// runs the same against the burn network and against test doubles.

use anyhow::Result;

use crate::domain::error::PipelineResult;
use crate::domain::evaluation::{EpochReport, EvaluationReport, FitSummary};

// ─── BatchIterator ────────────────────────────────────────────────────────────
/// A stateful cursor yielding batches in a fixed, deterministic order.
///
/// `reset()` rewinds to the first batch without rebuilding the
/// underlying dataset. It must not be called while a fit or evaluate
/// pass is still consuming the iterator.
pub trait BatchIterator: Iterator {
    fn reset(&mut self);

    /// Examples per batch (the whole dataset for full-batch iteration).
    fn batch_size(&self) -> usize;

    /// Examples in one complete pass.
    fn total_examples(&self) -> usize;
}

// ─── Classifier ───────────────────────────────────────────────────────────────
/// A trainable multi-class model.
///
/// Implementations:
///   - Network<B> → the burn feed-forward network
pub trait Classifier {
    /// The batch type consumed from iterators.
    type Batch;

    /// One full pass over `train`, updating parameters in place.
    /// The iterator is rewound before the pass, so the same iterator
    /// can be handed to every epoch.
    fn fit<I>(&mut self, train: &mut I) -> PipelineResult<FitSummary>
    where
        I: BatchIterator<Item = Self::Batch>;

    /// A read-only pass over `test` from its current position.
    /// Callers reset the iterator before the next evaluation.
    fn evaluate<I>(&self, test: &mut I) -> PipelineResult<EvaluationReport>
    where
        I: BatchIterator<Item = Self::Batch>;
}

// ─── ReportSink ───────────────────────────────────────────────────────────────
/// Receives each epoch's report as soon as it is produced.
///
/// Implementations:
///   - ConsoleSink   → prints the evaluation stats
///   - MetricsLogger → appends a CSV row
pub trait ReportSink {
    fn record(&mut self, report: &EpochReport) -> Result<()>;
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn record(&mut self, report: &EpochReport) -> Result<()> {
        (**self).record(report)
    }
}

impl<S: ReportSink> ReportSink for Vec<S> {
    fn record(&mut self, report: &EpochReport) -> Result<()> {
        for sink in self.iter_mut() {
            sink.record(report)?;
        }
        Ok(())
    }
}
