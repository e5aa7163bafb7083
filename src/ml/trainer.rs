// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Fixed number of epochs, strictly in order:
//
//   for epoch in 0..epochs:
//       fit(train)          ← model rewinds the train iterator itself
//       evaluate(test)      ← sees the parameters from this epoch's fit
//       sink.record(report)
//       test.reset()        ← ready for the next evaluation
//
// No early stopping and no convergence check. The model is
// never re-initialised between epochs; training continues from
// the previous epoch's parameters.

use anyhow::{Context, Result};

use crate::domain::evaluation::EpochReport;
use crate::domain::traits::{BatchIterator, Classifier, ReportSink};

pub fn run_epochs<M, Tr, Te, S>(
    model: &mut M,
    train: &mut Tr,
    test: &mut Te,
    epochs: usize,
    sink: &mut S,
) -> Result<Vec<EpochReport>>
where
    M: Classifier,
    Tr: BatchIterator<Item = M::Batch>,
    Te: BatchIterator<Item = M::Batch>,
    S: ReportSink + ?Sized,
{
    tracing::info!(
        "Training for {} epochs ({} train / {} test examples)",
        epochs,
        train.total_examples(),
        test.total_examples()
    );

    let mut reports = Vec::with_capacity(epochs);

    for epoch in 0..epochs {
        tracing::info!("EPOCH: {}", epoch);

        let fit = model
            .fit(train)
            .with_context(|| format!("training failed in epoch {epoch}"))?;

        let evaluation = model
            .evaluate(test)
            .with_context(|| format!("evaluation failed in epoch {epoch}"))?;

        let report = EpochReport {
            epoch,
            fit,
            evaluation,
        };
        sink.record(&report)
            .with_context(|| format!("cannot record the report for epoch {epoch}"))?;

        test.reset();

        tracing::debug!(
            "Epoch {} done: train_loss={:.4} accuracy={:.4}",
            epoch,
            report.fit.mean_loss,
            report.evaluation.accuracy()
        );
        reports.push(report);
    }

    tracing::info!("Training complete!");
    Ok(reports)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    use crate::domain::error::PipelineResult;
    use crate::domain::evaluation::{EvaluationReport, FitSummary};

    /// Shared call log so the iterators and the model can be checked together.
    type Log = Rc<RefCell<Vec<String>>>;

    struct CountingIter {
        name: &'static str,
        len: usize,
        cursor: usize,
        log: Log,
    }

    impl Iterator for CountingIter {
        type Item = usize;

        fn next(&mut self) -> Option<usize> {
            if self.cursor >= self.len {
                return None;
            }
            self.cursor += 1;
            Some(self.cursor - 1)
        }
    }

    impl BatchIterator for CountingIter {
        fn reset(&mut self) {
            self.log.borrow_mut().push(format!("reset:{}", self.name));
            self.cursor = 0;
        }

        fn batch_size(&self) -> usize {
            1
        }

        fn total_examples(&self) -> usize {
            self.len
        }
    }

    struct CountingModel {
        log: Log,
        fit_passes: usize,
        fail_evaluate: bool,
    }

    impl Classifier for CountingModel {
        type Batch = usize;

        fn fit<I: BatchIterator<Item = usize>>(&mut self, train: &mut I) -> PipelineResult<FitSummary> {
            train.reset();
            let seen = train.count();
            self.fit_passes += 1;
            self.log.borrow_mut().push("fit".to_string());
            Ok(FitSummary { iterations: seen, mean_loss: 1.0 / self.fit_passes as f64 })
        }

        fn evaluate<I: BatchIterator<Item = usize>>(&self, test: &mut I) -> PipelineResult<EvaluationReport> {
            if self.fail_evaluate {
                return Err(crate::domain::error::PipelineError::Config("boom".into()));
            }
            let seen = test.count();
            self.log
                .borrow_mut()
                .push(format!("evaluate:{}:{}", self.fit_passes, seen));
            Ok(EvaluationReport::empty(2))
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        epochs: Vec<usize>,
    }

    impl ReportSink for CollectingSink {
        fn record(&mut self, report: &EpochReport) -> Result<()> {
            self.epochs.push(report.epoch);
            Ok(())
        }
    }

    fn fixture(test_len: usize) -> (Log, CountingModel, CountingIter, CountingIter) {
        let log: Log = Rc::default();
        let model = CountingModel { log: log.clone(), fit_passes: 0, fail_evaluate: false };
        let train = CountingIter { name: "train", len: 5, cursor: 0, log: log.clone() };
        let test = CountingIter { name: "test", len: test_len, cursor: 0, log: log.clone() };
        (log, model, train, test)
    }

    #[test]
    fn test_three_epochs_call_sequence() {
        let (log, mut model, mut train, mut test) = fixture(3);
        let mut sink = CollectingSink::default();

        let reports = run_epochs(&mut model, &mut train, &mut test, 3, &mut sink).unwrap();

        let log = log.borrow();
        assert_eq!(log.iter().filter(|e| *e == "fit").count(), 3);
        assert_eq!(log.iter().filter(|e| e.starts_with("evaluate")).count(), 3);
        assert_eq!(log.iter().filter(|e| *e == "reset:test").count(), 3);

        // each evaluation follows its own epoch's fit and sees the full test set
        let evals: Vec<&String> = log.iter().filter(|e| e.starts_with("evaluate")).collect();
        assert_eq!(evals, vec!["evaluate:1:3", "evaluate:2:3", "evaluate:3:3"]);

        assert_eq!(sink.epochs, vec![0, 1, 2]);
        let epochs: Vec<usize> = reports.iter().map(|r| r.epoch).collect();
        assert_eq!(epochs, vec![0, 1, 2]);
        assert!(reports.iter().all(|r| r.fit.iterations == 5));
    }

    #[test]
    fn test_reset_follows_evaluate_each_epoch() {
        let (log, mut model, mut train, mut test) = fixture(2);
        run_epochs(&mut model, &mut train, &mut test, 2, &mut CollectingSink::default()).unwrap();

        let log = log.borrow();
        let order: Vec<&str> = log
            .iter()
            .filter(|e| e.as_str() != "reset:train")
            .map(|e| if e.starts_with("evaluate") { "evaluate" } else { e.as_str() })
            .collect();
        assert_eq!(
            order,
            vec!["fit", "evaluate", "reset:test", "fit", "evaluate", "reset:test"]
        );
    }

    #[test]
    fn test_empty_test_set_still_reports() {
        let (_log, mut model, mut train, mut test) = fixture(0);
        let mut sink = CollectingSink::default();

        let reports = run_epochs(&mut model, &mut train, &mut test, 2, &mut sink).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.evaluation.is_empty()));
    }

    #[test]
    fn test_zero_epochs_does_nothing() {
        let (log, mut model, mut train, mut test) = fixture(3);
        let reports = run_epochs(&mut model, &mut train, &mut test, 0, &mut CollectingSink::default()).unwrap();
        assert!(reports.is_empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_error_stops_the_loop() {
        let (_log, mut model, mut train, mut test) = fixture(3);
        model.fail_evaluate = true;
        let mut sink = CollectingSink::default();

        let err = run_epochs(&mut model, &mut train, &mut test, 3, &mut sink).unwrap_err();
        assert!(err.to_string().contains("epoch 0"));
        assert!(sink.epochs.is_empty());
    }
}
