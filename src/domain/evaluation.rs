// ============================================================
// Layer 3 — Evaluation Report
// ============================================================
// Classification quality over one full pass of a test iterator.
//
// Everything is derived from a confusion matrix:
//
//                 predicted
//               0    1    2
//   actual 0 [ 12    1    0 ]
//          1 [  2    9    1 ]
//          2 [  0    0   15 ]
//
//   accuracy      = trace / total
//   precision(c)  = M[c][c] / column_sum(c)
//   recall(c)     = M[c][c] / row_sum(c)
//   f1(c)         = 2pr / (p + r)
//
// A per-class metric is undefined (None) when its denominator is
// zero. Macro averages only include classes where the metric is
// defined; with nothing defined they are 0. A report over zero
// examples is valid and reports 0 everywhere.

use std::fmt::Write as _;

use crate::domain::error::{PipelineError, PipelineResult};

/// Counts of (actual, predicted) class pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    num_classes: usize,
    counts: Vec<usize>,
}

impl ConfusionMatrix {
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            counts: vec![0; num_classes * num_classes],
        }
    }

    /// Count one example. Callers validate labels against the dataset first,
    /// so an out-of-range class here is a wiring error, not bad data.
    pub fn add(&mut self, actual: usize, predicted: usize) -> PipelineResult<()> {
        if let Some(class) = [actual, predicted].into_iter().find(|&c| c >= self.num_classes) {
            return Err(PipelineError::Config(format!(
                "class {} is outside the {}-class confusion matrix",
                class, self.num_classes
            )));
        }
        self.counts[actual * self.num_classes + predicted] += 1;
        Ok(())
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn count(&self, actual: usize, predicted: usize) -> usize {
        self.counts[actual * self.num_classes + predicted]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.num_classes).map(|c| self.count(c, c)).sum()
    }

    /// Number of examples whose actual class is `class`.
    pub fn actual_count(&self, class: usize) -> usize {
        (0..self.num_classes).map(|p| self.count(class, p)).sum()
    }

    /// Number of examples predicted as `class`.
    pub fn predicted_count(&self, class: usize) -> usize {
        (0..self.num_classes).map(|a| self.count(a, class)).sum()
    }
}

/// Per-class precision / recall / F1.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub name: String,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1: Option<f64>,
    pub support: usize,
}

/// Statistics for one evaluation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    confusion: ConfusionMatrix,
    classes: Vec<ClassMetrics>,
}

impl EvaluationReport {
    /// Build a report with class names "0", "1", ...
    pub fn from_confusion(confusion: ConfusionMatrix) -> Self {
        let names: Vec<String> = (0..confusion.num_classes()).map(|c| c.to_string()).collect();
        Self::with_class_names(confusion, &names)
    }

    /// Build a report labelling classes with `names`; missing names fall back to the index.
    pub fn with_class_names(confusion: ConfusionMatrix, names: &[String]) -> Self {
        let classes = (0..confusion.num_classes())
            .map(|c| {
                let tp = confusion.count(c, c) as f64;
                let support = confusion.actual_count(c);
                let predicted = confusion.predicted_count(c);

                let precision = (predicted > 0).then(|| tp / predicted as f64);
                let recall = (support > 0).then(|| tp / support as f64);
                let f1 = match (precision, recall) {
                    (Some(p), Some(r)) if p + r > 0.0 => Some(2.0 * p * r / (p + r)),
                    (Some(_), Some(_)) => Some(0.0),
                    _ => None,
                };

                ClassMetrics {
                    name: names.get(c).cloned().unwrap_or_else(|| c.to_string()),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        Self { confusion, classes }
    }

    /// An evaluation over zero examples.
    pub fn empty(num_classes: usize) -> Self {
        Self::from_confusion(ConfusionMatrix::new(num_classes))
    }

    pub fn is_empty(&self) -> bool {
        self.confusion.total() == 0
    }

    pub fn num_examples(&self) -> usize {
        self.confusion.total()
    }

    pub fn confusion(&self) -> &ConfusionMatrix {
        &self.confusion
    }

    pub fn classes(&self) -> &[ClassMetrics] {
        &self.classes
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.confusion.total();
        if total == 0 {
            0.0
        } else {
            self.confusion.correct() as f64 / total as f64
        }
    }

    pub fn macro_precision(&self) -> f64 {
        macro_average(self.classes.iter().map(|c| c.precision))
    }

    pub fn macro_recall(&self) -> f64 {
        macro_average(self.classes.iter().map(|c| c.recall))
    }

    pub fn macro_f1(&self) -> f64 {
        macro_average(self.classes.iter().map(|c| c.f1))
    }

    /// Human readable summary: headline metrics, per-class table and confusion matrix.
    pub fn stats(&self) -> String {
        let mut out = String::new();
        let n = self.confusion.num_classes();

        let _ = writeln!(out, "========================Evaluation Metrics========================");
        let _ = writeln!(out, " # of classes:    {}", n);
        let _ = writeln!(out, " # of examples:   {}", self.num_examples());
        if self.is_empty() {
            let _ = writeln!(out, " No data: the evaluation set is empty, all metrics are 0.");
            let _ = writeln!(out, "==================================================================");
            return out;
        }
        let _ = writeln!(out, " Accuracy:        {:.4}", self.accuracy());
        let _ = writeln!(out, " Precision:       {:.4}", self.macro_precision());
        let _ = writeln!(out, " Recall:          {:.4}", self.macro_recall());
        let _ = writeln!(out, " F1 Score:        {:.4}", self.macro_f1());
        let _ = writeln!(
            out,
            "Precision, recall & F1: macro-averaged over the classes where each is defined"
        );
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<12}{:>10}{:>10}{:>10}{:>10}",
            "class", "precision", "recall", "f1", "support"
        );
        for class in &self.classes {
            let _ = writeln!(
                out,
                "{:<12}{:>10}{:>10}{:>10}{:>10}",
                class.name,
                fmt_metric(class.precision),
                fmt_metric(class.recall),
                fmt_metric(class.f1),
                class.support
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "=========================Confusion Matrix=========================");
        let _ = write!(out, "{:>8}", "");
        for p in 0..n {
            let _ = write!(out, "{:>6}", p);
        }
        let _ = writeln!(out);
        for a in 0..n {
            let _ = write!(out, "{:>8}", a);
            for p in 0..n {
                let _ = write!(out, "{:>6}", self.confusion.count(a, p));
            }
            let _ = writeln!(out, " | {} = {}", a, self.classes[a].name);
        }
        let _ = writeln!(out, "==================================================================");
        out
    }
}

/// Outcome of one `fit` pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSummary {
    /// Parameter updates performed (one per batch).
    pub iterations: usize,
    /// Mean training loss over those updates, NaN when there were none.
    pub mean_loss: f64,
}

/// Everything produced by one epoch of the training loop.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochReport {
    /// 0-based epoch index.
    pub epoch: usize,
    pub fit: FitSummary,
    pub evaluation: EvaluationReport,
}

fn macro_average(values: impl Iterator<Item = Option<f64>>) -> f64 {
    let defined: Vec<f64> = values.flatten().collect();
    if defined.is_empty() {
        0.0
    } else {
        defined.iter().sum::<f64>() / defined.len() as f64
    }
}

fn fmt_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(pairs: &[(usize, usize)], num_classes: usize) -> ConfusionMatrix {
        let mut m = ConfusionMatrix::new(num_classes);
        for &(a, p) in pairs {
            m.add(a, p).unwrap();
        }
        m
    }

    #[test]
    fn test_accuracy_and_per_class_metrics() {
        // class 0: 2 right, 1 predicted as 1
        // class 1: 1 right
        let report = EvaluationReport::from_confusion(matrix(&[(0, 0), (0, 0), (0, 1), (1, 1)], 2));

        assert!((report.accuracy() - 0.75).abs() < 1e-9);
        let c0 = &report.classes()[0];
        assert_eq!(c0.precision, Some(1.0));
        assert!((c0.recall.unwrap() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(c0.support, 3);

        let c1 = &report.classes()[1];
        assert_eq!(c1.precision, Some(0.5));
        assert_eq!(c1.recall, Some(1.0));
        assert!((c1.f1.unwrap() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_undefined_metrics_excluded_from_macro() {
        // class 2 never appears and is never predicted
        let report = EvaluationReport::from_confusion(matrix(&[(0, 0), (1, 1)], 3));
        assert_eq!(report.classes()[2].precision, None);
        assert_eq!(report.classes()[2].recall, None);
        assert!((report.macro_precision() - 1.0).abs() < 1e-9);
        assert!((report.macro_f1() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_report_is_zero_valued() {
        let report = EvaluationReport::empty(7);
        assert!(report.is_empty());
        assert_eq!(report.num_examples(), 0);
        assert_eq!(report.accuracy(), 0.0);
        assert_eq!(report.macro_precision(), 0.0);
        assert_eq!(report.macro_recall(), 0.0);
        assert_eq!(report.macro_f1(), 0.0);
        assert!(report.stats().contains("No data"));
    }

    #[test]
    fn test_out_of_range_class_rejected() {
        let mut m = ConfusionMatrix::new(2);
        assert!(matches!(m.add(2, 0), Err(PipelineError::Config(_))));
        assert!(matches!(m.add(0, 5), Err(PipelineError::Config(_))));
        assert_eq!(m.total(), 0);
    }

    #[test]
    fn test_stats_uses_class_names() {
        let names = vec!["walking".to_string(), "standing".to_string()];
        let report = EvaluationReport::with_class_names(matrix(&[(0, 0), (1, 0)], 2), &names);
        let text = report.stats();
        assert!(text.contains("walking"));
        assert!(text.contains("Accuracy:        0.5000"));
    }
}
