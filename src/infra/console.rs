use std::io::{self, Write};

use anyhow::Result;

use crate::domain::evaluation::EpochReport;
use crate::domain::traits::ReportSink;

/// Prints each epoch's evaluation stats to a writer (stdout by default).
pub struct ConsoleSink<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn record(&mut self, report: &EpochReport) -> Result<()> {
        writeln!(self.out, "EPOCH: {}", report.epoch)?;
        if report.fit.iterations > 0 {
            writeln!(
                self.out,
                "Training loss: {:.6} over {} iterations",
                report.fit.mean_loss, report.fit.iterations
            )?;
        }
        write!(self.out, "{}", report.evaluation.stats())?;
        self.out.flush()?;
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evaluation::{EvaluationReport, FitSummary};

    #[test]
    fn test_prints_epoch_header_and_stats() {
        let mut out = Vec::new();
        let mut sink = ConsoleSink::new(&mut out);
        let report = EpochReport {
            epoch: 2,
            fit: FitSummary { iterations: 0, mean_loss: f64::NAN },
            evaluation: EvaluationReport::empty(7),
        };
        sink.record(&report).unwrap();
        drop(sink);

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("EPOCH: 2\n"));
        assert!(text.contains("No data"));
        assert!(!text.contains("Training loss"));
    }
}
