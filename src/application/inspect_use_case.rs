// ============================================================
// Layer 2 — InspectUseCase
// ============================================================
// Runs the data half of the pipeline only (read, split,
// transform) and describes the result: both schemas, the split
// sizes and the first raw training row. Useful for checking a
// new data file or schema before spending time on training.

use anyhow::{Context, Result};
use std::fmt;

use crate::application::train_use_case::{prepare_splits, TrainConfig};
use crate::domain::{record::RawRow, schema::Schema};

/// What `inspect` reports about a data file.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub input_schema: Schema,
    pub final_schema: Schema,
    pub train_rows: usize,
    pub test_rows: usize,
    pub first_train_row: Option<RawRow>,
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input data schema details:")?;
        writeln!(f, "{}", self.input_schema)?;
        writeln!(f, "Final data schema after transformation:")?;
        writeln!(f, "{}", self.final_schema)?;
        writeln!(f, "Training rows: {}", self.train_rows)?;
        writeln!(f, "Test rows:     {}", self.test_rows)?;
        match &self.first_train_row {
            Some(row) => writeln!(f, "First training row (line {}): {}", row.line(), row.fields().join(",")),
            None => writeln!(f, "First training row: <none>"),
        }
    }
}

pub struct InspectUseCase {
    config: TrainConfig,
}

impl InspectUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<Inspection> {
        let cfg = &self.config;
        let schema = cfg.load_schema().context("cannot load the schema")?;
        let splits = prepare_splits(cfg, &schema)?;

        // Second pass over the file for the untransformed text of the first training row
        let first_train_row = match splits.train.first() {
            Some(first) => cfg
                .record_source(&schema)
                .rows()?
                .filter_map(Result::ok)
                .find(|raw| raw.line() == first.line()),
            None => None,
        };

        Ok(Inspection {
            final_schema: splits.transformer.final_schema(),
            input_schema: schema,
            train_rows: splits.train.len(),
            test_rows: splits.test.len(),
            first_train_row,
        })
    }
}
