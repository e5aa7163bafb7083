// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// Every failure the ingestion → training pipeline can produce.
// The application layer wraps these in anyhow with extra context;
// tests match on the variants directly.
//
// None of these are retried. A run is all-or-nothing: the first
// error propagates to main and terminates the process.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input file is missing or could not be read.
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row did not match the declared layout (field count or number format).
    #[error("malformed row at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// A categorical value that is not part of the column's vocabulary.
    #[error("line {line}: unknown category '{value}' in column '{column}' (expected one of {vocabulary:?})")]
    UnknownCategory {
        line: u64,
        column: String,
        value: String,
        vocabulary: Vec<String>,
    },

    /// A label index outside `[0, num_classes)`, or a label column that holds no class index.
    /// `row` is the 0-based position of the example in its dataset.
    #[error("row {row}: label {label} is not a valid class index for {num_classes} classes")]
    InvalidLabel {
        row: usize,
        label: String,
        num_classes: usize,
    },

    #[error("invalid schema: {0}")]
    Schema(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// An operation was called in a model state that does not allow it.
    #[error("model is {state}; {operation} requires an initialized model")]
    ModelState {
        state: String,
        operation: &'static str,
    },
}

pub type PipelineResult<T> = Result<T, PipelineError>;
