// ============================================================
// Layer 4 — Schema Transformer
// ============================================================
// Applies a Schema to raw rows and encodes categorical columns
// as integers (categorical-to-integer):
//
//   Schema:  [avg_rss12: Float, ..., class: {walking, standing, cycling}]
//   RawRow:  ["39.25", ..., "cycling"]
//   Output:  [Number(39.25), ..., Category(2)]
//
// Numeric columns are parsed to f32. Categorical values are
// looked up case-sensitively in the column's vocabulary; the
// position in the vocabulary becomes the value. A label outside
// the vocabulary is always fatal (UnknownCategory). Rows that
// cannot be parsed follow the MalformedRowPolicy.
//
// Output order always matches input order.

use std::collections::HashMap;

use crate::data::loader::MalformedRowPolicy;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::record::{Cell, RawRow, TransformedRow};
use crate::domain::schema::{ColumnKind, Schema};

/// Per-column encoding step, precomputed from the schema.
#[derive(Debug, Clone)]
enum ColumnStep {
    Parse,
    Lookup(HashMap<String, usize>),
}

#[derive(Debug, Clone)]
pub struct SchemaTransformer {
    schema: Schema,
    steps: Vec<ColumnStep>,
    policy: MalformedRowPolicy,
}

impl SchemaTransformer {
    /// Build a transformer that parses numeric columns and encodes every
    /// categorical column to its vocabulary index.
    ///
    /// The input schema must not contain `Integer` columns: those describe
    /// data that has already been encoded.
    pub fn new(schema: Schema) -> PipelineResult<Self> {
        let steps = schema
            .columns()
            .iter()
            .map(|column| match &column.kind {
                ColumnKind::Numeric => Ok(ColumnStep::Parse),
                ColumnKind::Categorical { vocabulary } => Ok(ColumnStep::Lookup(
                    vocabulary
                        .iter()
                        .enumerate()
                        .map(|(idx, label)| (label.clone(), idx))
                        .collect(),
                )),
                ColumnKind::Integer { .. } => Err(PipelineError::Schema(format!(
                    "column '{}' is already integer-encoded; transform raw data only",
                    column.name
                ))),
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        Ok(Self {
            schema,
            steps,
            policy: MalformedRowPolicy::Abort,
        })
    }

    pub fn with_policy(mut self, policy: MalformedRowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn input_schema(&self) -> &Schema {
        &self.schema
    }

    /// The schema of transformed rows: categorical columns become integer columns.
    pub fn final_schema(&self) -> Schema {
        self.schema.categorical_to_integer()
    }

    /// Transform a single row.
    pub fn transform_row(&self, row: &RawRow) -> PipelineResult<TransformedRow> {
        if row.len() != self.steps.len() {
            return Err(PipelineError::Parse {
                line: row.line(),
                message: format!(
                    "expected {} fields, found {}",
                    self.steps.len(),
                    row.len()
                ),
            });
        }

        let cells = row
            .fields()
            .iter()
            .zip(&self.steps)
            .zip(self.schema.columns())
            .map(|((value, step), column)| match step {
                // Surrounding whitespace is tolerated for numbers only
                ColumnStep::Parse => value
                    .trim()
                    .parse::<f32>()
                    .map(Cell::Number)
                    .map_err(|_| PipelineError::Parse {
                        line: row.line(),
                        message: format!(
                            "column '{}' expects a number, found '{}'",
                            column.name, value
                        ),
                    }),
                ColumnStep::Lookup(index) => index
                    .get(value.as_str())
                    .map(|&idx| Cell::Category(idx))
                    .ok_or_else(|| PipelineError::UnknownCategory {
                        line: row.line(),
                        column: column.name.clone(),
                        value: value.clone(),
                        vocabulary: column.vocabulary().unwrap_or_default().to_vec(),
                    }),
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        Ok(TransformedRow::new(row.line(), cells))
    }

    /// Transform a collection of rows into a new collection, same order.
    pub fn transform_rows(&self, rows: &[RawRow]) -> PipelineResult<Vec<TransformedRow>> {
        self.transform_iter(rows.iter().cloned().map(Ok)).collect()
    }

    /// Lazy form: transform rows as they are pulled from `rows`.
    pub fn transform_iter<'a, I>(
        &'a self,
        rows: I,
    ) -> impl Iterator<Item = PipelineResult<TransformedRow>> + 'a
    where
        I: IntoIterator<Item = PipelineResult<RawRow>>,
        I::IntoIter: 'a,
    {
        rows.into_iter().filter_map(move |row| {
            row.and_then(|row| self.apply_policy(self.transform_row(&row)))
                .transpose()
        })
    }

    /// `Ok(None)` when a malformed row is skipped.
    fn apply_policy(
        &self,
        result: PipelineResult<TransformedRow>,
    ) -> PipelineResult<Option<TransformedRow>> {
        match result {
            Ok(row) => Ok(Some(row)),
            Err(err @ PipelineError::Parse { .. }) => self.policy.handle(err).map(|()| None),
            Err(err) => Err(err),
        }
    }
}
