// ============================================================
// Layer 3 — Schema Domain Type
// ============================================================
// A Schema is the ordered list of columns every data row must
// follow. Column count and order must match the input file
// exactly; there is no inference from the data.
//
// Column kinds:
//   Numeric              → parsed to a float, passed through
//   Categorical(vocab)   → a closed, ordered label vocabulary;
//                          a label's position is its class index
//   Integer(n)           → only appears in a transformed schema,
//                          after a categorical column was encoded
//
// Schemas can be built in code with Schema::builder() or read
// from a JSON file such as:
//
//   { "columns": [
//       { "name": "avg_rss12", "kind": "numeric" },
//       { "name": "class", "kind": "categorical",
//         "vocabulary": ["walking", "standing"] } ] }

use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, fs, path::Path};

use crate::domain::error::{PipelineError, PipelineResult};

/// The type information attached to one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical { vocabulary: Vec<String> },
    Integer { num_categories: usize },
}

impl ColumnKind {
    fn type_name(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "Float",
            ColumnKind::Categorical { .. } => "Categorical",
            ColumnKind::Integer { .. } => "Integer",
        }
    }
}

/// One named column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: ColumnKind::Numeric }
    }

    pub fn categorical<S: Into<String>>(
        name: impl Into<String>,
        vocabulary: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Categorical {
                vocabulary: vocabulary.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// The vocabulary of a categorical column, `None` for every other kind.
    pub fn vocabulary(&self) -> Option<&[String]> {
        match &self.kind {
            ColumnKind::Categorical { vocabulary } => Some(vocabulary),
            _ => None,
        }
    }
}

/// An ordered, validated list of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    columns: Vec<ColumnSpec>,
}

#[derive(Deserialize)]
struct SchemaFile {
    columns: Vec<ColumnSpec>,
}

impl Schema {
    /// Validate and wrap a column list.
    ///
    /// Rejects an empty schema, empty or duplicate column names, and
    /// vocabularies that are empty or contain a label twice.
    pub fn new(columns: Vec<ColumnSpec>) -> PipelineResult<Self> {
        if columns.is_empty() {
            return Err(PipelineError::Schema("a schema needs at least one column".into()));
        }

        let mut names = HashSet::new();
        for column in &columns {
            if column.name.trim().is_empty() {
                return Err(PipelineError::Schema("column names must not be empty".into()));
            }
            if !names.insert(column.name.as_str()) {
                return Err(PipelineError::Schema(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
            if let Some(vocabulary) = column.vocabulary() {
                if vocabulary.is_empty() {
                    return Err(PipelineError::Schema(format!(
                        "categorical column '{}' has an empty vocabulary",
                        column.name
                    )));
                }
                let mut labels = HashSet::new();
                if let Some(dup) = vocabulary.iter().find(|l| !labels.insert(l.as_str())) {
                    return Err(PipelineError::Schema(format!(
                        "categorical column '{}' lists '{}' more than once",
                        column.name, dup
                    )));
                }
            }
        }

        Ok(Self { columns })
    }

    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// The activity-recognition (AReM) layout: six RSS statistics
    /// followed by the activity label.
    pub fn activity_recognition() -> Self {
        Self {
            columns: vec![
                ColumnSpec::numeric("avg_rss12"),
                ColumnSpec::numeric("var_rss12"),
                ColumnSpec::numeric("avg_rss13"),
                ColumnSpec::numeric("var_rss13"),
                ColumnSpec::numeric("avg_rss23"),
                ColumnSpec::numeric("var_rss23"),
                ColumnSpec::categorical(
                    "class",
                    [
                        "walking", "standing", "cycling", "sitting", "lying", "bending1",
                        "bending2",
                    ],
                ),
            ],
        }
    }

    /// Read a schema from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn from_json_str(json: &str) -> PipelineResult<Self> {
        let file: SchemaFile = serde_json::from_str(json)
            .map_err(|e| PipelineError::Schema(format!("cannot parse schema JSON: {e}")))?;
        Self::new(file.columns)
    }

    /// The same layout with every categorical column replaced by an
    /// integer column over its vocabulary size.
    pub fn categorical_to_integer(&self) -> Schema {
        let columns = self
            .columns
            .iter()
            .map(|column| match &column.kind {
                ColumnKind::Categorical { vocabulary } => ColumnSpec {
                    name: column.name.clone(),
                    kind: ColumnKind::Integer {
                        num_categories: vocabulary.len(),
                    },
                },
                _ => column.clone(),
            })
            .collect();
        Schema { columns }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> Option<&ColumnSpec> {
        self.columns.get(index)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Schema({} columns):", self.columns.len())?;
        writeln!(f, "{:<6}{:<22}{:<14}meta data", "idx", "name", "type")?;
        for (idx, column) in self.columns.iter().enumerate() {
            let meta = match &column.kind {
                ColumnKind::Numeric => String::new(),
                ColumnKind::Categorical { vocabulary } => {
                    format!("states=[{}]", vocabulary.join(","))
                }
                ColumnKind::Integer { num_categories } => {
                    format!("range=[0,{})", num_categories)
                }
            };
            writeln!(
                f,
                "{:<6}{:<22}{:<14}{}",
                idx,
                format!("\"{}\"", column.name),
                column.kind.type_name(),
                meta
            )?;
        }
        Ok(())
    }
}

// ─── SchemaBuilder ────────────────────────────────────────────────────────────
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    columns: Vec<ColumnSpec>,
}

impl SchemaBuilder {
    pub fn add_numeric_columns(mut self, names: &[&str]) -> Self {
        self.columns.extend(names.iter().map(|n| ColumnSpec::numeric(*n)));
        self
    }

    pub fn add_categorical_column(mut self, name: &str, vocabulary: &[&str]) -> Self {
        self.columns.push(ColumnSpec::categorical(name, vocabulary.iter().copied()));
        self
    }

    pub fn build(self) -> PipelineResult<Schema> {
        Schema::new(self.columns)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_declaration_order() {
        let schema = Schema::builder()
            .add_numeric_columns(&["a", "b"])
            .add_categorical_column("label", &["x", "y"])
            .build()
            .unwrap();

        let names: Vec<&str> = schema.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "label"]);
        assert_eq!(schema.column(2).unwrap().name, "label");
        assert_eq!(schema.column(2).unwrap().vocabulary().unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_vocabulary_label_rejected() {
        let err = Schema::builder()
            .add_categorical_column("label", &["x", "x"])
            .build()
            .unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = Schema::builder()
            .add_numeric_columns(&["a", "a"])
            .build()
            .unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
    }

    #[test]
    fn test_activity_schema_shape() {
        let schema = Schema::activity_recognition();
        assert_eq!(schema.num_columns(), 7);
        assert_eq!(schema.column(6).unwrap().vocabulary().unwrap()[2], "cycling");
        assert!(Schema::new(schema.columns().to_vec()).is_ok());
    }

    #[test]
    fn test_schema_from_json() {
        let json = r#"{ "columns": [
            { "name": "x", "kind": "numeric" },
            { "name": "class", "kind": "categorical", "vocabulary": ["a", "b", "c"] }
        ] }"#;
        let schema = Schema::from_json_str(json).unwrap();
        assert_eq!(schema.columns()[0], ColumnSpec::numeric("x"));
        assert_eq!(schema.columns()[1], ColumnSpec::categorical("class", ["a", "b", "c"]));
    }

    #[test]
    fn test_schema_display_lists_states() {
        let text = Schema::activity_recognition().to_string();
        assert!(text.contains("\"class\""));
        assert!(text.contains("states=[walking,standing"));
    }
}
