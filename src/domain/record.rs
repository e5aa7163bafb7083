// ============================================================
// Layer 3 — Row Domain Types
// ============================================================
// RawRow         → one data line as read from the file,
//                  fields still untyped text
// TransformedRow → the same row after the schema transform:
//                  numeric fields parsed, the categorical field
//                  replaced by its vocabulary index
//
// Both keep the 1-based source line number so later stages
// can point at the offending line in error messages.
//
// The transform consumes RawRow and produces TransformedRow,
// so encoding an already-encoded row cannot type-check.

/// One untransformed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    line: u64,
    fields: Vec<String>,
}

impl RawRow {
    pub fn new<S: Into<String>>(line: u64, fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            line,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single typed value in a transformed row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Number(f32),
    Category(usize),
}

impl Cell {
    /// The value as a model input feature.
    pub fn as_feature(&self) -> f32 {
        match *self {
            Cell::Number(v) => v,
            Cell::Category(idx) => idx as f32,
        }
    }
}

/// A RawRow after categorical-to-integer encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedRow {
    line: u64,
    cells: Vec<Cell>,
}

impl TransformedRow {
    pub fn new(line: u64, cells: Vec<Cell>) -> Self {
        Self { line, cells }
    }

    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
