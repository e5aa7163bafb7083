// ============================================================
// Layer 4 — CSV Record Source
// ============================================================
// Reads delimited rows from a file using the csv crate.
//
//   file ──► skip N header records ──► RawRow, RawRow, ...
//
// The returned iterator is lazy, single-pass and finite. It owns
// the open file; the handle is released when the iterator is
// exhausted or dropped early. To read again, call rows() again.
//
// Field-count checks happen per row, as the row is consumed.
// A malformed row either aborts ingestion (the default) or is
// skipped with a warning, depending on MalformedRowPolicy.
//
// Fields are handed on exactly as written, padding included.

use std::{
    fmt,
    fs::File,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::record::RawRow;

/// What to do with a row that cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedRowPolicy {
    /// Fail the whole run on the first malformed row.
    #[default]
    Abort,
    /// Drop the row, log a warning and keep going.
    Skip,
}

impl FromStr for MalformedRowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(format!("unknown malformed-row policy '{other}' (use abort or skip)")),
        }
    }
}

impl fmt::Display for MalformedRowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => f.write_str("abort"),
            Self::Skip => f.write_str("skip"),
        }
    }
}

impl MalformedRowPolicy {
    /// Apply the policy to a parse failure: `Err` to abort, `Ok(())` to skip.
    pub fn handle(self, err: PipelineError) -> PipelineResult<()> {
        match self {
            Self::Abort => Err(err),
            Self::Skip => {
                tracing::warn!("Skipping malformed row: {}", err);
                Ok(())
            }
        }
    }
}

/// Reads RawRows from a delimited text file.
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    path: PathBuf,
    skip_lines: usize,
    delimiter: u8,
    expected_columns: usize,
    policy: MalformedRowPolicy,
}

impl CsvRecordSource {
    /// A source expecting `expected_columns` fields per row, with one
    /// header line and comma delimiters.
    pub fn new(path: impl Into<PathBuf>, expected_columns: usize) -> Self {
        Self {
            path: path.into(),
            skip_lines: 1,
            delimiter: b',',
            expected_columns,
            policy: MalformedRowPolicy::Abort,
        }
    }

    pub fn with_skip_lines(mut self, skip_lines: usize) -> Self {
        self.skip_lines = skip_lines;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_policy(mut self, policy: MalformedRowPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Open the file and return a lazy iterator over its data rows.
    ///
    /// Fails immediately with `Io` if the file cannot be opened.
    pub fn rows(&self) -> PipelineResult<RawRows> {
        let file = File::open(&self.path).map_err(|source| PipelineError::Io {
            path: self.path.clone(),
            source,
        })?;

        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(file);

        tracing::debug!(
            "Opened '{}' (skip {} lines, delimiter {:?})",
            self.path.display(),
            self.skip_lines,
            self.delimiter as char
        );

        Ok(RawRows {
            records: reader.into_records(),
            path: self.path.clone(),
            to_skip: self.skip_lines,
            expected_columns: self.expected_columns,
            policy: self.policy,
            index: 0,
            read: 0,
            skipped: 0,
        })
    }
}

/// Lazy iterator over the data rows of one file.
pub struct RawRows {
    records: csv::StringRecordsIntoIter<File>,
    path: PathBuf,
    to_skip: usize,
    expected_columns: usize,
    policy: MalformedRowPolicy,
    index: u64,
    read: usize,
    skipped: usize,
}

impl RawRows {
    /// Malformed rows dropped so far under `MalformedRowPolicy::Skip`.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn parse(&self, record: csv::StringRecord) -> PipelineResult<RawRow> {
        let line = record.position().map_or(self.index, |p| p.line());
        if record.len() != self.expected_columns {
            return Err(PipelineError::Parse {
                line,
                message: format!(
                    "expected {} fields, found {}",
                    self.expected_columns,
                    record.len()
                ),
            });
        }
        Ok(RawRow::new(line, record.iter()))
    }
}

impl Iterator for RawRows {
    type Item = PipelineResult<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(next) = self.records.next() else {
                tracing::info!(
                    "Read {} rows from '{}' ({} skipped)",
                    self.read,
                    self.path.display(),
                    self.skipped
                );
                return None;
            };
            self.index += 1;

            if self.to_skip > 0 {
                self.to_skip -= 1;
                continue;
            }

            let parsed = match next {
                Ok(record) => self.parse(record),
                Err(err) => Err(csv_error(err, &self.path, self.index)),
            };

            match parsed {
                Ok(row) => {
                    self.read += 1;
                    return Some(Ok(row));
                }
                Err(err @ PipelineError::Parse { .. }) => match self.policy.handle(err) {
                    Ok(()) => self.skipped += 1,
                    Err(err) => return Some(Err(err)),
                },
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

fn csv_error(err: csv::Error, path: &Path, fallback_line: u64) -> PipelineError {
    let line = err.position().map_or(fallback_line, |p| p.line());
    match err.into_kind() {
        csv::ErrorKind::Io(source) => PipelineError::Io {
            path: path.to_path_buf(),
            source,
        },
        kind => PipelineError::Parse {
            line,
            message: format!("{kind:?}"),
        },
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn read_all(source: &CsvRecordSource) -> PipelineResult<Vec<RawRow>> {
        source.rows()?.collect()
    }

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_skips_header_and_keeps_order() {
        let file = csv_file("x,y,label\n1,2,a\n3,4,b\n5,6,c\n");
        let rows = read_all(&CsvRecordSource::new(file.path(), 3)).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].fields(), &["1", "2", "a"]);
        assert_eq!(rows[2].fields(), &["5", "6", "c"]);
        assert_eq!(rows[0].line(), 2);
    }

    #[test]
    fn test_custom_delimiter_and_skip() {
        let file = csv_file("# generated\nx;y\n1;2\n");
        let source = CsvRecordSource::new(file.path(), 2)
            .with_skip_lines(2)
            .with_delimiter(b';');
        let rows = read_all(&source).unwrap();
        assert_eq!(rows, vec![RawRow::new(3, ["1", "2"])]);
    }

    #[test]
    fn test_fields_are_not_trimmed() {
        let file = csv_file("x,label\n1.0, walking\n");
        let rows = read_all(&CsvRecordSource::new(file.path(), 2)).unwrap();
        assert_eq!(rows[0].fields(), &["1.0", " walking"]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = CsvRecordSource::new("/definitely/not/here.csv", 3)
            .rows()
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_field_count_mismatch_aborts() {
        let file = csv_file("h1,h2\n1,2\n1,2,3\n4,5\n");
        let mut rows = CsvRecordSource::new(file.path(), 2).rows().unwrap();

        // the bad row is only detected when it is reached
        assert!(rows.next().unwrap().is_ok());
        let err = rows.next().unwrap().unwrap_err();
        assert!(matches!(err, PipelineError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_field_count_mismatch_skipped() {
        let file = csv_file("h1,h2\n1,2\n1,2,3\n4,5\n");
        let source = CsvRecordSource::new(file.path(), 2).with_policy(MalformedRowPolicy::Skip);
        let mut rows = source.rows().unwrap();
        let all: Vec<RawRow> = rows.by_ref().map(Result::unwrap).collect();

        assert_eq!(all.len(), 2);
        assert_eq!(all[1].fields(), &["4", "5"]);
        assert_eq!(rows.skipped(), 1);
    }

    #[test]
    fn test_policy_parses_from_str() {
        assert_eq!("Skip".parse::<MalformedRowPolicy>(), Ok(MalformedRowPolicy::Skip));
        assert!("ignore".parse::<MalformedRowPolicy>().is_err());
    }
}
