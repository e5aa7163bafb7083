use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::record::{Cell, TransformedRow};
use crate::domain::traits::BatchIterator;

/// One labelled example: every non-label column in column order, plus the class index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorItem {
    pub features: Vec<f32>,
    pub label: usize,
}

/// Transformed rows packed into labelled examples.
///
/// Every label lies in `[0, num_classes)` and every feature vector
/// has `num_features` entries.
#[derive(Debug, Clone)]
pub struct SensorDataset {
    items: Vec<SensorItem>,
    num_features: usize,
    num_classes: usize,
}

impl SensorDataset {
    /// Assemble a dataset, taking the class index from `label_column`.
    ///
    /// The label cell must hold a category index (or an integral number)
    /// below `num_classes`; anything else is `InvalidLabel`.
    pub fn assemble(
        rows: &[TransformedRow],
        label_column: usize,
        num_classes: usize,
    ) -> PipelineResult<Self> {
        if num_classes == 0 {
            return Err(PipelineError::Config("num_classes must be at least 1".into()));
        }

        let mut items = Vec::with_capacity(rows.len());
        let mut num_features = None;

        for (idx, row) in rows.iter().enumerate() {
            if label_column >= row.len() {
                return Err(PipelineError::Config(format!(
                    "label column {} is out of range for rows with {} columns",
                    label_column,
                    row.len()
                )));
            }

            let label = label_index(&row.cells()[label_column], idx, num_classes)?;
            let features: Vec<f32> = row
                .cells()
                .iter()
                .enumerate()
                .filter(|(col, _)| *col != label_column)
                .map(|(_, cell)| cell.as_feature())
                .collect();

            match num_features {
                None => num_features = Some(features.len()),
                Some(n) if n != features.len() => {
                    return Err(PipelineError::Parse {
                        line: row.line(),
                        message: format!("expected {} features, found {}", n, features.len()),
                    });
                }
                Some(_) => {}
            }

            items.push(SensorItem { features, label });
        }

        Ok(Self {
            items,
            num_features: num_features.unwrap_or(0),
            num_classes,
        })
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn items(&self) -> &[SensorItem] {
        &self.items
    }

    /// A resettable cursor over this dataset. `None` means full-batch.
    pub fn iter_batches(&self, batch_size: Option<usize>) -> DatasetIterator<'_> {
        DatasetIterator::new(self, batch_size)
    }
}

impl Dataset<SensorItem> for SensorDataset {
    fn get(&self, index: usize) -> Option<SensorItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

fn label_index(cell: &Cell, row: usize, num_classes: usize) -> PipelineResult<usize> {
    let invalid = |label: String| PipelineError::InvalidLabel {
        row,
        label,
        num_classes,
    };

    match *cell {
        Cell::Category(idx) if idx < num_classes => Ok(idx),
        Cell::Category(idx) => Err(invalid(idx.to_string())),
        Cell::Number(v) if v >= 0.0 && v.fract() == 0.0 && (v as usize) < num_classes => {
            Ok(v as usize)
        }
        Cell::Number(v) => Err(invalid(v.to_string())),
    }
}

// ─── DatasetIterator ──────────────────────────────────────────────────────────
/// Yields consecutive batches of a borrowed dataset in row order.
///
/// The last batch may be shorter. An empty dataset yields no batches.
#[derive(Debug, Clone)]
pub struct DatasetIterator<'a> {
    dataset: &'a SensorDataset,
    batch_size: usize,
    cursor: usize,
}

impl<'a> DatasetIterator<'a> {
    pub fn new(dataset: &'a SensorDataset, batch_size: Option<usize>) -> Self {
        let batch_size = match batch_size {
            Some(n) if n > 0 => n,
            // full batch; keep at least 1 so an empty dataset still has a valid size
            _ => dataset.len().max(1),
        };
        Self {
            dataset,
            batch_size,
            cursor: 0,
        }
    }
}

impl Iterator for DatasetIterator<'_> {
    type Item = Vec<SensorItem>;

    fn next(&mut self) -> Option<Self::Item> {
        let total = self.dataset.len();
        if self.cursor >= total {
            return None;
        }
        let end = (self.cursor + self.batch_size).min(total);
        let batch = (self.cursor..end)
            .filter_map(|idx| self.dataset.get(idx))
            .collect();
        self.cursor = end;
        Some(batch)
    }
}

impl BatchIterator for DatasetIterator<'_> {
    fn reset(&mut self) {
        self.cursor = 0;
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn total_examples(&self) -> usize {
        self.dataset.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// Six numeric features then the class index in column 6.
    fn row(line: u64, label: usize) -> TransformedRow {
        let mut cells: Vec<Cell> = (0..6).map(|i| Cell::Number(line as f32 + i as f32)).collect();
        cells.push(Cell::Category(label));
        TransformedRow::new(line, cells)
    }

    #[test]
    fn test_labels_within_class_range() {
        let rows: Vec<TransformedRow> = (0..20).map(|i| row(i, (i % 7) as usize)).collect();
        let dataset = SensorDataset::assemble(&rows, 6, 7).unwrap();

        assert_eq!(dataset.len(), 20);
        assert_eq!(dataset.num_features(), 6);
        for item in dataset.iter_batches(None).flatten() {
            assert!(item.label < 7);
            assert_eq!(item.features.len(), 6);
        }
    }

    #[test]
    fn test_label_at_num_classes_is_invalid() {
        let rows = vec![row(1, 3), row(2, 7)];
        let err = SensorDataset::assemble(&rows, 6, 7).unwrap_err();
        match err {
            PipelineError::InvalidLabel { row, label, num_classes } => {
                assert_eq!(row, 1);
                assert_eq!(label, "7");
                assert_eq!(num_classes, 7);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_label_column_excluded_from_features() {
        // label in the middle: features keep the remaining column order
        let rows = vec![TransformedRow::new(
            1,
            vec![Cell::Number(1.0), Cell::Category(2), Cell::Number(3.0)],
        )];
        let dataset = SensorDataset::assemble(&rows, 1, 3).unwrap();
        assert_eq!(
            dataset.get(0),
            Some(SensorItem { features: vec![1.0, 3.0], label: 2 })
        );
    }

    #[test]
    fn test_integral_number_label_accepted() {
        let rows = vec![TransformedRow::new(1, vec![Cell::Number(0.5), Cell::Number(1.0)])];
        let dataset = SensorDataset::assemble(&rows, 1, 2).unwrap();
        assert_eq!(dataset.get(0).unwrap().label, 1);

        let rows = vec![TransformedRow::new(1, vec![Cell::Number(0.5), Cell::Number(0.5)])];
        assert!(matches!(
            SensorDataset::assemble(&rows, 1, 2),
            Err(PipelineError::InvalidLabel { .. })
        ));
    }

    #[test]
    fn test_full_batch_is_one_batch() {
        let rows: Vec<TransformedRow> = (0..10).map(|i| row(i, 0)).collect();
        let dataset = SensorDataset::assemble(&rows, 6, 7).unwrap();
        let mut iter = dataset.iter_batches(None);

        assert_eq!(iter.batch_size(), 10);
        assert_eq!(iter.next().map(|b| b.len()), Some(10));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_fixed_batches_keep_row_order() {
        let rows: Vec<TransformedRow> = (0..7).map(|i| row(i, 0)).collect();
        let dataset = SensorDataset::assemble(&rows, 6, 7).unwrap();
        let batches: Vec<Vec<SensorItem>> = dataset.iter_batches(Some(3)).collect();

        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        let firsts: Vec<f32> = batches.concat().iter().map(|item| item.features[0]).collect();
        assert_eq!(firsts, (0..7).map(|i| i as f32).collect::<Vec<_>>());
    }

    #[test]
    fn test_reset_rewinds_to_first_batch() {
        let rows: Vec<TransformedRow> = (0..4).map(|i| row(i, 1)).collect();
        let dataset = SensorDataset::assemble(&rows, 6, 7).unwrap();
        let mut iter = dataset.iter_batches(Some(2));

        let first = iter.next();
        assert!(iter.next().is_some());
        assert!(iter.next().is_none());

        iter.reset();
        assert_eq!(iter.next(), first);
    }

    #[test]
    fn test_empty_dataset_yields_nothing() {
        let dataset = SensorDataset::assemble(&[], 6, 7).unwrap();
        let mut iter = dataset.iter_batches(None);
        assert_eq!(iter.total_examples(), 0);
        assert!(iter.next().is_none());
        iter.reset();
        assert!(iter.next().is_none());
    }
}
