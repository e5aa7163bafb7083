// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the CSV file to tensor batches:
//
//   sensor CSV
//       │
//       ▼
//   CsvRecordSource    → reads rows lazily, skips the header
//       │
//       ▼
//   SchemaTransformer  → parses numbers, encodes the label (lazily)
//       │
//       ▼
//   split_stream       → rows[..n] train, rows[n..] test
//       │
//       ▼
//   SensorDataset      → (features, class index) items (per split)
//       │
//       ▼
//   DatasetIterator    → resettable batches in file order
//       │
//       ▼
//   SensorBatcher      → stacks a batch into tensors
//
// Nothing is shuffled anywhere, so the same file and parameters
// always produce the same datasets.

/// Reads delimited rows from disk
pub mod loader;

/// Positional train/test split
pub mod splitter;

/// Schema application and categorical-to-integer encoding
pub mod transformer;

/// Implements Burn's Dataset trait plus the resettable batch iterator
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
