// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define the core
// concepts: schemas, rows, evaluation reports, errors, and the
// traits the training loop is written against.
//
// No burn types and no file I/O here apart from reading a
// schema declaration.

// Column declarations and the default activity schema
pub mod schema;

// Raw and transformed rows
pub mod record;

// Confusion matrix and evaluation statistics
pub mod evaluation;

// Error kinds shared by every layer
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
