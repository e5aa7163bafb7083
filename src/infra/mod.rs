// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Where epoch reports end up. Both sinks implement ReportSink,
// so the training loop never knows which ones are attached:
//
//   console.rs — prints "EPOCH: n" and the evaluation stats
//
//   metrics.rs — appends one CSV row of headline metrics per
//                epoch for later analysis and plotting
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Rust Book §12 (I/O and File Handling)

/// Console report printer
pub mod console;

/// Training metrics CSV logger
pub mod metrics;
